//! Random, non-enumerable link tokens.
//!
//! A token is 24 bytes from the operating system CSPRNG encoded as unpadded
//! base32. 192 bits of entropy make enumeration of the token space
//! infeasible, so tokens are never checked against existing records before
//! being written.

use std::fmt;

use crate::utils::base32;

/// Number of random bytes drawn per token.
pub const TOKEN_BYTES: usize = 24;

/// Length of the encoded token. Derived from [`TOKEN_BYTES`] and the base32
/// expansion ratio, so it must never be written as a literal.
pub const TOKEN_LEN: usize = base32::encoded_len(TOKEN_BYTES);

/// Suffix appended to a token to form its object key.
pub const KEY_SUFFIX: &str = ".url";

/// Errors produced while generating or parsing tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Secure random source failed: {0}")]
    Entropy(String),

    #[error("Token must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Token contains characters outside the base32 alphabet")]
    InvalidAlphabet,
}

/// An opaque link token, guaranteed to be [`TOKEN_LEN`] base32 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Draws a fresh token from the system random source.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Entropy`] if the OS random source fails. Callers
    /// treat this as fatal and do not retry.
    pub fn generate() -> Result<Self, TokenError> {
        let mut buffer = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut buffer).map_err(|e| TokenError::Entropy(e.to_string()))?;

        Ok(Self(base32::encode(&buffer)))
    }

    /// Parses a bare token, checking length first and alphabet second.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let actual = raw.chars().count();
        if actual != TOKEN_LEN {
            return Err(TokenError::InvalidLength {
                expected: TOKEN_LEN,
                actual,
            });
        }

        if !raw.chars().all(base32::is_alphabet_char) {
            return Err(TokenError::InvalidAlphabet);
        }

        Ok(Self(raw.to_string()))
    }

    /// Extracts the token from a short URL, a path such as `/s/<token>`, or
    /// a bare token. The token is the final `/`-delimited segment.
    pub fn from_short_url(input: &str) -> Result<Self, TokenError> {
        let segment = input.rsplit('/').next().unwrap_or(input);
        Self::parse(segment)
    }

    /// Object key holding the long URL for this token.
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.0, KEY_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
