//! Optional origin-prefix restriction for long URLs.
//!
//! Disabled by default. When enabled, shorten only accepts long URLs under
//! the prefix and expand refuses to reveal anything else, which keeps the
//! service from acting as an open unshortener for third-party links.

/// Prefix policy applied to long URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPolicy {
    allowed_prefix: Option<String>,
}

impl UrlPolicy {
    /// Accepts every URL.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Accepts only URLs starting with `prefix`. An empty prefix disables the policy.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            allowed_prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    pub fn from_option(prefix: Option<String>) -> Self {
        prefix.map(Self::with_prefix).unwrap_or_default()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.allowed_prefix.as_deref()
    }

    /// Returns true if `url` passes the policy.
    pub fn allows(&self, url: &str) -> bool {
        match self.allowed_prefix {
            Some(ref prefix) => url.starts_with(prefix.as_str()),
            None => true,
        }
    }
}
