use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::MappingStore;

/// Shared state handed to every handler.
///
/// Holds only the link service; the storage client inside it is shared
/// read-only across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>) -> Self {
        Self { link_service }
    }

    /// State backed by `store` with default service settings.
    pub fn with_store(store: Arc<dyn MappingStore>, public_origin: impl Into<String>) -> Self {
        Self::new(Arc::new(LinkService::new(store, public_origin)))
    }
}
