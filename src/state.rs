use std::sync::Arc;

use crate::{db::Store, services::MetadataProvider};

/// Shared application state
///
/// Both halves are trait objects so tests can mount the router over the
/// in-memory store and a stub metadata provider.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub metadata: Arc<dyn MetadataProvider>,
}
