use std::sync::Arc;

use crate::store::Store;

/// Shared gateway state: the store behind the port, nothing else.
/// Injected explicitly into middleware and handlers; there is no ambient
/// database handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
