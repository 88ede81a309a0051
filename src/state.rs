//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::SessionRegistry;
use crate::database::Store;

/// Shared application state.
///
/// Lock order is store first, then sessions.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub sessions: Arc<RwLock<SessionRegistry>>,
}

impl AppState {
    pub fn new(store: Store, sessions: SessionRegistry) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            sessions: Arc::new(RwLock::new(sessions)),
        }
    }
}
