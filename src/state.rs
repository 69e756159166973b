use std::sync::Arc;

use crate::oracle::Oracle;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<Oracle>,
}

impl AppState {
    pub fn new(oracle: Oracle) -> Self {
        Self {
            oracle: Arc::new(oracle),
        }
    }
}
