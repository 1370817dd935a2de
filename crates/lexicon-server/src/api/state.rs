//! Shared API state

use std::sync::Arc;

use lexicon_core::{Clock, Storage, SystemClock, DEFAULT_REVIEW_BATCH};

/// Shared application state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub clock: Arc<dyn Clock>,
    pub review_batch_size: i32,
}

impl AppState {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            review_batch_size: DEFAULT_REVIEW_BATCH,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_review_batch(mut self, size: i32) -> Self {
        self.review_batch_size = size;
        self
    }
}
