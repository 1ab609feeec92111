use std::sync::Arc;

use crate::observability::Metrics;
use crate::provider::LedgerProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<LedgerProvider>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(provider: LedgerProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
