use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::TickReport;

/// Latest tick report, readable by any number of presentation tasks.
#[derive(Clone, Default)]
pub struct ScannerView {
    inner: Arc<RwLock<Option<Arc<TickReport>>>>,
}

impl ScannerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins.
    pub async fn set(&self, report: Arc<TickReport>) {
        let mut g = self.inner.write().await;
        *g = Some(report);
    }

    pub async fn latest(&self) -> Option<Arc<TickReport>> {
        let g = self.inner.read().await;
        g.clone()
    }
}
