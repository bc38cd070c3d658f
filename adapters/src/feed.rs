use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use corelib::FeedEvent;
use tokio::sync::mpsc;

use crate::error::FeedError;

/// Mints the market side is currently tracking.
pub type WatchedMints = Arc<BTreeSet<String>>;

/// Wire protocol of one upstream feed. Connection handling lives in
/// [`crate::supervisor::FeedSupervisor`]; a `Feed` only builds frames and
/// decodes payloads.
pub trait Feed: Send {
    fn name(&self) -> &'static str;

    fn url(&self) -> &str;

    /// Frames sent after every (re)connect, once the socket has settled.
    fn subscribe_frames(&mut self, watched: &BTreeSet<String>) -> Vec<String>;

    /// Frames sent when the watched set changes while subscribed.
    fn watch_frames(&mut self, _watched: &BTreeSet<String>) -> Vec<String> {
        Vec::new()
    }

    /// Decodes one text payload. Control messages decode to nothing.
    fn decode(
        &mut self,
        raw: &str,
        watched: &BTreeSet<String>,
        now_ms: u64,
    ) -> Result<Vec<FeedEvent>, FeedError>;
}

/// Destination of normalized feed events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: FeedEvent) -> Result<(), FeedError>;
}

#[async_trait]
impl EventSink for mpsc::Sender<FeedEvent> {
    async fn deliver(&self, event: FeedEvent) -> Result<(), FeedError> {
        self.send(event).await.map_err(|_| FeedError::SinkClosed)
    }
}
