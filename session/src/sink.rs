use adapters::{EventSink, FeedError};
use async_trait::async_trait;
use corelib::FeedEvent;
use market::MarketHandle;

/// Routes feed events into the market manager's command queue.
#[derive(Clone)]
pub struct MarketSink(pub MarketHandle);

#[async_trait]
impl EventSink for MarketSink {
    async fn deliver(&self, event: FeedEvent) -> Result<(), FeedError> {
        self.0.feed(event).await.map_err(|_| FeedError::SinkClosed)
    }
}
