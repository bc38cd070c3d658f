pub mod error;
pub mod feed;
pub mod helius;
pub mod pumpportal;
pub mod supervisor;

pub use error::FeedError;
pub use feed::{EventSink, Feed, WatchedMints};
pub use helius::HeliusFeed;
pub use pumpportal::PumpPortalFeed;
pub use supervisor::{Backoff, FeedState, FeedSupervisor, SupervisorSettings};
