pub mod feed;
pub mod trade;

pub use feed::{CoinCreated, FeedEvent};
pub use trade::{Direction, TradeEvent, TradeObservation, TradeRejection};
