pub mod aggregate;
pub mod alerts;
pub mod asset;
pub mod config;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod pulse;
pub mod ranking;
pub mod signal;
pub mod tracked;
pub mod types;
pub mod view;
pub mod window;

pub use alerts::{Alert, AlertKind};
pub use config::{ScannerConfig, SettingsInput};
pub use error::MarketError;
pub use manager::{MarketHandle, MarketManager};
pub use ranking::{CoinView, SortDirection, SortField, SortSpec, Stats};
pub use signal::{HoldHint, Signal};
pub use types::{Command, TickReport, WatchedMints};
