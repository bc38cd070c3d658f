pub mod config;
pub mod scanner;
pub mod sink;

pub use config::SessionConfig;
pub use scanner::ScannerSession;
pub use sink::MarketSink;
