use clap::Parser;
use market::{ScannerConfig, SortDirection, SortField, SortSpec};

#[derive(Debug, Parser)]
#[clap(name = "coin-scanner", version)]
pub struct Cli {
    /// Minimum market cap (SOL) for a row to be shown
    #[clap(long, default_value_t = market::config::DEFAULT_MIN_MARKET_CAP)]
    pub min_market_cap: f64,

    /// Maximum market cap (SOL) for a row to be shown
    #[clap(long, default_value_t = market::config::DEFAULT_MAX_MARKET_CAP)]
    pub max_market_cap: f64,

    /// Minimum bonding-curve liquidity (SOL)
    #[clap(long, default_value_t = market::config::DEFAULT_MIN_LIQUIDITY)]
    pub min_liquidity: f64,

    /// Momentum ratio required for a BUY
    #[clap(long, default_value_t = market::config::DEFAULT_MOMENTUM_THRESHOLD)]
    pub momentum_threshold: f64,

    /// Transactions per minute at which a coin counts as active
    #[clap(long, default_value_t = market::config::DEFAULT_VELOCITY_THRESHOLD)]
    pub velocity_threshold: f64,

    /// Tick period in milliseconds
    #[clap(long, default_value_t = market::config::DEFAULT_REFRESH_INTERVAL_MS)]
    pub refresh_ms: u64,

    /// Capacity of the tracked set
    #[clap(long, default_value_t = market::config::DEFAULT_MAX_COINS_TO_TRACK)]
    pub max_coins: usize,

    /// Sort field (momentum, market_cap, velocity, ...)
    #[clap(long, default_value = "momentum")]
    pub sort: SortField,

    /// Sort ascending instead of descending
    #[clap(long)]
    pub asc: bool,

    /// Mints to track and pin from the start (comma-separated)
    #[clap(long, value_delimiter = ',')]
    pub track: Vec<String>,

    /// Emit one JSON document per tick instead of a table
    #[clap(long)]
    pub json: bool,
}

impl Cli {
    /// Flags go through the same parser as runtime `set` commands, so a bad
    /// value falls back to its default instead of aborting startup.
    pub fn scanner_config(&self) -> ScannerConfig {
        let input = market::SettingsInput::from_config(&ScannerConfig {
            version: 0,
            min_market_cap: self.min_market_cap,
            max_market_cap: self.max_market_cap,
            min_liquidity: self.min_liquidity,
            momentum_threshold: self.momentum_threshold,
            velocity_threshold: self.velocity_threshold,
            refresh_interval_ms: self.refresh_ms,
            max_coins_to_track: self.max_coins,
        });
        ScannerConfig::from_settings(&input, 0)
    }

    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: self.sort,
            direction: if self.asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            },
        }
    }
}
