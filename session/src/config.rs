use adapters::SupervisorSettings;
use adapters::helius::balances::DEFAULT_BALANCE_CAPACITY;
use market::{ScannerConfig, SortSpec};

/// Everything a [`crate::ScannerSession`] needs to start.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub scanner: ScannerConfig,
    pub sort: SortSpec,
    /// Mints tracked and pinned from the start.
    pub track: Vec<String>,
    pub pumpportal_url: String,
    /// Balance feed endpoint, api key included. `None` disables the feed.
    pub helius_url: Option<String>,
    pub supervisor: SupervisorSettings,
    /// Buffered tick reports for the presentation side.
    pub report_capacity: usize,
    pub balance_cache_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            sort: SortSpec::default(),
            track: Vec::new(),
            pumpportal_url: adapters::pumpportal::DEFAULT_URL.to_string(),
            helius_url: None,
            supervisor: SupervisorSettings::default(),
            report_capacity: 16,
            balance_cache_capacity: DEFAULT_BALANCE_CAPACITY,
        }
    }
}
