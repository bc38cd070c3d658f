use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MarketError;

pub const DEFAULT_MIN_MARKET_CAP: f64 = 0.0;
pub const DEFAULT_MAX_MARKET_CAP: f64 = 100_000.0;
pub const DEFAULT_MIN_LIQUIDITY: f64 = 1.0;
pub const DEFAULT_MOMENTUM_THRESHOLD: f64 = 2.0;
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 2.0;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_MAX_COINS_TO_TRACK: usize = 20;

/// Scanner configuration.
///
/// Replaced as a whole when settings are applied; a tick always sees one
/// consistent version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Bumped on every apply.
    pub version: u64,

    /// Lower market cap bound (SOL) for rows in the ranked output.
    pub min_market_cap: f64,

    /// Upper market cap bound (SOL) for rows in the ranked output.
    pub max_market_cap: f64,

    /// Minimum curve liquidity (SOL) for rows in the ranked output.
    pub min_liquidity: f64,

    /// Momentum needed for a BUY.
    pub momentum_threshold: f64,

    /// 1m transaction count at which a row is flagged active. Advisory.
    pub velocity_threshold: f64,

    /// Tick period.
    pub refresh_interval_ms: u64,

    /// Capacity of the tracked set. Pinned entries may push past it.
    pub max_coins_to_track: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            version: 0,
            min_market_cap: DEFAULT_MIN_MARKET_CAP,
            max_market_cap: DEFAULT_MAX_MARKET_CAP,
            min_liquidity: DEFAULT_MIN_LIQUIDITY,
            momentum_threshold: DEFAULT_MOMENTUM_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            max_coins_to_track: DEFAULT_MAX_COINS_TO_TRACK,
        }
    }
}

/// Raw settings as typed by a user. Every field is parsed on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsInput {
    pub min_market_cap: Option<String>,
    pub max_market_cap: Option<String>,
    pub min_liquidity: Option<String>,
    pub momentum_threshold: Option<String>,
    pub velocity_threshold: Option<String>,
    pub refresh_interval_ms: Option<String>,
    pub max_coins_to_track: Option<String>,
}

impl SettingsInput {
    pub const KEYS: [&'static str; 7] = [
        "min_market_cap",
        "max_market_cap",
        "min_liquidity",
        "momentum_threshold",
        "velocity_threshold",
        "refresh_interval_ms",
        "max_coins_to_track",
    ];

    /// Settings that reproduce `cfg` when applied.
    pub fn from_config(cfg: &ScannerConfig) -> Self {
        Self {
            min_market_cap: Some(cfg.min_market_cap.to_string()),
            max_market_cap: Some(cfg.max_market_cap.to_string()),
            min_liquidity: Some(cfg.min_liquidity.to_string()),
            momentum_threshold: Some(cfg.momentum_threshold.to_string()),
            velocity_threshold: Some(cfg.velocity_threshold.to_string()),
            refresh_interval_ms: Some(cfg.refresh_interval_ms.to_string()),
            max_coins_to_track: Some(cfg.max_coins_to_track.to_string()),
        }
    }

    /// Overrides one field. Keys accept `snake_case` or `camelCase`.
    pub fn patch(&mut self, key: &str, value: &str) -> Result<(), MarketError> {
        let slot = match key {
            "min_market_cap" | "minMarketCap" => &mut self.min_market_cap,
            "max_market_cap" | "maxMarketCap" => &mut self.max_market_cap,
            "min_liquidity" | "minLiquidity" => &mut self.min_liquidity,
            "momentum_threshold" | "momentumThreshold" => &mut self.momentum_threshold,
            "velocity_threshold" | "velocityThreshold" => &mut self.velocity_threshold,
            "refresh_interval_ms" | "refreshIntervalMs" => &mut self.refresh_interval_ms,
            "max_coins_to_track" | "maxCoinsToTrack" => &mut self.max_coins_to_track,
            other => return Err(MarketError::UnknownSetting(other.to_string())),
        };
        *slot = Some(value.trim().to_string());
        Ok(())
    }
}

impl ScannerConfig {
    /// Builds a config from raw settings. A missing, non-numeric or
    /// out-of-range field falls back to its default; the rest still apply.
    pub fn from_settings(input: &SettingsInput, version: u64) -> Self {
        Self {
            version,
            min_market_cap: parse_field(
                "min_market_cap",
                &input.min_market_cap,
                DEFAULT_MIN_MARKET_CAP,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            max_market_cap: parse_field(
                "max_market_cap",
                &input.max_market_cap,
                DEFAULT_MAX_MARKET_CAP,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            min_liquidity: parse_field(
                "min_liquidity",
                &input.min_liquidity,
                DEFAULT_MIN_LIQUIDITY,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            momentum_threshold: parse_field(
                "momentum_threshold",
                &input.momentum_threshold,
                DEFAULT_MOMENTUM_THRESHOLD,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            velocity_threshold: parse_field(
                "velocity_threshold",
                &input.velocity_threshold,
                DEFAULT_VELOCITY_THRESHOLD,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            refresh_interval_ms: parse_field(
                "refresh_interval_ms",
                &input.refresh_interval_ms,
                DEFAULT_REFRESH_INTERVAL_MS,
                |v: &u64| *v > 0,
            ),
            max_coins_to_track: parse_field(
                "max_coins_to_track",
                &input.max_coins_to_track,
                DEFAULT_MAX_COINS_TO_TRACK,
                |_: &usize| true,
            ),
        }
    }
}

fn parse_field<T>(
    name: &'static str,
    raw: &Option<String>,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(field = name, value = %raw, "invalid setting; using default");
            default
        }
    }
}
