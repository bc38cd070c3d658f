//! Filtered, ranked output rows and summary stats for one tick.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::aggregate::Horizon;
use crate::asset::AssetRecord;
use crate::config::ScannerConfig;
use crate::error::MarketError;
use crate::signal::Signal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Symbol,
    MarketCap,
    Liquidity,
    LiquidityChange,
    Volume15s,
    Volume1m,
    Volume5m,
    Momentum,
    Velocity,
    BuySellRatio,
    Signal,
    AddedAt,
}

impl SortField {
    pub const NAMES: [&'static str; 13] = [
        "name",
        "symbol",
        "market_cap",
        "liquidity",
        "liquidity_change",
        "volume_15s",
        "volume_1m",
        "volume_5m",
        "momentum",
        "velocity",
        "buy_sell_ratio",
        "signal",
        "added_at",
    ];
}

impl FromStr for SortField {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let field = match normalized.as_str() {
            "name" => SortField::Name,
            "symbol" => SortField::Symbol,
            "marketcap" | "mcap" => SortField::MarketCap,
            "liquidity" => SortField::Liquidity,
            "liquiditychange" => SortField::LiquidityChange,
            "volume15s" => SortField::Volume15s,
            "volume1m" => SortField::Volume1m,
            "volume5m" => SortField::Volume5m,
            "momentum" => SortField::Momentum,
            "velocity" => SortField::Velocity,
            "buysellratio" | "ratio" => SortField::BuySellRatio,
            "signal" => SortField::Signal,
            "addedat" | "age" => SortField::AddedAt,
            _ => return Err(MarketError::UnknownSortField(s.to_string())),
        };
        Ok(field)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(MarketError::UnknownSortDirection(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Momentum,
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{:?} {dir}", self.field)
    }
}

/// One output row: an asset record flattened with its latest evaluation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoinView {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub is_pinned: bool,
    pub is_tracked: bool,
    pub market_cap: f64,
    pub liquidity: f64,
    pub liquidity_change: f64,
    pub price: f64,
    pub volume_15s: f64,
    pub volume_30s: f64,
    pub volume_1m: f64,
    pub volume_5m: f64,
    pub momentum: f64,
    pub velocity: u32,
    pub avg_transactions: f64,
    pub buy_sell_ratio: String,
    pub buy_sell_value: f64,
    pub signal: Signal,
    pub hold_time: String,
    pub is_active: bool,
    pub added_at_ms: u64,
    pub last_updated_ms: u64,
}

impl From<&AssetRecord> for CoinView {
    fn from(r: &AssetRecord) -> Self {
        let ev = r.evaluation();
        let m = &ev.metrics;
        Self {
            mint: r.mint.clone(),
            name: r.name.clone(),
            symbol: r.symbol.clone(),
            is_pinned: r.is_pinned,
            is_tracked: r.is_tracked,
            market_cap: r.market_cap,
            liquidity: r.liquidity,
            liquidity_change: ev.liquidity_change,
            price: r.price,
            volume_15s: m.volume(Horizon::S15),
            volume_30s: m.volume(Horizon::S30),
            volume_1m: m.volume(Horizon::M1),
            volume_5m: m.volume(Horizon::M5),
            momentum: ev.reading.momentum,
            velocity: ev.reading.velocity,
            avg_transactions: ev.reading.avg_transactions,
            buy_sell_ratio: ev.reading.buy_sell.label(),
            buy_sell_value: ev.reading.buy_sell.value(),
            signal: ev.signal,
            hold_time: ev.hold_hint.text().to_string(),
            is_active: ev.is_active,
            added_at_ms: r.added_at_ms,
            last_updated_ms: r.last_updated_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub tracked: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    /// `"<name> (<SIGNAL>)"` of the most recently updated row, `"-"` when empty.
    pub last_signal: String,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            tracked: 0,
            buy_signals: 0,
            sell_signals: 0,
            last_signal: "-".to_string(),
        }
    }
}

fn passes_filter(r: &AssetRecord, cfg: &ScannerConfig) -> bool {
    r.is_pinned
        || (r.market_cap >= cfg.min_market_cap
            && r.market_cap <= cfg.max_market_cap
            && r.liquidity >= cfg.min_liquidity)
}

fn signal_rank(s: Signal) -> u8 {
    match s {
        Signal::Sell => 0,
        Signal::Hold => 1,
        Signal::Buy => 2,
    }
}

fn compare(a: &CoinView, b: &CoinView, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Symbol => a.symbol.cmp(&b.symbol),
        SortField::MarketCap => a.market_cap.total_cmp(&b.market_cap),
        SortField::Liquidity => a.liquidity.total_cmp(&b.liquidity),
        SortField::LiquidityChange => a.liquidity_change.total_cmp(&b.liquidity_change),
        SortField::Volume15s => a.volume_15s.total_cmp(&b.volume_15s),
        SortField::Volume1m => a.volume_1m.total_cmp(&b.volume_1m),
        SortField::Volume5m => a.volume_5m.total_cmp(&b.volume_5m),
        SortField::Momentum => a.momentum.total_cmp(&b.momentum),
        SortField::Velocity => a.velocity.cmp(&b.velocity),
        SortField::BuySellRatio => a.buy_sell_value.total_cmp(&b.buy_sell_value),
        SortField::Signal => signal_rank(a.signal).cmp(&signal_rank(b.signal)),
        SortField::AddedAt => a.added_at_ms.cmp(&b.added_at_ms),
    }
}

/// Filters, sorts and summarizes. Ties fall back to mint order so the
/// output is deterministic.
pub fn rank<'a>(
    records: impl IntoIterator<Item = &'a AssetRecord>,
    cfg: &ScannerConfig,
    sort: SortSpec,
) -> (Vec<CoinView>, Stats) {
    let mut rows: Vec<CoinView> = records
        .into_iter()
        .filter(|r| passes_filter(r, cfg))
        .map(CoinView::from)
        .collect();

    rows.sort_by(|a, b| {
        let primary = match sort.direction {
            SortDirection::Asc => compare(a, b, sort.field),
            SortDirection::Desc => compare(b, a, sort.field),
        };
        primary.then_with(|| a.mint.cmp(&b.mint))
    });

    let stats = summarize(&rows);
    (rows, stats)
}

fn summarize(rows: &[CoinView]) -> Stats {
    let latest = rows
        .iter()
        .max_by(|a, b| {
            a.last_updated_ms
                .cmp(&b.last_updated_ms)
                .then_with(|| b.mint.cmp(&a.mint))
        })
        .map(|r| format!("{} ({})", r.name, r.signal));

    Stats {
        tracked: rows.len(),
        buy_signals: rows.iter().filter(|r| r.signal == Signal::Buy).count(),
        sell_signals: rows.iter().filter(|r| r.signal == Signal::Sell).count(),
        last_signal: latest.unwrap_or_else(|| "-".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetSeed;
    use crate::tracked::TrackedSet;
    use corelib::{Direction, TradeObservation};

    const NOW: u64 = 1_000_000;

    fn seed(mint: &str, market_cap: f64, liquidity: f64) -> AssetSeed {
        AssetSeed {
            mint: mint.into(),
            name: format!("{mint}-coin"),
            symbol: mint.into(),
            liquidity,
            market_cap,
            price: 0.0,
        }
    }

    fn buy(set: &mut TrackedSet, mint: &str, ts_ms: u64, amount: f64) {
        set.on_trade_event(
            mint,
            TradeObservation {
                ts_ms: Some(ts_ms),
                amount,
                direction: Direction::Buy,
            },
        );
    }

    #[test]
    fn filter_drops_out_of_range_rows_but_keeps_pinned() {
        let cfg = ScannerConfig::default();
        let mut set = TrackedSet::new();
        set.on_discovered(seed("ok", 50.0, 5.0), 1, 10);
        set.on_discovered(seed("thin", 50.0, 0.5), 2, 10);
        set.on_discovered(seed("huge", 500_000.0, 5.0), 3, 10);
        set.toggle_pin("huge");

        let (rows, stats) = rank(set.records(), &cfg, SortSpec::default());
        let mints: Vec<_> = rows.iter().map(|r| r.mint.as_str()).collect();

        assert_eq!(mints, vec!["huge", "ok"]);
        assert_eq!(stats.tracked, 2);
    }

    #[test]
    fn default_sort_is_momentum_descending() {
        let cfg = ScannerConfig::default();
        let mut set = TrackedSet::new();
        set.on_discovered(seed("slow", 50.0, 5.0), 1, 10);
        set.on_discovered(seed("fast", 50.0, 5.0), 2, 10);
        buy(&mut set, "slow", NOW - 200_000, 10.0);
        buy(&mut set, "slow", NOW - 1_000, 1.0);
        buy(&mut set, "fast", NOW - 1_000, 10.0);
        set.refresh_all(NOW, &cfg);

        let (rows, _) = rank(set.records(), &cfg, SortSpec::default());

        assert_eq!(rows[0].mint, "fast");
        assert!(rows[0].momentum > rows[1].momentum);
    }

    #[test]
    fn equal_keys_break_ties_by_mint() {
        let cfg = ScannerConfig::default();
        let mut set = TrackedSet::new();
        for m in ["c", "a", "b"] {
            set.on_discovered(seed(m, 50.0, 5.0), 1, 10);
        }

        let spec = SortSpec {
            field: SortField::Liquidity,
            direction: SortDirection::Asc,
        };
        let (rows, _) = rank(set.records(), &cfg, spec);
        let mints: Vec<_> = rows.iter().map(|r| r.mint.as_str()).collect();
        assert_eq!(mints, vec!["a", "b", "c"]);
    }

    #[test]
    fn stats_count_signals_and_report_latest_change() {
        let cfg = ScannerConfig::default();
        let mut set = TrackedSet::new();
        set.on_discovered(seed("hot", 50.0, 5.0), 1, 10);
        set.on_discovered(seed("cold", 50.0, 5.0), 2, 10);
        for i in 0..4 {
            buy(&mut set, "hot", NOW - 1_000 * i, 3.0);
        }
        set.refresh_all(NOW, &cfg);

        let (_, stats) = rank(set.records(), &cfg, SortSpec::default());

        assert_eq!(stats.buy_signals, 1);
        assert_eq!(stats.sell_signals, 0);
        assert_eq!(stats.last_signal, "hot-coin (BUY)");
    }

    #[test]
    fn empty_set_reports_placeholder() {
        let (rows, stats) = rank(
            TrackedSet::new().records(),
            &ScannerConfig::default(),
            SortSpec::default(),
        );
        assert!(rows.is_empty());
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn sort_field_parsing_accepts_common_spellings() {
        assert_eq!("marketCap".parse::<SortField>().unwrap(), SortField::MarketCap);
        assert_eq!("volume_15s".parse::<SortField>().unwrap(), SortField::Volume15s);
        assert_eq!("buy-sell-ratio".parse::<SortField>().unwrap(), SortField::BuySellRatio);
        assert!(matches!(
            "price".parse::<SortField>(),
            Err(MarketError::UnknownSortField(_))
        ));
        for name in SortField::NAMES {
            assert!(name.parse::<SortField>().is_ok(), "{name}");
        }
    }

    #[test]
    fn bad_sort_direction_is_reported_as_such() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        let err = "sideways".parse::<SortDirection>().unwrap_err();
        assert!(matches!(&err, MarketError::UnknownSortDirection(d) if d == "sideways"));
        assert!(err.to_string().contains("sort direction"));
    }
}
