use std::fmt::Write;

use common::time::clock_label;
use market::{CoinView, TickReport};

/// Longest name/symbol shown before truncation.
const NAME_WIDTH: usize = 14;
const SYMBOL_WIDTH: usize = 8;

pub fn render_json(report: &TickReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string(report)?)
}

pub fn render_table(report: &TickReport) -> String {
    let mut out = String::new();
    let s = &report.stats;

    let _ = writeln!(
        out,
        "[{}] tracked {} | BUY {} | SELL {} | last {} | sort {} | cfg v{}",
        clock_label(report.ts_ms),
        s.tracked,
        s.buy_signals,
        s.sell_signals,
        s.last_signal,
        report.sort,
        report.config.version,
    );
    let _ = writeln!(
        out,
        "{:<2} {:<14} {:<8} {:>9} {:>8} {:>7} {:>8} {:>8} {:>8} {:>6} {:>4} {:>7} {:<4} {}",
        "", "NAME", "SYMBOL", "MCAP", "LIQ", "dLIQ%", "V15s", "V1m", "V5m", "MOM", "VEL", "B:S",
        "SIG", "HOLD",
    );
    for row in &report.rows {
        let _ = writeln!(out, "{}", render_row(row));
    }
    if report.rows.is_empty() {
        let _ = writeln!(out, "   (no coins pass the current filters)");
    }

    for alert in &report.active_alerts {
        let _ = writeln!(out, "!! {} [{}]", alert.message, clock_label(alert.created_at_ms));
    }
    out
}

fn render_row(row: &CoinView) -> String {
    let flags = format!(
        "{}{}",
        if row.is_pinned { '*' } else { ' ' },
        if row.is_active { '+' } else { ' ' },
    );
    format!(
        "{flags:<2} {:<14} {:<8} {:>9.2} {:>8.2} {:>7.2} {:>8.3} {:>8.3} {:>8.3} {:>6.2} {:>4} {:>7} {:<4} {}",
        truncate(&row.name, NAME_WIDTH),
        truncate(&row.symbol, SYMBOL_WIDTH),
        row.market_cap,
        row.liquidity,
        row.liquidity_change,
        row.volume_15s,
        row.volume_1m,
        row.volume_5m,
        row.momentum,
        row.velocity,
        row.buy_sell_ratio,
        row.signal.to_string(),
        row.hold_time,
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
