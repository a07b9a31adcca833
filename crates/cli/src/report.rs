#![allow(clippy::format_push_string)]

use cointegrator_backtest::BacktestRow;
use cointegrator_pairs::{CointegrationResult, PairZScore, RankedPair};

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────────────────────";

fn header(title: &str) -> String {
    format!("\n{RULE}\n{title:^79}\n{RULE}\n")
}

pub fn cointegration_table(pairs: &[CointegrationResult]) -> String {
    let mut output = header("HOT COINTEGRATED PAIRS");

    if pairs.is_empty() {
        output.push_str("No cointegrated pairs found\n");
        return output;
    }

    output.push_str(&format!(
        "{:<12} {:<12} {:>8} {:>11} {:>10} {:>11} {:>10}\n",
        "Symbol 1", "Symbol 2", "P-Value", "Statistic", "Critical", "Hedge", "Crossings"
    ));
    output.push_str(THIN_RULE);
    output.push('\n');

    for pair in pairs {
        output.push_str(&format!(
            "{:<12} {:<12} {:>8.3} {:>11.4} {:>10.4} {:>11.4} {:>10}\n",
            pair.symbol1,
            pair.symbol2,
            pair.pvalue,
            pair.cointegration_value,
            pair.critical_value,
            pair.hedge_ratio,
            pair.zero_crossings
        ));
    }

    output.push_str(RULE);
    output.push_str(&format!("\nHot pairs: {}\n", pairs.len()));
    output
}

pub fn ranked_table(pairs: &[RankedPair]) -> String {
    let mut output = header("BEST COINTEGRATED PAIRS");

    if pairs.is_empty() {
        output.push_str("No cointegrated pairs found\n");
        return output;
    }

    output.push_str(&format!(
        "{:>4} {:<12} {:<12} {:>8} {:>11} {:>11} {:>10}\n",
        "#", "Symbol 1", "Symbol 2", "P-Value", "Statistic", "Hedge", "Crossings"
    ));
    output.push_str(THIN_RULE);
    output.push('\n');

    for (rank, pair) in pairs.iter().enumerate() {
        output.push_str(&format!(
            "{:>4} {:<12} {:<12} {:>8.3} {:>11.4} {:>11.4} {:>10}\n",
            rank + 1,
            pair.symbol1,
            pair.symbol2,
            pair.pvalue,
            pair.cointegration_value,
            pair.hedge_ratio,
            pair.zero_crossings
        ));
    }

    output.push_str(RULE);
    output.push('\n');
    output
}

pub fn zscore_summary(zscores: &[PairZScore]) -> String {
    let mut output = header("SPREAD Z-SCORES");

    if zscores.is_empty() {
        output.push_str("No z-scores available\n");
        return output;
    }

    output.push_str(&format!(
        "{:<12} {:<12} {:>8} {:>12}\n",
        "Symbol 1", "Symbol 2", "Points", "Latest Z"
    ));
    output.push_str(THIN_RULE);
    output.push('\n');

    for series in zscores {
        let latest = latest_finite(&series.zscore)
            .map_or_else(|| "n/a".to_string(), |z| format!("{z:.4}"));
        output.push_str(&format!(
            "{:<12} {:<12} {:>8} {:>12}\n",
            series.symbol1,
            series.symbol2,
            series.zscore.len(),
            latest
        ));
    }

    output.push_str(RULE);
    output.push('\n');
    output
}

pub fn backtest_table(coin1: &str, coin2: &str, rows: &[BacktestRow]) -> String {
    let mut output = header(&format!("BACKTEST {coin1} / {coin2}"));

    output.push_str(&format!(
        "{:>6} {:>14} {:>14} {:>10} {:>10} {:>12} {:>10}\n",
        "Step", coin1, coin2, "Norm 1", "Norm 2", "Spread", "Z-Score"
    ));
    output.push_str(THIN_RULE);
    output.push('\n');

    for (step, row) in rows.iter().enumerate() {
        output.push_str(&format!(
            "{:>6} {:>14.6} {:>14.6} {:>10.4} {:>10.4} {:>12.6} {:>10.4}\n",
            step,
            row.symbol1,
            row.symbol2,
            row.symbol1_normalized,
            row.symbol2_normalized,
            row.spread,
            row.zscore
        ));
    }

    output.push_str(RULE);
    output.push_str(&format!("\nRows: {}\n", rows.len()));
    output
}

fn latest_finite(values: &[f64]) -> Option<f64> {
    values.iter().rev().copied().find(|v| v.is_finite())
}
