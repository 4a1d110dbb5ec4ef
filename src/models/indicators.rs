//! Technical indicators for validated daily series
//!
//! Minimum set used by the N-level rules:
//! - RSI(14), Wilder smoothing
//! - ATR(14), Wilder smoothing over true range
//! - Bollinger Bands(20, 2): 20-day SMA ± 2 population standard deviations
//! - Percent change over the last n bars (7/10/30)
//!
//! All functions return `None` when the window is insufficient, never NaN,
//! so serialized indicators stay JSON-stable.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATR_PERIOD, BB_PERIOD, BB_STD_MULT, MIN_BARS_BB, MIN_BARS_RSI, RSI_PERIOD,
};
use crate::models::{Bar, ValidatedSeries};

/// Calculate RSI with Wilder smoothing over the last `period` deltas
///
/// Seed is the simple average of the first `period` gains/losses, then the
/// recursive `(prev * (period - 1) + x) / period` update. An all-gain window
/// yields 100, an all-loss window yields 0. A flat window is neutral (50).
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let mut avg_gain = deltas[..period]
        .iter()
        .map(|d| d.max(0.0))
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = deltas[..period]
        .iter()
        .map(|d| (-d).max(0.0))
        .sum::<f64>()
        / period as f64;

    for d in &deltas[period..] {
        avg_gain = (avg_gain * (period as f64 - 1.0) + d.max(0.0)) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + (-d).max(0.0)) / period as f64;
    }

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return Some(50.0);
        }
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Calculate ATR with Wilder smoothing over true range
///
/// True range needs a previous close, so `period + 1` bars are required.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let trs: Vec<f64> = bars
        .windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .collect();

    let mut atr = trs[..period].iter().sum::<f64>() / period as f64;
    for tr in &trs[period..] {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
    }

    Some(atr)
}

/// Simple moving average over the trailing `period` closes
pub fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Bollinger Bands over the trailing window: (upper, mid, lower)
///
/// The midline is exactly the SMA; the bands are `mult` population standard
/// deviations (ddof = 0) away.
pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> Option<(f64, f64, f64)> {
    let mid = calculate_sma(closes, period)?;
    let window = &closes[closes.len() - period..];
    let var = window.iter().map(|c| (c - mid) * (c - mid)).sum::<f64>() / period as f64;
    let std = var.sqrt();
    Some((mid + mult * std, mid, mid - mult * std))
}

/// Percent change between the last close and the close `n` bars earlier
pub fn pct_change_n(closes: &[f64], n: usize) -> Option<f64> {
    if n == 0 || closes.len() < n + 1 {
        return None;
    }
    let last = closes[closes.len() - 1];
    let prev = closes[closes.len() - 1 - n];
    if prev == 0.0 {
        return None;
    }
    Some((last - prev) / prev.abs() * 100.0)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Per-asset indicator snapshot derived from a validated series
///
/// `None` means unavailable: the series failed validation or was too short
/// for the window. Fields serialize as null so downstream consumers see a
/// stable shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi14: Option<f64>,
    pub atr14: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_ma20: Option<f64>,
    pub bb_lower: Option<f64>,
    pub close: Option<f64>,
    pub pct_chg_7d: Option<f64>,
    pub pct_chg_10d: Option<f64>,
    pub pct_chg_30d: Option<f64>,
}

impl IndicatorSet {
    /// All-null set for assets whose series failed validation
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Compute the snapshot from a validated series, gated on status and
    /// minimum lengths
    pub fn compute(series: &ValidatedSeries) -> Self {
        if !series.is_usable() || series.is_empty() {
            return Self::unavailable();
        }

        let closes = series.closes();
        let mut out = Self {
            close: closes.last().copied(),
            ..Self::default()
        };

        if closes.len() >= MIN_BARS_RSI {
            out.rsi14 = calculate_rsi(&closes, RSI_PERIOD).map(|v| round_to(v, 2));
            out.atr14 = calculate_atr(&series.bars, ATR_PERIOD).map(|v| round_to(v, 6));
        }

        if closes.len() >= MIN_BARS_BB {
            if let Some((upper, mid, lower)) = calculate_bollinger(&closes, BB_PERIOD, BB_STD_MULT)
            {
                out.bb_upper = Some(round_to(upper, 6));
                out.bb_ma20 = Some(round_to(mid, 6));
                out.bb_lower = Some(round_to(lower, 6));
            }
        }

        out.pct_chg_7d = pct_change_n(&closes, 7);
        out.pct_chg_10d = pct_change_n(&closes, 10);
        out.pct_chg_30d = pct_change_n(&closes, 30);

        out
    }

    /// Complete enough for the N1/N2 rules (RSI, ATR and Bollinger present)
    pub fn is_complete(&self) -> bool {
        self.rsi14.is_some()
            && self.atr14.is_some()
            && self.bb_ma20.is_some()
            && self.bb_lower.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetClass, SourceTag, ValidationStatus};
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                Bar::new(date, c, c + 1.0, c - 1.0, c, 1_000.0)
            })
            .collect()
    }

    fn series_from_closes(closes: &[f64]) -> ValidatedSeries {
        ValidatedSeries {
            symbol: "TEST:TEST".to_string(),
            class: AssetClass::Equity,
            bars: bars_from_closes(closes),
            days: Vec::new(),
            status: ValidationStatus::Ok,
            source_tag: SourceTag::Both,
            sources: vec!["stooq".to_string(), "yahoo".to_string()],
            max_divergence_pct: Some(0.1),
        }
    }

    #[test]
    fn test_rsi_monotonic_up_approaches_100() {
        let closes: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!(rsi > 99.0, "rsi = {}", rsi);
    }

    #[test]
    fn test_rsi_monotonic_down_approaches_0() {
        let closes: Vec<f64> = (1..=30).rev().map(|i| i as f64).collect();
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!(rsi < 1.0, "rsi = {}", rsi);
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let closes = vec![50.0; 20];
        assert_eq!(calculate_rsi(&closes, 14), Some(50.0));
    }

    #[test]
    fn test_rsi_insufficient_window() {
        let closes: Vec<f64> = (1..=14).map(|i| i as f64).collect();
        assert_eq!(calculate_rsi(&closes, 14), None);
    }

    #[test]
    fn test_atr_constant_range() {
        // constant close with a fixed 2.0 daily range: ATR converges to 2.0
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                Bar::new(date, 100.0, 101.0, 99.0, 100.0, 0.0)
            })
            .collect();
        let atr = calculate_atr(&bars, 14).unwrap();
        assert!((atr - 2.0).abs() < 1e-9, "atr = {}", atr);
    }

    #[test]
    fn test_bollinger_mid_is_sma() {
        let closes: Vec<f64> = (1..=25).map(|i| (i as f64) * 1.5 + 3.0).collect();
        let (upper, mid, lower) = calculate_bollinger(&closes, 20, 2.0).unwrap();
        let sma = calculate_sma(&closes, 20).unwrap();
        assert_eq!(mid, sma);
        assert!(upper > mid && mid > lower);
        // bands are symmetric around the midline
        assert!(((upper - mid) - (mid - lower)).abs() < 1e-9);
    }

    #[test]
    fn test_pct_change_n() {
        let closes = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 110.0];
        let chg = pct_change_n(&closes, 7).unwrap();
        assert!((chg - 10.0).abs() < 1e-9);
        assert_eq!(pct_change_n(&closes, 10), None);
    }

    #[test]
    fn test_compute_gates_on_length() {
        let closes: Vec<f64> = (1..=16).map(|i| 100.0 + i as f64).collect();
        let set = IndicatorSet::compute(&series_from_closes(&closes));
        // 16 bars: RSI/ATR available, Bollinger not
        assert!(set.rsi14.is_some());
        assert!(set.atr14.is_some());
        assert!(set.bb_ma20.is_none());
        assert!(!set.is_complete());
    }

    #[test]
    fn test_compute_failed_series_is_unavailable() {
        let mut series = series_from_closes(&(1..=30).map(|i| i as f64).collect::<Vec<_>>());
        series.status = ValidationStatus::Fail;
        let set = IndicatorSet::compute(&series);
        assert!(set.close.is_none());
        assert!(!set.is_complete());
    }

    #[test]
    fn test_compute_full_window() {
        let closes: Vec<f64> = (1..=40).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let set = IndicatorSet::compute(&series_from_closes(&closes));
        assert!(set.is_complete());
        assert!(set.bb_upper.is_some());
        assert!(set.pct_chg_30d.is_some());
    }
}
