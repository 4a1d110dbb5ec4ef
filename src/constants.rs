//! Pipeline Thresholds and Defaults
//!
//! PriceGuard discrepancy limits, indicator windows and the N-level rule
//! thresholds used by the classifier.
//!
//! ## Threshold Units
//! All `*_PCT` values are percentages, not ratios: a cross-source close
//! divergence of 0.9% is stored as `0.9`, and a 7-day drop of 12% shows up
//! as `chg_7d = -12.0`.

/// Maximum allowed cross-source close divergence for equities/ETFs (percent)
pub const EQ_DELTA_MAX_PCT: f64 = 0.8;

/// Maximum allowed cross-source close divergence for crypto (percent)
///
/// Crypto sources quote the same venue-less USD price, so the tolerance is
/// tighter than for equities (where dividend adjustments differ).
pub const CR_DELTA_MAX_PCT: f64 = 0.35;

/// RSI lookback window
pub const RSI_PERIOD: usize = 14;

/// ATR lookback window
pub const ATR_PERIOD: usize = 14;

/// Bollinger Bands lookback window
pub const BB_PERIOD: usize = 20;

/// Bollinger Bands standard-deviation multiplier
pub const BB_STD_MULT: f64 = 2.0;

/// Minimum closes required for a complete RSI/ATR value (period + 1 deltas)
pub const MIN_BARS_RSI: usize = RSI_PERIOD + 1;

/// Minimum closes required for Bollinger Bands
pub const MIN_BARS_BB: usize = BB_PERIOD;

// N-level rule thresholds. Drops are percent changes over 7/10 days, so all
// values are negative.

/// N1: deep drop over 7 or 10 days
pub const N1_DROP_PCT: f64 = -22.0;

/// N2: moderate drop over 7 or 10 days
pub const N2_DROP_PCT: f64 = -12.0;

/// N3: soft drop over 7 or 10 days
pub const N3_DROP_PCT: f64 = -8.0;

/// N3C: 7-day drop threshold (crypto fallback without derivatives)
pub const N3C_CHG7_PCT: f64 = -8.0;

/// N3C: 10-day drop threshold (crypto fallback without derivatives)
pub const N3C_CHG10_PCT: f64 = -10.0;

/// RSI band for the N2 rule
pub const RSI_N2_LOW: f64 = 38.0;
pub const RSI_N2_HIGH: f64 = 50.0;

/// RSI band for the N3 rule
pub const RSI_N3_LOW: f64 = 40.0;
pub const RSI_N3_HIGH: f64 = 55.0;

/// RSI band for the N3C fallback rule
pub const RSI_MID_LOW: f64 = 38.0;
pub const RSI_MID_HIGH: f64 = 55.0;

/// Deviation from the 20-day mean counts as stretched when it exceeds
/// this many ATRs
pub const MA20_DEV_ATR_MULT: f64 = 1.5;

/// Schema version written into every signals payload
pub const SCHEMA_VERSION: &str = "1.0";

/// Default number of daily bars kept per asset for a run
pub const DEFAULT_WINDOW_DAYS: usize = 120;

/// Snapshot source directory names per asset class
pub const EQ_PRIMARY_SOURCE: &str = "stooq";
pub const EQ_BACKUP_SOURCE: &str = "yahoo";
pub const CR_PRIMARY_SOURCE: &str = "binance";
pub const CR_BACKUP_SOURCE: &str = "coingecko";

/// Snapshot directory that holds reconciled series written back after a run
pub const PRICEGUARD_SOURCE: &str = "priceguard";

/// Derivatives map file name inside the data directory
pub const DERIVATIVES_FILE: &str = "derivatives.json";

/// Basename prefix for signals payload artifacts
pub const SIGNALS_PREFIX: &str = "n_signals_v1";
