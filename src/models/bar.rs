use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Basic OHLCV (Open, High, Low, Close, Volume) daily bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date (UTC)
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Trading volume (fractional for crypto)
    pub volume: f64,
}

impl Bar {
    /// Create a new daily bar
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Relaxed single-source sanity check: positive close, non-inverted
    /// range and close inside the day's range
    pub fn sanity_ok(&self) -> bool {
        self.close > 0.0
            && self.high >= self.low
            && self.close <= self.high
            && self.close >= self.low
    }

    /// True range against the previous close
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}
