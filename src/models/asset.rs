use serde::{Deserialize, Serialize};

use crate::constants::{
    CR_BACKUP_SOURCE, CR_DELTA_MAX_PCT, CR_PRIMARY_SOURCE, EQ_BACKUP_SOURCE, EQ_DELTA_MAX_PCT,
    EQ_PRIMARY_SOURCE,
};

/// Asset class of a watchlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Equities and ETFs
    Equity,
    /// Crypto assets
    Crypto,
}

impl AssetClass {
    /// Short section key used in feeds and payloads ("eq" / "cr")
    pub fn section(&self) -> &'static str {
        match self {
            AssetClass::Equity => "eq",
            AssetClass::Crypto => "cr",
        }
    }

    /// PriceGuard cross-source divergence threshold for this class (percent)
    pub fn delta_max_pct(&self) -> f64 {
        match self {
            AssetClass::Equity => EQ_DELTA_MAX_PCT,
            AssetClass::Crypto => CR_DELTA_MAX_PCT,
        }
    }

    /// Snapshot directory of the primary source for this class
    pub fn primary_source(&self) -> &'static str {
        match self {
            AssetClass::Equity => EQ_PRIMARY_SOURCE,
            AssetClass::Crypto => CR_PRIMARY_SOURCE,
        }
    }

    /// Snapshot directory of the backup source for this class
    pub fn backup_source(&self) -> &'static str {
        match self {
            AssetClass::Equity => EQ_BACKUP_SOURCE,
            AssetClass::Crypto => CR_BACKUP_SOURCE,
        }
    }
}

/// A single watchlist asset identified by its canonical symbol
///
/// Canonical symbols carry the venue as a prefix, e.g. "NYSEARCA:VUG" or
/// "BINANCE:BTCUSDT".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub class: AssetClass,
}

impl Asset {
    pub fn new(symbol: impl Into<String>, class: AssetClass) -> Self {
        Self {
            symbol: symbol.into(),
            class,
        }
    }

    /// Venue part of the canonical symbol, if present
    pub fn venue(&self) -> Option<&str> {
        self.symbol.split_once(':').map(|(venue, _)| venue)
    }

    /// Ticker/pair part of the canonical symbol
    pub fn ticker(&self) -> &str {
        self.symbol
            .split_once(':')
            .map(|(_, ticker)| ticker)
            .unwrap_or(&self.symbol)
    }
}
