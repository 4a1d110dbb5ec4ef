use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AssetClass, Bar};

/// Aggregate (or per-day) validation outcome of a reconciled series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    /// Every accepted day was confirmed by both sources
    Ok,
    /// At least one accepted day came from a single source
    Partial,
    /// Nothing usable survived reconciliation
    Fail,
}

/// Coarse summary of where a validated series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTag {
    /// Both sources contributed confirmed days
    Both,
    /// Only the primary source was available
    PrimaryOnly,
    /// Only the backup source was available
    BackupOnly,
    /// Sources were present but diverged beyond the threshold
    Mismatch,
    /// No source produced data
    None,
}

/// Per-day reconciliation decision, kept for auditability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCheck {
    pub date: NaiveDate,
    pub status: ValidationStatus,

    /// Cross-source close divergence (percent) when both sources had the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence_pct: Option<f64>,

    /// Why the day was rejected, for FAIL days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Ordered OHLCV series for one asset after PriceGuard reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedSeries {
    pub symbol: String,
    pub class: AssetClass,

    /// Accepted bars in date order
    pub bars: Vec<Bar>,

    /// One entry per aligned date, including excluded days
    pub days: Vec<DayCheck>,

    pub status: ValidationStatus,
    pub source_tag: SourceTag,

    /// Names of the sources that contributed accepted bars
    pub sources: Vec<String>,

    /// Largest cross-source divergence observed on dual-source days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_divergence_pct: Option<f64>,
}

impl ValidatedSeries {
    /// Empty FAIL series for an asset with no usable data
    pub fn empty(symbol: impl Into<String>, class: AssetClass) -> Self {
        Self {
            symbol: symbol.into(),
            class,
            bars: Vec::new(),
            days: Vec::new(),
            status: ValidationStatus::Fail,
            source_tag: SourceTag::None,
            sources: Vec::new(),
            max_divergence_pct: None,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Usable for downstream computation (indicators, classification)
    pub fn is_usable(&self) -> bool {
        self.status != ValidationStatus::Fail
    }

    /// Confirmed by at least two independent sources
    pub fn dual_source(&self) -> bool {
        self.sources.len() >= 2
    }

    /// Date of the most recent accepted bar
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
