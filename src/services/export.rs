//! Signals payload export
//!
//! Serializes a run into `n_signals_v1_<TS>Z.json` under the output
//! directory, optionally aliased as `n_signals_v1_latest.json`. Pointer
//! files and repository publishing are owned by the outer publisher, not
//! here.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::America::Sao_Paulo;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{SCHEMA_VERSION, SIGNALS_PREFIX};
use crate::error::{Error, Result};
use crate::models::{Confidence, SourceTag, Tier, ValidationStatus};
use crate::services::pipeline::{AssetReport, RunSummary};

/// One asset row in the signals payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRow {
    pub symbol_canonical: String,
    pub asset_type: String,

    pub price_now_close: Option<f64>,
    pub price_now_close_at: Option<String>,

    pub pct_chg_7d: Option<f64>,
    pub pct_chg_10d: Option<f64>,
    pub pct_chg_30d: Option<f64>,

    pub rsi14: Option<f64>,
    pub atr14: Option<f64>,
    pub bb_ma20: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_upper: Option<f64>,

    pub funding: Option<f64>,
    pub oi_chg_3d_pct: Option<f64>,

    pub level: Option<Tier>,
    pub matched_levels: Vec<Tier>,
    pub confidence: Confidence,
    pub conditions: Vec<String>,

    pub validation_status: ValidationStatus,
    pub source_tag: SourceTag,
    pub sources: Vec<String>,
    pub max_divergence_pct: Option<f64>,
}

impl SignalRow {
    fn from_report(report: &AssetReport) -> Self {
        let ind = &report.indicators;
        let derivs = report.derivatives.clone().unwrap_or_default();

        Self {
            symbol_canonical: report.asset.symbol.clone(),
            asset_type: report.asset.class.section().to_string(),
            price_now_close: ind.close,
            price_now_close_at: report.series.last_date().map(|d| d.to_string()),
            pct_chg_7d: ind.pct_chg_7d,
            pct_chg_10d: ind.pct_chg_10d,
            pct_chg_30d: ind.pct_chg_30d,
            rsi14: ind.rsi14,
            atr14: ind.atr14,
            bb_ma20: ind.bb_ma20,
            bb_lower: ind.bb_lower,
            bb_upper: ind.bb_upper,
            funding: derivs.funding,
            oi_chg_3d_pct: derivs.oi_chg_3d_pct,
            level: report.signal.tier,
            matched_levels: report.signal.matched.clone(),
            confidence: report.signal.confidence,
            conditions: report.signal.evidence.conditions.clone(),
            validation_status: report.series.status,
            source_tag: report.series.source_tag,
            sources: report.series.sources.clone(),
            max_divergence_pct: report.series.max_divergence_pct,
        }
    }
}

/// Complete signals artifact for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsPayload {
    pub schema_version: String,
    pub generated_at_utc: String,
    pub generated_at_brt: String,
    pub brt_date: String,
    pub signals: Vec<SignalRow>,
}

/// Build the payload from a run summary, rows sorted by review priority
pub fn build_payload(summary: &RunSummary) -> SignalsPayload {
    build_payload_at(summary, Utc::now())
}

fn build_payload_at(summary: &RunSummary, now: DateTime<Utc>) -> SignalsPayload {
    let mut signals: Vec<SignalRow> = summary.reports.iter().map(SignalRow::from_report).collect();
    signals.sort_by(|a, b| {
        let pa = a.level.map_or(9, |t| t.priority());
        let pb = b.level.map_or(9, |t| t.priority());
        pa.cmp(&pb).then(a.symbol_canonical.cmp(&b.symbol_canonical))
    });

    let brt = now.with_timezone(&Sao_Paulo);
    SignalsPayload {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at_utc: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        generated_at_brt: brt.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        brt_date: brt.format("%Y-%m-%d").to_string(),
        signals,
    }
}

/// Write the timestamped artifact (and optionally the latest alias)
///
/// Returns the timestamped path and the latest path when written.
pub fn write_payload(
    out_dir: &Path,
    payload: &SignalsPayload,
    write_latest: bool,
) -> Result<(PathBuf, Option<PathBuf>)> {
    fs::create_dir_all(out_dir)
        .map_err(|e| Error::Io(format!("Failed to create {}: {}", out_dir.display(), e)))?;

    let suffix = Utc::now().format("%Y%m%dT%H%M%SZ");
    let path_ts = out_dir.join(format!("{}_{}.json", SIGNALS_PREFIX, suffix));
    let text = serde_json::to_string_pretty(payload)?;
    fs::write(&path_ts, &text)
        .map_err(|e| Error::Io(format!("Failed to write {}: {}", path_ts.display(), e)))?;

    let path_latest = if write_latest {
        let path = out_dir.join(format!("{}_latest.json", SIGNALS_PREFIX));
        fs::write(&path, &text)
            .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Some(path)
    } else {
        None
    };

    info!(
        artifact = %path_ts.display(),
        latest = write_latest,
        signals = payload.signals.len(),
        "Wrote signals payload"
    );

    Ok((path_ts, path_latest))
}

/// Read a signals payload back from disk (used by the status command)
pub fn read_payload(path: &Path) -> Result<SignalsPayload> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

/// Locate the newest payload in the output directory
///
/// Prefers the latest alias; otherwise the timestamped names sort
/// lexicographically, so the maximum is the newest.
pub fn find_latest_payload(out_dir: &Path) -> Result<PathBuf> {
    let latest = out_dir.join(format!("{}_latest.json", SIGNALS_PREFIX));
    if latest.exists() {
        return Ok(latest);
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(out_dir)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", out_dir.display(), e)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| {
                    n.starts_with(SIGNALS_PREFIX) && n.ends_with(".json")
                })
        })
        .collect();
    candidates.sort();

    candidates
        .pop()
        .ok_or_else(|| Error::NotFound(format!("No signals payload in {}", out_dir.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, AssetClass, Bar, Watchlists};
    use crate::services::pipeline::{evaluate_asset, Pipeline};
    use crate::services::snapshot::SnapshotStore;
    use chrono::{NaiveDate, TimeZone};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                Bar::new(date, c, c * 1.02, c * 0.98, c, 1_000.0)
            })
            .collect()
    }

    fn summary_one_eq() -> RunSummary {
        let mut closes = vec![100.0; 30];
        for i in 0..7 {
            closes.push(100.0 - (i + 1) as f64 * 3.6);
        }
        let asset = Asset::new("NYSEARCA:VUG", AssetClass::Equity);
        let report = evaluate_asset(&asset, &bars(&closes), &bars(&closes), None);
        RunSummary {
            reports: vec![report],
        }
    }

    #[test]
    fn test_build_payload_row_fields() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let payload = build_payload_at(&summary_one_eq(), now);

        assert_eq!(payload.schema_version, "1.0");
        assert_eq!(payload.generated_at_utc, "2025-06-02T12:00:00Z");
        // Sao Paulo is UTC-3 year round
        assert_eq!(payload.generated_at_brt, "2025-06-02T09:00:00-03:00");
        assert_eq!(payload.brt_date, "2025-06-02");

        let row = &payload.signals[0];
        assert_eq!(row.symbol_canonical, "NYSEARCA:VUG");
        assert_eq!(row.asset_type, "eq");
        assert_eq!(row.level, Some(Tier::N1));
        assert!(row.pct_chg_7d.unwrap() < -22.0);
        assert_eq!(row.validation_status, ValidationStatus::Ok);
        assert_eq!(row.sources.len(), 2);
        assert!(row.funding.is_none());
        assert_eq!(row.price_now_close_at.as_deref(), Some("2025-02-06"));
    }

    #[test]
    fn test_write_read_and_find_latest() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = build_payload(&summary_one_eq());

        let (path_ts, path_latest) = write_payload(tmp.path(), &payload, true).unwrap();
        assert!(path_ts.exists());
        let latest = path_latest.unwrap();

        let found = find_latest_payload(tmp.path()).unwrap();
        assert_eq!(found, latest);

        let loaded = read_payload(&found).unwrap();
        assert_eq!(loaded.signals.len(), 1);
        assert_eq!(loaded.signals[0].level, Some(Tier::N1));
    }

    #[test]
    fn test_rows_sorted_by_priority() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let mut closes = vec![100.0; 30];
        for i in 0..7 {
            closes.push(100.0 - (i + 1) as f64 * 3.6);
        }
        store
            .save_series("binance", "BINANCE:BTCUSDT", &bars(&closes))
            .unwrap();
        store
            .save_series("coingecko", "BINANCE:BTCUSDT", &bars(&closes))
            .unwrap();

        let mut watchlists = Watchlists::default();
        watchlists.cr.push("BINANCE:BTCUSDT".to_string());

        let mut summary = Pipeline::new(store, 120).run(&watchlists);
        summary.reports.extend(summary_one_eq().reports);

        let payload = build_payload(&summary);
        // N1 equity before the N3C crypto fallback
        assert_eq!(payload.signals[0].level, Some(Tier::N1));
        assert_eq!(payload.signals[1].level, Some(Tier::N3C));
    }

    #[test]
    fn test_find_latest_without_alias() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("n_signals_v1_20250601T000000Z.json"), "{}").unwrap();
        fs::write(tmp.path().join("n_signals_v1_20250602T000000Z.json"), "{}").unwrap();

        let found = find_latest_payload(tmp.path()).unwrap();
        assert!(found
            .to_str()
            .unwrap()
            .ends_with("n_signals_v1_20250602T000000Z.json"));
    }
}
