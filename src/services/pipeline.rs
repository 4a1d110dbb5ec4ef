//! Per-asset evaluation pipeline
//!
//! reconcile -> indicators -> classify, one asset at a time. Every asset is
//! evaluated independently: a bad snapshot or a failed validation degrades
//! that asset's report and the run moves on.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::constants::PRICEGUARD_SOURCE;
use crate::models::{
    Asset, Bar, Derivatives, IndicatorSet, Signal, Tier, ValidatedSeries, ValidationStatus,
    Watchlists,
};
use crate::services::classifier::classify;
use crate::services::priceguard::reconcile;
use crate::services::snapshot::SnapshotStore;

/// Everything produced for one asset in one run
#[derive(Debug, Clone)]
pub struct AssetReport {
    pub asset: Asset,
    pub series: ValidatedSeries,
    pub indicators: IndicatorSet,
    pub derivatives: Option<Derivatives>,
    pub signal: Signal,
}

/// All per-asset reports of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<AssetReport>,
}

impl RunSummary {
    /// Number of assets that produced a tier assignment
    pub fn signal_count(&self) -> usize {
        self.reports.iter().filter(|r| r.signal.has_signal()).count()
    }

    pub fn tier_count(&self, tier: Tier) -> usize {
        self.reports
            .iter()
            .filter(|r| r.signal.tier == Some(tier))
            .count()
    }

    pub fn status_count(&self, status: ValidationStatus) -> usize {
        self.reports
            .iter()
            .filter(|r| r.series.status == status)
            .count()
    }
}

/// Evaluate one asset from already-loaded source series
pub fn evaluate_asset(
    asset: &Asset,
    primary: &[Bar],
    backup: &[Bar],
    derivatives: Option<&Derivatives>,
) -> AssetReport {
    let series = reconcile(asset, primary, backup);
    let indicators = IndicatorSet::compute(&series);
    let signal = classify(asset, &series, &indicators, derivatives);

    AssetReport {
        asset: asset.clone(),
        series,
        indicators,
        derivatives: derivatives.cloned(),
        signal,
    }
}

/// Batch pipeline over a watchlist, reading from the snapshot store
pub struct Pipeline {
    store: SnapshotStore,
    window_days: usize,
}

impl Pipeline {
    pub fn new(store: SnapshotStore, window_days: usize) -> Self {
        Self { store, window_days }
    }

    /// Evaluate every watchlist asset and write reconciled series back as
    /// the next run's last-known-good fallback
    pub fn run(&self, watchlists: &Watchlists) -> RunSummary {
        let derivatives: HashMap<String, Derivatives> = self.store.load_derivatives();
        let assets = watchlists.assets();
        info!(assets = assets.len(), "Starting pipeline run");

        let mut summary = RunSummary::default();

        for asset in &assets {
            let primary = self.load_window(asset.class.primary_source(), &asset.symbol);
            let backup = self.load_window(asset.class.backup_source(), &asset.symbol);
            let derivs = derivatives.get(&asset.symbol);

            let report = evaluate_asset(asset, &primary, &backup, derivs);

            if report.series.is_usable() {
                if let Err(e) =
                    self.store
                        .save_series(PRICEGUARD_SOURCE, &asset.symbol, &report.series.bars)
                {
                    warn!(symbol = %asset.symbol, error = %e, "Failed to write back reconciled series");
                }
            } else {
                warn!(symbol = %asset.symbol, "No usable data, asset skipped downstream");
            }

            summary.reports.push(report);
        }

        info!(
            assets = summary.reports.len(),
            signals = summary.signal_count(),
            failed = summary.status_count(ValidationStatus::Fail),
            "Pipeline run finished"
        );

        summary
    }

    /// Load a source series trimmed to the trailing evaluation window
    fn load_window(&self, source: &str, symbol: &str) -> Vec<Bar> {
        let mut bars = self.store.load_series(source, symbol).unwrap_or_default();
        if bars.len() > self.window_days {
            bars.drain(..bars.len() - self.window_days);
        }
        bars
    }
}
