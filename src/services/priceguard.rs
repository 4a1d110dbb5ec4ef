//! PriceGuard: cross-source price reconciliation
//!
//! Takes the primary and backup daily series for one asset, aligns them by
//! date and decides per day whether a bar is trustworthy:
//! - both sources agree within the class threshold -> accept the primary bar
//! - only one source has the day -> accept it after a relaxed sanity check
//! - sources diverge beyond the threshold -> exclude the day, keep the flag
//!
//! The aggregate status degrades from OK to PARTIAL as soon as any accepted
//! day is single-source, and to FAIL only when nothing survives. Downstream
//! stages treat short or failed series as "indicators unavailable", never as
//! a fatal error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{Asset, Bar, DayCheck, SourceTag, ValidatedSeries, ValidationStatus};

/// Relative difference between two closes, in percent of the reference
///
/// Returns `None` when the reference is zero.
pub fn pct_diff(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        return None;
    }
    Some((a - b).abs() / b.abs() * 100.0)
}

/// Reconcile primary and backup series for one asset into a ValidatedSeries
///
/// Empty slices mean the source was unavailable. Duplicate dates within a
/// source are collapsed, last bar wins.
pub fn reconcile(asset: &Asset, primary: &[Bar], backup: &[Bar]) -> ValidatedSeries {
    let threshold = asset.class.delta_max_pct();
    let primary_name = asset.class.primary_source();
    let backup_name = asset.class.backup_source();

    let mut by_date: BTreeMap<NaiveDate, (Option<&Bar>, Option<&Bar>)> = BTreeMap::new();
    for bar in primary {
        by_date.entry(bar.date).or_insert((None, None)).0 = Some(bar);
    }
    for bar in backup {
        by_date.entry(bar.date).or_insert((None, None)).1 = Some(bar);
    }

    let mut out = ValidatedSeries::empty(asset.symbol.clone(), asset.class);
    let mut dual_days = 0usize;
    let mut primary_days = 0usize;
    let mut backup_days = 0usize;
    let mut mismatch_days = 0usize;

    for (date, pair) in &by_date {
        match pair {
            (Some(p), Some(b)) => match pct_diff(p.close, b.close) {
                Some(diff) if diff <= threshold => {
                    out.bars.push((*p).clone());
                    out.days.push(DayCheck {
                        date: *date,
                        status: ValidationStatus::Ok,
                        divergence_pct: Some(diff),
                        reason: None,
                    });
                    dual_days += 1;
                    if out.max_divergence_pct.map_or(true, |m| diff > m) {
                        out.max_divergence_pct = Some(diff);
                    }
                }
                Some(diff) => {
                    mismatch_days += 1;
                    out.days.push(DayCheck {
                        date: *date,
                        status: ValidationStatus::Fail,
                        divergence_pct: Some(diff),
                        reason: Some(format!(
                            "divergence {:.3}% above {:.2}% threshold",
                            diff, threshold
                        )),
                    });
                }
                None => {
                    // backup close is zero: unusable as a reference, fall
                    // back to the single-source path on the primary bar
                    push_single(&mut out, date, p, &mut primary_days);
                }
            },
            (Some(p), None) => push_single(&mut out, date, p, &mut primary_days),
            (None, Some(b)) => push_single(&mut out, date, b, &mut backup_days),
            (None, None) => unreachable!("date inserted without a bar"),
        }
    }

    if dual_days > 0 || primary_days > 0 {
        out.sources.push(primary_name.to_string());
    }
    if dual_days > 0 || backup_days > 0 {
        out.sources.push(backup_name.to_string());
    }

    out.source_tag = if out.bars.is_empty() {
        if mismatch_days > 0 {
            SourceTag::Mismatch
        } else {
            SourceTag::None
        }
    } else if dual_days > 0 {
        SourceTag::Both
    } else if backup_days == 0 {
        SourceTag::PrimaryOnly
    } else if primary_days == 0 {
        SourceTag::BackupOnly
    } else {
        SourceTag::Both
    };

    out.status = if out.bars.is_empty() {
        ValidationStatus::Fail
    } else if primary_days > 0 || backup_days > 0 {
        ValidationStatus::Partial
    } else {
        ValidationStatus::Ok
    };

    if mismatch_days > 0 {
        warn!(
            symbol = %asset.symbol,
            mismatch_days,
            max_divergence = ?out.max_divergence_pct,
            "PriceGuard excluded divergent days"
        );
    }
    debug!(
        symbol = %asset.symbol,
        accepted = out.bars.len(),
        status = ?out.status,
        tag = ?out.source_tag,
        "PriceGuard reconciliation done"
    );

    out
}

fn push_single(out: &mut ValidatedSeries, date: &NaiveDate, bar: &Bar, counter: &mut usize) {
    if bar.sanity_ok() {
        out.bars.push(bar.clone());
        out.days.push(DayCheck {
            date: *date,
            status: ValidationStatus::Partial,
            divergence_pct: None,
            reason: None,
        });
        *counter += 1;
    } else {
        out.days.push(DayCheck {
            date: *date,
            status: ValidationStatus::Fail,
            divergence_pct: None,
            reason: Some("single-source sanity check failed".to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetClass;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(date(day), close, close * 1.01, close * 0.99, close, 1_000.0)
    }

    fn eq_asset() -> Asset {
        Asset::new("NYSEARCA:VUG", AssetClass::Equity)
    }

    #[test]
    fn test_agreeing_sources_are_ok() {
        let primary: Vec<Bar> = (1..=10).map(|d| bar(d, 100.0)).collect();
        let backup: Vec<Bar> = (1..=10).map(|d| bar(d, 100.2)).collect();

        let series = reconcile(&eq_asset(), &primary, &backup);
        assert_eq!(series.status, ValidationStatus::Ok);
        assert_eq!(series.source_tag, SourceTag::Both);
        assert_eq!(series.len(), 10);
        assert!(series.dual_source());
        // 0.2 vs 100.2 reference -> just under 0.2%
        assert!(series.max_divergence_pct.unwrap() < 0.3);
    }

    #[test]
    fn test_equity_thresholds_at_0p7_and_0p9() {
        // 0.7% off the backup: inside the 0.8% equity threshold
        let series = reconcile(&eq_asset(), &[bar(2, 100.7)], &[bar(2, 100.0)]);
        assert_eq!(series.days[0].status, ValidationStatus::Ok);
        assert_eq!(series.status, ValidationStatus::Ok);

        // 0.9% off the backup: excluded
        let series = reconcile(&eq_asset(), &[bar(2, 100.9)], &[bar(2, 100.0)]);
        assert_eq!(series.days[0].status, ValidationStatus::Fail);
        assert_eq!(series.status, ValidationStatus::Fail);
        assert_eq!(series.source_tag, SourceTag::Mismatch);
        assert!(series.days[0].reason.as_deref().unwrap().contains("divergence"));
    }

    #[test]
    fn test_crypto_uses_tighter_threshold() {
        let asset = Asset::new("BINANCE:BTCUSDT", AssetClass::Crypto);
        // 0.5% apart: fine for equities, too far for crypto
        let series = reconcile(&asset, &[bar(2, 100.5)], &[bar(2, 100.0)]);
        assert_eq!(series.status, ValidationStatus::Fail);
    }

    #[test]
    fn test_single_source_is_partial() {
        let primary: Vec<Bar> = (1..=10).map(|d| bar(d, 100.0)).collect();
        let series = reconcile(&eq_asset(), &primary, &[]);

        assert_eq!(series.status, ValidationStatus::Partial);
        assert_eq!(series.source_tag, SourceTag::PrimaryOnly);
        assert_eq!(series.sources, vec!["stooq"]);
        assert!(!series.dual_source());
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn test_backup_only_is_partial() {
        let backup: Vec<Bar> = (1..=5).map(|d| bar(d, 100.0)).collect();
        let series = reconcile(&eq_asset(), &[], &backup);
        assert_eq!(series.source_tag, SourceTag::BackupOnly);
        assert_eq!(series.sources, vec!["yahoo"]);
    }

    #[test]
    fn test_single_source_sanity_violation_excluded() {
        let mut bad = bar(3, 100.0);
        bad.high = 90.0; // inverted range
        let series = reconcile(&eq_asset(), &[bar(2, 100.0), bad], &[]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.days[1].status, ValidationStatus::Fail);
        assert_eq!(
            series.days[1].reason.as_deref(),
            Some("single-source sanity check failed")
        );
    }

    #[test]
    fn test_mixed_coverage_is_partial_both() {
        // days 1-8 dual, days 9-10 primary only
        let primary: Vec<Bar> = (1..=10).map(|d| bar(d, 100.0)).collect();
        let backup: Vec<Bar> = (1..=8).map(|d| bar(d, 100.1)).collect();

        let series = reconcile(&eq_asset(), &primary, &backup);
        assert_eq!(series.status, ValidationStatus::Partial);
        assert_eq!(series.source_tag, SourceTag::Both);
        assert!(series.dual_source());
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn test_one_divergent_day_keeps_rest() {
        let mut primary: Vec<Bar> = (1..=10).map(|d| bar(d, 100.0)).collect();
        primary[4] = bar(5, 102.0); // 2% off on day 5
        let backup: Vec<Bar> = (1..=10).map(|d| bar(d, 100.0)).collect();

        let series = reconcile(&eq_asset(), &primary, &backup);
        assert_eq!(series.len(), 9);
        assert_eq!(series.status, ValidationStatus::Ok);
        assert_eq!(series.days[4].status, ValidationStatus::Fail);
        assert!(series.max_divergence_pct.unwrap() < 0.1);
    }

    #[test]
    fn test_no_sources_fail() {
        let series = reconcile(&eq_asset(), &[], &[]);
        assert_eq!(series.status, ValidationStatus::Fail);
        assert_eq!(series.source_tag, SourceTag::None);
        assert!(series.sources.is_empty());
    }

    #[test]
    fn test_pct_diff() {
        assert!((pct_diff(100.9, 100.0).unwrap() - 0.9).abs() < 1e-9);
        assert_eq!(pct_diff(1.0, 0.0), None);
    }
}
