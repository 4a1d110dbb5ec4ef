//! N-level signal classifier
//!
//! Priority-ordered decision table over the indicator snapshot of a
//! validated series. Each row has named conditions; every row that matches
//! is recorded, the highest-priority match becomes the assigned tier and the
//! full evidence travels with the signal.
//!
//! Gates on top of the raw rules:
//! - a FAIL series never signals
//! - N1 needs OK validation, complete indicators and (for crypto) real
//!   derivative data
//! - N2 needs complete indicators and two contributing sources, so a
//!   single-source asset can never rank above N3
//! - a crypto asset without derivatives only goes through the N3C fallback

use tracing::debug;

use crate::constants::{
    MA20_DEV_ATR_MULT, N1_DROP_PCT, N2_DROP_PCT, N3C_CHG10_PCT, N3C_CHG7_PCT, N3_DROP_PCT,
    RSI_MID_HIGH, RSI_MID_LOW, RSI_N2_HIGH, RSI_N2_LOW, RSI_N3_HIGH, RSI_N3_LOW,
};
use crate::models::{
    Asset, AssetClass, Confidence, Derivatives, Evidence, IndicatorSet, Signal, Tier,
    ValidatedSeries, ValidationStatus,
};

/// Named rule conditions evaluated once per asset
#[derive(Debug, Default)]
struct Conditions {
    deep_drop: bool,
    moderate_drop: bool,
    soft_drop: bool,
    n3c_drop: bool,
    rsi_oversold_band: bool,
    rsi_soft_band: bool,
    rsi_mid_band: bool,
    bb_touch: bool,
    ma20_deviation: bool,
}

impl Conditions {
    fn evaluate(ind: &IndicatorSet) -> Self {
        let chg7 = ind.pct_chg_7d;
        let chg10 = ind.pct_chg_10d;

        let drop_leq = |limit: f64| {
            chg7.map_or(false, |v| v <= limit) || chg10.map_or(false, |v| v <= limit)
        };
        let rsi_in = |low: f64, high: f64| ind.rsi14.map_or(false, |r| r >= low && r <= high);

        let bb_touch = match (ind.close, ind.bb_lower) {
            (Some(close), Some(lower)) => close <= lower,
            _ => false,
        };
        let ma20_deviation = match (ind.close, ind.bb_ma20, ind.atr14) {
            (Some(close), Some(ma20), Some(atr)) => {
                (close - ma20).abs() >= MA20_DEV_ATR_MULT * atr
            }
            _ => false,
        };

        Self {
            deep_drop: drop_leq(N1_DROP_PCT),
            moderate_drop: drop_leq(N2_DROP_PCT),
            soft_drop: drop_leq(N3_DROP_PCT),
            n3c_drop: chg7.map_or(false, |v| v <= N3C_CHG7_PCT)
                || chg10.map_or(false, |v| v <= N3C_CHG10_PCT),
            rsi_oversold_band: rsi_in(RSI_N2_LOW, RSI_N2_HIGH),
            rsi_soft_band: rsi_in(RSI_N3_LOW, RSI_N3_HIGH),
            rsi_mid_band: rsi_in(RSI_MID_LOW, RSI_MID_HIGH),
            bb_touch,
            ma20_deviation,
        }
    }

    /// Names of the conditions that fired, for the evidence record
    fn fired(&self) -> Vec<String> {
        [
            ("deep_drop", self.deep_drop),
            ("moderate_drop", self.moderate_drop),
            ("soft_drop", self.soft_drop),
            ("n3c_drop", self.n3c_drop),
            ("rsi_oversold_band", self.rsi_oversold_band),
            ("rsi_soft_band", self.rsi_soft_band),
            ("rsi_mid_band", self.rsi_mid_band),
            ("bb_touch", self.bb_touch),
            ("ma20_deviation", self.ma20_deviation),
        ]
        .iter()
        .filter(|(_, fired)| *fired)
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

/// Classify one asset from its validated series, indicators and (for
/// crypto) derivative data
pub fn classify(
    asset: &Asset,
    series: &ValidatedSeries,
    indicators: &IndicatorSet,
    derivatives: Option<&Derivatives>,
) -> Signal {
    let derivatives_present = derivatives.map_or(false, |d| d.is_complete());
    let conditions = Conditions::evaluate(indicators);

    let evidence = Evidence {
        conditions: conditions.fired(),
        validation: series.status,
        sources: series.sources.clone(),
        derivatives_present,
        indicators: indicators.clone(),
    };

    let mut signal = Signal {
        symbol: asset.symbol.clone(),
        asset_type: asset.class.section().to_string(),
        tier: None,
        matched: Vec::new(),
        confidence: Confidence::Low,
        evidence,
    };

    if !series.is_usable() {
        return signal;
    }

    let complete = indicators.is_complete();
    let dual = series.dual_source();

    if asset.class == AssetClass::Crypto && !derivatives_present {
        // Fallback path: only N3C can fire, whatever the price action says
        if conditions.n3c_drop
            && (conditions.rsi_mid_band || conditions.bb_touch || conditions.ma20_deviation)
        {
            signal.matched.push(Tier::N3C);
            signal.tier = Some(Tier::N3C);
        }
    } else {
        if series.status == ValidationStatus::Ok && complete && conditions.deep_drop {
            signal.matched.push(Tier::N1);
        }
        if dual
            && complete
            && conditions.moderate_drop
            && (conditions.rsi_oversold_band || conditions.ma20_deviation)
        {
            signal.matched.push(Tier::N2);
        }
        if conditions.soft_drop && (conditions.rsi_soft_band || conditions.bb_touch) {
            signal.matched.push(Tier::N3);
        }
        signal.tier = signal
            .matched
            .iter()
            .min_by_key(|t| t.priority())
            .copied();
    }

    signal.confidence = grade_confidence(&signal.matched, dual);

    debug!(
        symbol = %asset.symbol,
        tier = ?signal.tier,
        matched = ?signal.matched,
        confidence = ?signal.confidence,
        "Classified asset"
    );

    signal
}

/// Confidence grade from the matched tiers and source coverage
///
/// High needs N1 corroborated by a lower rule; medium needs dual-source
/// data and any of N2/N3/N3C; everything else is low.
fn grade_confidence(matched: &[Tier], dual_source: bool) -> Confidence {
    let has = |t: Tier| matched.contains(&t);
    if has(Tier::N1) && (has(Tier::N2) || has(Tier::N3)) {
        return Confidence::High;
    }
    if dual_source && (has(Tier::N2) || has(Tier::N3) || has(Tier::N3C)) {
        return Confidence::Medium;
    }
    Confidence::Low
}
