use serde::{Deserialize, Serialize};

/// Derivative-market metrics for a crypto asset
///
/// Sourced from the derivatives map in the data directory. Absence of real
/// values routes the asset through the N3C fallback path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Derivatives {
    /// Latest funding rate
    pub funding: Option<f64>,

    /// Open-interest change over the last 3 days (percent)
    pub oi_chg_3d_pct: Option<f64>,
}

impl Derivatives {
    /// Both metrics are present with real values
    pub fn is_complete(&self) -> bool {
        self.funding.is_some() && self.oi_chg_3d_pct.is_some()
    }
}
