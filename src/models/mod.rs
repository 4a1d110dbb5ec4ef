mod asset;
mod bar;
mod derivatives;
mod feed;
pub mod indicators;
mod series;
mod signal;

pub use asset::{Asset, AssetClass};
pub use bar::Bar;
pub use derivatives::Derivatives;
pub use feed::{Feed, Watchlists};
pub use indicators::IndicatorSet;
pub use series::{DayCheck, SourceTag, ValidatedSeries, ValidationStatus};
pub use signal::{Confidence, Evidence, Signal, Tier};
