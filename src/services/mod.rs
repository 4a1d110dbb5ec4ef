pub mod classifier;
pub mod export;
pub mod feed_loader;
pub mod pipeline;
pub mod priceguard;
pub mod snapshot;

pub use classifier::classify;
pub use export::{build_payload, find_latest_payload, read_payload, write_payload, SignalsPayload};
pub use feed_loader::fetch_feed;
pub use pipeline::{evaluate_asset, AssetReport, Pipeline, RunSummary};
pub use priceguard::reconcile;
pub use snapshot::SnapshotStore;
