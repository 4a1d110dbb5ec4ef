use std::path::PathBuf;

use crate::error::Error;
use crate::models::{Tier, ValidationStatus};
use crate::services::{build_payload, fetch_feed, write_payload, Pipeline, SnapshotStore};
use crate::utils::{get_data_dir, get_out_dir};

pub fn run(
    feed: String,
    data_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    days: usize,
    write_latest: bool,
) {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);
    let out_dir = out_dir.unwrap_or_else(get_out_dir);

    println!("📥 Loading feed from {}...", feed);
    let feed_doc = match load_feed(&feed) {
        Ok(feed_doc) => feed_doc,
        Err(e) => {
            eprintln!("❌ Failed to load feed: {}", e);
            std::process::exit(1);
        }
    };

    let watchlists = feed_doc.watchlists();
    if watchlists.is_empty() {
        eprintln!("❌ Feed has no watchlist symbols");
        std::process::exit(1);
    }
    println!(
        "📋 Watchlist: {} equities/ETFs, {} crypto",
        watchlists.eq.len(),
        watchlists.cr.len()
    );

    let store = SnapshotStore::new(&data_dir);
    let pipeline = Pipeline::new(store, days);

    println!("🔍 Evaluating {} assets (window: {} days)...", watchlists.eq.len() + watchlists.cr.len(), days);
    let summary = pipeline.run(&watchlists);

    println!("\n📊 Validation:");
    println!("   OK      : {}", summary.status_count(ValidationStatus::Ok));
    println!("   PARTIAL : {}", summary.status_count(ValidationStatus::Partial));
    println!("   FAIL    : {}", summary.status_count(ValidationStatus::Fail));

    println!("📊 Signals: {} of {} assets", summary.signal_count(), summary.reports.len());
    for tier in [Tier::N1, Tier::N2, Tier::N3C, Tier::N3] {
        let count = summary.tier_count(tier);
        if count > 0 {
            println!("   {:4}: {}", tier.as_str(), count);
        }
    }

    let payload = build_payload(&summary);
    match write_payload(&out_dir, &payload, write_latest) {
        Ok((path_ts, path_latest)) => {
            println!("\n✅ Signals payload written: {}", path_ts.display());
            if let Some(latest) = path_latest {
                println!("✅ Latest alias updated: {}", latest.display());
            }
        }
        Err(e) => {
            eprintln!("\n❌ Failed to write payload: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_feed(feed: &str) -> Result<crate::models::Feed, Error> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Network(format!("Failed to create runtime: {}", e)))?;
    runtime.block_on(fetch_feed(feed))
}
