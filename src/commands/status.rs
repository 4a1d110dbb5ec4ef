use std::path::PathBuf;

use crate::models::{Confidence, Tier};
use crate::services::{find_latest_payload, read_payload};
use crate::utils::get_out_dir;

/// Print source-coverage and tier diagnostics from the newest payload
pub fn run(out_dir: Option<PathBuf>) {
    let out_dir = out_dir.unwrap_or_else(get_out_dir);

    let path = match find_latest_payload(&out_dir) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let payload = match read_payload(&path) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    println!("📄 Payload : {}", path.display());
    println!("🕐 Generated: {} (BRT {})", payload.generated_at_utc, payload.generated_at_brt);

    let total = payload.signals.len();
    let dual = payload.signals.iter().filter(|r| r.sources.len() >= 2).count();
    println!("\n== Source coverage ==");
    println!("   Assets       : {}", total);
    println!("   Dual-source  : {}", dual);
    println!("   Single-source: {}", total - dual);

    println!("\n== Tiers ==");
    for tier in [Tier::N1, Tier::N2, Tier::N3C, Tier::N3] {
        let count = payload
            .signals
            .iter()
            .filter(|r| r.level == Some(tier))
            .count();
        println!("   {:4}: {}", tier.as_str(), count);
    }
    let unsignaled = payload.signals.iter().filter(|r| r.level.is_none()).count();
    println!("   none: {}", unsignaled);

    // single-source signals are the ones worth fixing first
    let weak: Vec<&str> = payload
        .signals
        .iter()
        .filter(|r| r.level.is_some() && (r.sources.len() < 2 || r.confidence == Confidence::Low))
        .map(|r| r.symbol_canonical.as_str())
        .collect();

    if weak.is_empty() {
        println!("\n✅ All signals are dual-source");
    } else {
        println!("\n⚠️  Low-coverage signals (check source snapshots):");
        for symbol in weak {
            println!("   {}", symbol);
        }
    }
}
