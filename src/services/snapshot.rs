//! Last-known-good snapshot store
//!
//! Per-source cached series live under `<data_dir>/<source>/<SYMBOL>.json`.
//! External fetchers (out of scope here) refresh these files; a run reads
//! whatever is present and treats a missing or unreadable snapshot as
//! "source unavailable" for that asset. Reconciled series are written back
//! under the `priceguard` source after a run so the next run has a
//! fallback.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::DERIVATIVES_FILE;
use crate::error::{Error, Result};
use crate::models::{Bar, Derivatives};

/// On-disk shape of one cached series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDoc {
    pub symbol: String,
    pub source: String,
    pub bars: Vec<Bar>,
}

/// Filesystem store for per-source series and the derivatives map
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn series_path(&self, source: &str, symbol: &str) -> PathBuf {
        self.dir
            .join(source)
            .join(format!("{}.json", sanitize_symbol(symbol)))
    }

    /// Load a cached series; missing or unreadable snapshots degrade to
    /// `None`, never an error
    pub fn load_series(&self, source: &str, symbol: &str) -> Option<Vec<Bar>> {
        let path = self.series_path(source, symbol);
        if !path.exists() {
            debug!(source, symbol, "No snapshot for source");
            return None;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(source, symbol, error = %e, "Failed to read snapshot");
                return None;
            }
        };

        match serde_json::from_str::<SourceDoc>(&text) {
            Ok(doc) => {
                let mut bars = doc.bars;
                bars.sort_by_key(|b| b.date);
                Some(bars)
            }
            Err(e) => {
                warn!(source, symbol, error = %e, "Snapshot is not valid JSON, skipping");
                None
            }
        }
    }

    /// Write a series snapshot, creating the source directory if needed
    pub fn save_series(&self, source: &str, symbol: &str, bars: &[Bar]) -> Result<()> {
        let path = self.series_path(source, symbol);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let doc = SourceDoc {
            symbol: symbol.to_string(),
            source: source.to_string(),
            bars: bars.to_vec(),
        };
        let text = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, text)
            .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Load the derivatives map (symbol -> funding / open-interest change)
    ///
    /// A missing file is an empty map; every crypto asset then takes the
    /// N3C fallback path.
    pub fn load_derivatives(&self) -> HashMap<String, Derivatives> {
        let path = self.dir.join(DERIVATIVES_FILE);
        if !path.exists() {
            debug!("No derivatives file, crypto assets fall back to N3C");
            return HashMap::new();
        }

        match fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(Error::from))
        {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Failed to load derivatives map, treating as absent");
                HashMap::new()
            }
        }
    }
}

/// Canonical symbols contain ':' and may contain '/', neither of which
/// belongs in a file name
fn sanitize_symbol(symbol: &str) -> String {
    symbol.replace([':', '/'], "_")
}
