//! Watchlist feed document
//!
//! The feed is a JSON file with a `watchlists` key, either at the top level
//! or nested under `universe`. Each venue section (`avenue` for equities,
//! `binance` for crypto) carries `whitelist` and `candidate_pool` entry
//! lists with canonical symbols.

use serde::{Deserialize, Serialize};

use crate::models::{Asset, AssetClass};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feed {
    #[serde(default)]
    watchlists: Option<WatchlistRoot>,
    #[serde(default)]
    universe: Option<Universe>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Universe {
    #[serde(default)]
    watchlists: Option<WatchlistRoot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WatchlistRoot {
    #[serde(default)]
    avenue: VenuePool,
    #[serde(default)]
    binance: VenuePool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VenuePool {
    #[serde(default)]
    whitelist: Vec<WatchlistEntry>,
    #[serde(default)]
    candidate_pool: Vec<WatchlistEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct WatchlistEntry {
    #[serde(default)]
    symbol_canonical: Option<String>,
}

/// Flat symbol lists extracted from a feed
#[derive(Debug, Clone, Default, Serialize)]
pub struct Watchlists {
    pub eq: Vec<String>,
    pub cr: Vec<String>,
}

impl Watchlists {
    pub fn is_empty(&self) -> bool {
        self.eq.is_empty() && self.cr.is_empty()
    }

    /// All watchlist assets, equities first
    pub fn assets(&self) -> Vec<Asset> {
        self.eq
            .iter()
            .map(|s| Asset::new(s.clone(), AssetClass::Equity))
            .chain(
                self.cr
                    .iter()
                    .map(|s| Asset::new(s.clone(), AssetClass::Crypto)),
            )
            .collect()
    }
}

impl Feed {
    /// Extract flat eq/cr watchlists, whitelist before candidate pool,
    /// duplicates removed in first-seen order
    pub fn watchlists(&self) -> Watchlists {
        let root = self
            .watchlists
            .as_ref()
            .or_else(|| self.universe.as_ref().and_then(|u| u.watchlists.as_ref()));

        let mut out = Watchlists::default();
        let Some(root) = root else {
            return out;
        };

        collect_symbols(&root.avenue, &mut out.eq);
        collect_symbols(&root.binance, &mut out.cr);
        out
    }
}

fn collect_symbols(pool: &VenuePool, out: &mut Vec<String>) {
    for entry in pool.whitelist.iter().chain(pool.candidate_pool.iter()) {
        if let Some(sym) = &entry.symbol_canonical {
            if !sym.is_empty() && !out.iter().any(|s| s == sym) {
                out.push(sym.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_top_level_watchlists() {
        let feed: Feed = serde_json::from_str(
            r#"{
                "watchlists": {
                    "avenue": {
                        "whitelist": [{"symbol_canonical": "NYSEARCA:VUG"}],
                        "candidate_pool": [{"symbol_canonical": "NASDAQ:NVDA"}]
                    },
                    "binance": {
                        "whitelist": [{"symbol_canonical": "BINANCE:BTCUSDT"}],
                        "candidate_pool": [{"symbol_canonical": "BINANCE:ETHUSDT"}]
                    }
                }
            }"#,
        )
        .unwrap();

        let wl = feed.watchlists();
        assert_eq!(wl.eq, vec!["NYSEARCA:VUG", "NASDAQ:NVDA"]);
        assert_eq!(wl.cr, vec!["BINANCE:BTCUSDT", "BINANCE:ETHUSDT"]);
    }

    #[test]
    fn test_extract_nested_universe_watchlists() {
        let feed: Feed = serde_json::from_str(
            r#"{
                "universe": {
                    "watchlists": {
                        "binance": {
                            "whitelist": [{"symbol_canonical": "BINANCE:SOLUSDT"}]
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let wl = feed.watchlists();
        assert!(wl.eq.is_empty());
        assert_eq!(wl.cr, vec!["BINANCE:SOLUSDT"]);
    }

    #[test]
    fn test_extract_skips_duplicates_and_empty() {
        let feed: Feed = serde_json::from_str(
            r#"{
                "watchlists": {
                    "avenue": {
                        "whitelist": [
                            {"symbol_canonical": "NYSEARCA:VUG"},
                            {"symbol_canonical": ""},
                            {}
                        ],
                        "candidate_pool": [{"symbol_canonical": "NYSEARCA:VUG"}]
                    }
                }
            }"#,
        )
        .unwrap();

        let wl = feed.watchlists();
        assert_eq!(wl.eq, vec!["NYSEARCA:VUG"]);
    }

    #[test]
    fn test_missing_watchlists_is_empty() {
        let feed: Feed = serde_json::from_str("{}").unwrap();
        assert!(feed.watchlists().is_empty());
    }

    #[test]
    fn test_assets_carry_classes() {
        let mut wl = Watchlists::default();
        wl.eq.push("NYSEARCA:VUG".to_string());
        wl.cr.push("BINANCE:BTCUSDT".to_string());

        let assets = wl.assets();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].class, AssetClass::Equity);
        assert_eq!(assets[1].class, AssetClass::Crypto);
    }
}
