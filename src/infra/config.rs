//! Static configuration document: product catalog, island groups and
//! player defaults.
//!
//! Read once at startup from a `config.json` next to the executable (or
//! the working directory), falling back to the embedded default. The
//! `products` object is order-sensitive — its key order is the catalog
//! order and therefore the memory-offset mapping — so parsing goes
//! through `serde_json`'s order-preserving map.

use std::path::PathBuf;
use std::{env, fs};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{IslandGroups, PlayerProfile, ProductCatalog, ProductDef};
use crate::util::assets;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("product {0:?} must map to [volume, weight, raw_price]")]
    Product(String),
    #[error("island group {0:?} must map to a list of market names")]
    Group(String),
    #[error("config defines no products")]
    EmptyCatalog,
}

/// Everything the scanner needs to know before attaching to the game.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    pub catalog: ProductCatalog,
    pub groups: IslandGroups,
    pub player: PlayerProfile,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    products: serde_json::Map<String, Value>,
    island_groups: serde_json::Map<String, Value>,
    player_settings: PlayerProfile,
}

impl ScannerConfig {
    /// Loads the first config file found, else the embedded default.
    pub fn load() -> Result<Self, ConfigError> {
        for path in candidate_paths() {
            if path.is_file() {
                let display = path.display().to_string();
                println!("Loading config from {display}");
                let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: display,
                    source,
                })?;
                return Self::parse(&text);
            }
        }
        Self::parse(assets::default_config())
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;

        let mut defs = Vec::with_capacity(raw.products.len());
        for (name, value) in raw.products {
            let fields: [f64; 3] = serde_json::from_value(value.clone())
                .map_err(|_| ConfigError::Product(name.clone()))?;
            defs.push(ProductDef {
                name,
                volume: fields[0],
                weight: fields[1],
                raw_price: fields[2],
            });
        }
        if defs.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut groups = Vec::with_capacity(raw.island_groups.len());
        for (name, value) in raw.island_groups {
            let markets: Vec<String> = serde_json::from_value(value.clone())
                .map_err(|_| ConfigError::Group(name.clone()))?;
            groups.push((name, markets));
        }

        Ok(Self {
            catalog: ProductCatalog::new(defs),
            groups: IslandGroups::new(groups),
            player: raw.player_settings,
        })
    }

    /// All market names the config knows, in group order. The simulated
    /// backend uses this as its world.
    pub fn market_names(&self) -> Vec<String> {
        self.groups.markets().map(str::to_string).collect()
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(CONFIG_FILE));
        }
    }
    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}
