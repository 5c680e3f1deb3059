//! Static registry of the maps a render can target.
//!
//! The catalog is parsed once at startup and shared read-only behind an
//! `Arc` for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::geometry::CANVAS_SIZE;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// The canvas edge capture bars start from.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MapOrientation {
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl MapOrientation {
    pub const ALL: [MapOrientation; 4] = [
        MapOrientation::TopToBottom,
        MapOrientation::BottomToTop,
        MapOrientation::LeftToRight,
        MapOrientation::RightToLeft,
    ];

    /// Whether capture bars grow along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, MapOrientation::TopToBottom | MapOrientation::BottomToTop)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MapEntry {
    pub id: String,
    pub orientation: MapOrientation,
    pub strongpoints: BTreeMap<String, Offset>,
}

impl MapEntry {
    pub fn strongpoint(&self, name: &str) -> Option<Offset> {
        self.strongpoints.get(name).copied()
    }

    pub fn strongpoint_names(&self) -> Vec<&str> {
        self.strongpoints.keys().map(String::as_str).collect()
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    maps: Vec<MapEntry>,
}

#[derive(Debug)]
pub struct MapCatalog {
    maps: Vec<Arc<MapEntry>>,
}

impl MapCatalog {
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read catalog {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for map in &file.maps {
            if !seen.insert(map.id.as_str()) {
                return Err(anyhow::anyhow!("duplicate map id in catalog: {}", map.id));
            }
            for (name, offset) in &map.strongpoints {
                if offset.x >= CANVAS_SIZE || offset.y >= CANVAS_SIZE {
                    return Err(anyhow::anyhow!(
                        "strongpoint {} on {} lies outside the {}px canvas: ({}, {})",
                        name, map.id, CANVAS_SIZE, offset.x, offset.y
                    ));
                }
            }
        }

        Ok(Self {
            maps: file.maps.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<MapEntry>> {
        self.maps.iter().find(|m| m.id == id).cloned()
    }

    pub fn list_maps(&self) -> Vec<&str> {
        self.maps.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn list_strongpoints(&self, id: &str) -> Option<&BTreeMap<String, Offset>> {
        self.maps.iter().find(|m| m.id == id).map(|m| &m.strongpoints)
    }

    /// Map id to its strongpoint names, in catalog order.
    pub fn strongpoint_index(&self) -> Vec<(&str, Vec<&str>)> {
        self.maps
            .iter()
            .map(|m| (m.id.as_str(), m.strongpoint_names()))
            .collect()
    }
}
