use crate::types::{ItemCatalog, ItemId, Result, TrackerError};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Item names loaded from a JSON object keyed by item id,
/// e.g. `{"5070": "Bird nest"}`.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: HashMap<ItemId, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut names = HashMap::with_capacity(raw.len());

        for (key, name) in raw {
            let item_id = key
                .trim()
                .parse::<ItemId>()
                .map_err(|_| TrackerError::General(format!("Invalid item id key '{}' in name table", key)))?;
            names.insert(item_id, name);
        }

        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let table = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded {} item names from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, item_id: ItemId, name: impl Into<String>) {
        self.names.insert(item_id, name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ItemCatalog for NameTable {
    fn item_name(&self, item_id: ItemId) -> Option<String> {
        self.names.get(&item_id).cloned()
    }
}
