//! Card store backends.
//!
//! The whole card map is persisted as one JSON blob. Stores are not
//! transactional; the last writer wins.

use crate::error::StoreError;
use crate::types::CardMap;
use std::fs;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence boundary for card scheduling state.
pub trait CardStore {
    /// Load the full card map.
    fn load(&self) -> Result<CardMap>;

    /// Replace the persisted card map.
    fn save(&mut self, cards: &CardMap) -> Result<()>;
}

/// In-memory store holding the serialized blob, like a single
/// key-value storage slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCardStore {
    blob: Option<String>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw JSON blob, if anything has been saved.
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl CardStore for MemoryCardStore {
    fn load(&self) -> Result<CardMap> {
        match &self.blob {
            Some(blob) => Ok(serde_json::from_str(blob)?),
            None => Ok(CardMap::new()),
        }
    }

    fn save(&mut self, cards: &CardMap) -> Result<()> {
        self.blob = Some(serde_json::to_string(cards)?);
        Ok(())
    }
}

/// Store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCardStore {
    path: PathBuf,
}

impl JsonFileCardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CardStore for JsonFileCardStore {
    fn load(&self) -> Result<CardMap> {
        if !self.path.exists() {
            return Ok(CardMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, cards: &CardMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(cards)?)?;
        Ok(())
    }
}
