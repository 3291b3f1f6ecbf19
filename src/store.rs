//! Document sources: one JSON directory per collection, or an in-memory map.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::error::Result;

pub const MATCHES_COLLECTION: &str = "scrim_matches";
pub const DRAFTS_COLLECTION: &str = "drafts";

/// A source of raw documents. Everything is fetched; filtering happens in memory.
pub trait DocumentStore {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Each collection is a directory under `root`; every `.json` file in it holds
/// either one document or an array of documents.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }
}

impl DocumentStore for JsonDirStore {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Value>> {
        let dir = self.collection_dir(collection);
        let mut files = collect_json_files(&dir)?;
        files.sort();

        let mut documents = Vec::new();
        for path in files {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents)? {
                Value::Array(items) => documents.extend(items),
                Value::Null => continue,
                other => documents.push(other),
            }
        }

        debug!(
            "Fetched {} documents from {}",
            documents.len(),
            dir.display()
        );
        Ok(documents)
    }
}

/// Documents already materialized in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_many(&mut self, collection: &str, documents: Vec<Value>) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}

/// A missing root is an empty collection; any other I/O failure is returned.
fn collect_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("Collection directory {} does not exist", root.display());
            return Ok(files);
        }
        Err(err) => return Err(err.into()),
    };
    let mut stack = vec![entries];

    while let Some(entries) = stack.pop() {
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(fs::read_dir(&path)?);
            } else if path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                files.push(path);
            }
        }
    }

    Ok(files)
}
