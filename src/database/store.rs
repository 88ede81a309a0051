use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info};

use super::collection::{Collection, UnknownCollection};
use super::record::Record;

/// Ids are decimal strings drawn from this range.
const MAX_ID: u32 = 99_999_999;

/// Errors from the Store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error(transparent)]
    UnknownCollection(#[from] UnknownCollection),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed document {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

type Table = BTreeMap<String, Record>;

/// All nine collections held in memory and mirrored to one flat JSON document.
///
/// Every successful mutation is written through before returning. If the
/// write fails the in-memory change is rolled back, so memory never holds
/// state the file does not.
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    pretty: bool,
    collections: BTreeMap<Collection, Table>,
}

impl Store {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            pretty: false,
            collections: Collection::ALL.into_iter().map(|c| (c, Table::new())).collect(),
        }
    }

    /// Load the document at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, pretty: bool) -> Result<Self, StoreError> {
        let path = path.into();
        let mut store = Self {
            path: Some(path.clone()),
            pretty,
            ..Self::in_memory()
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No data file yet, starting with an empty store");
                return Ok(store);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let document: BTreeMap<String, Table> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?;

        for (name, table) in document {
            let collection: Collection = name.parse()?;
            store.collections.insert(collection, table);
        }

        info!(
            path = %path.display(),
            records = store.collections.values().map(BTreeMap::len).sum::<usize>(),
            "Loaded data file"
        );
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn table(&self, collection: Collection) -> &Table {
        // Every collection is inserted at construction and never removed.
        &self.collections[&collection]
    }

    fn table_mut(&mut self, collection: Collection) -> &mut Table {
        self.collections.entry(collection).or_default()
    }

    pub fn get(&self, collection: Collection, id: &str) -> Option<&Record> {
        self.table(collection).get(id)
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.table(collection).contains_key(id)
    }

    /// Records in id order.
    pub fn list(&self, collection: Collection) -> impl Iterator<Item = (&str, &Record)> {
        self.table(collection).iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.table(collection).len()
    }

    /// Draw a random id not currently used in `collection`.
    pub fn next_id(&self, collection: Collection) -> String {
        let mut rng = rand::rng();
        loop {
            let id = rng.random_range(1..=MAX_ID).to_string();
            if !self.contains(collection, &id) {
                return id;
            }
        }
    }

    /// Assign an id to `record`, store it and persist. Returns the new id.
    pub fn insert(&mut self, collection: Collection, record: Record) -> Result<String, StoreError> {
        let id = self.next_id(collection);
        self.table_mut(collection).insert(id.clone(), record);

        if let Err(e) = self.persist() {
            self.table_mut(collection).remove(&id);
            return Err(e);
        }

        debug!(%collection, %id, "Inserted record");
        Ok(id)
    }

    /// Overwrite the submitted fields of an existing record and persist.
    pub fn update(
        &mut self,
        collection: Collection,
        id: &str,
        changes: Record,
    ) -> Result<&Record, StoreError> {
        let previous = self
            .get(collection, id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if let Some(record) = self.table_mut(collection).get_mut(id) {
            record.apply_changes(changes);
        }

        if let Err(e) = self.persist() {
            self.table_mut(collection).insert(id.to_string(), previous);
            return Err(e);
        }

        debug!(%collection, %id, "Updated record");
        Ok(&self.table(collection)[id])
    }

    /// Remove a record and persist. Dependents are left in place.
    pub fn remove(&mut self, collection: Collection, id: &str) -> Result<Record, StoreError> {
        let removed = self
            .table_mut(collection)
            .remove(id)
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if let Err(e) = self.persist() {
            self.table_mut(collection).insert(id.to_string(), removed);
            return Err(e);
        }

        debug!(%collection, %id, "Removed record");
        Ok(removed)
    }

    /// Write the whole document atomically (temp file, then rename).
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let document: BTreeMap<&str, &Table> = self
            .collections
            .iter()
            .map(|(collection, table)| (collection.name(), table))
            .collect();

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|source| {
                error!(path = %path.display(), error = %source, "Failed to persist data file");
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            })
    }
}
