//! Resolves which user owns a record by following its foreign keys.
//!
//! The path for each collection comes from [`Collection::owner_link`]; the
//! walk joins one collection at a time until it lands on `users`.

use thiserror::Error;

use crate::database::{Collection, OwnerLink, Record, Store};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Owned by the user with this id.
    User(String),
    /// Access checks do not apply (tariffs, and users not yet created).
    Nobody,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnershipError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error("{collection}.{foreign_key} does not reference an existing {parent} record")]
    BrokenReference {
        collection: Collection,
        foreign_key: &'static str,
        parent: Collection,
    },
}

pub trait OwnerResolver {
    /// Owner of the stored record `id`.
    fn owner_of(&self, collection: Collection, id: &str) -> Result<Owner, OwnershipError>;

    /// Owner `record` would have once stored in `collection`.
    fn owner_of_new(&self, collection: Collection, record: &Record) -> Result<Owner, OwnershipError>;
}

impl OwnerResolver for Store {
    fn owner_of(&self, collection: Collection, id: &str) -> Result<Owner, OwnershipError> {
        let record = self.get(collection, id).ok_or_else(|| OwnershipError::NotFound {
            collection,
            id: id.to_string(),
        })?;
        walk(self, collection, Some(id), record)
    }

    fn owner_of_new(&self, collection: Collection, record: &Record) -> Result<Owner, OwnershipError> {
        walk(self, collection, None, record)
    }
}

fn walk<'a>(
    store: &'a Store,
    mut collection: Collection,
    id: Option<&str>,
    mut record: &'a Record,
) -> Result<Owner, OwnershipError> {
    loop {
        let (foreign_key, parent) = match collection.owner_link() {
            OwnerLink::Global => return Ok(Owner::Nobody),
            OwnerLink::Root => {
                return Ok(id.map_or(Owner::Nobody, |id| Owner::User(id.to_string())));
            }
            OwnerLink::Parent { foreign_key, parent } => (foreign_key, parent),
        };

        let broken = move || OwnershipError::BrokenReference {
            collection,
            foreign_key,
            parent,
        };

        let key = record.get_key(foreign_key).ok_or_else(broken)?;
        let parent_record = store.get(parent, &key).ok_or_else(broken)?;

        if parent == Collection::Users {
            return Ok(Owner::User(key));
        }

        collection = parent;
        record = parent_record;
    }
}
