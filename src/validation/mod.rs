//! Field-set and uniqueness checks applied before any record is written.
//!
//! Nothing here mutates the store; callers hold the store write lock across
//! validation and the following write so the checks stay true.

use serde_json::Value;
use thiserror::Error;

use crate::database::{Collection, Record, Store};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} keys must be included", join(.0))]
    MissingFields(Vec<String>),

    #[error("{} keys not allowed", join(.0))]
    UnexpectedFields(Vec<String>),

    #[error("\"{field}\": {value} already in different item")]
    DuplicateValue { field: String, value: Value },
}

fn join(keys: &[String]) -> String {
    format!("{{{}}}", keys.join(", "))
}

/// Check a create payload: it must carry exactly `mandatory`, and no
/// `unique` field may repeat a value already held by any record.
pub fn validate_create(
    store: &Store,
    collection: Collection,
    candidate: &Record,
    mandatory: &[&str],
    unique: &[&str],
) -> Result<(), ValidationError> {
    let mut missing: Vec<String> = mandatory
        .iter()
        .filter(|field| !candidate.contains(field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(ValidationError::MissingFields(missing));
    }

    let mut extra: Vec<String> = candidate
        .keys()
        .filter(|key| !mandatory.contains(key))
        .map(str::to_string)
        .collect();
    if !extra.is_empty() {
        extra.sort();
        return Err(ValidationError::UnexpectedFields(extra));
    }

    check_unique(store, collection, None, candidate, unique)
}

/// Check a partial update of `target`, stored under `id`.
///
/// A submitted field is accepted if the target already holds it or it is in
/// `allowed`. Uniqueness is checked against every other record.
pub fn validate_update(
    store: &Store,
    collection: Collection,
    id: &str,
    target: &Record,
    candidate: &Record,
    allowed: &[&str],
    unique: &[&str],
) -> Result<(), ValidationError> {
    let mut extra: Vec<String> = candidate
        .keys()
        .filter(|key| !target.contains(key) && !allowed.contains(key))
        .map(str::to_string)
        .collect();
    if !extra.is_empty() {
        extra.sort();
        return Err(ValidationError::UnexpectedFields(extra));
    }

    check_unique(store, collection, Some(id), candidate, unique)
}

fn check_unique(
    store: &Store,
    collection: Collection,
    exclude: Option<&str>,
    candidate: &Record,
    unique: &[&str],
) -> Result<(), ValidationError> {
    for &field in unique {
        let Some(value) = candidate.get(field) else {
            continue;
        };

        let taken = store
            .list(collection)
            .filter(|(id, _)| Some(*id) != exclude)
            .any(|(_, record)| record.get(field) == Some(value));

        if taken {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}
