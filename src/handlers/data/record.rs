use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use tracing::info;

use crate::auth::{authorize, authorize_create};
use crate::database::{Collection, OwnerLink};
use crate::error::{ApiError, ApiResult};
use crate::ownership::OwnerResolver;
use crate::state::AppState;
use crate::validation::validate_update;

use super::utils::{collection_from_singular, parse_payload};

/// GET /:collection/:id - Get a single record by ID
pub async fn get(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let collection = collection_from_singular(&segment)?;
    let (_, token) = parse_payload(&body)?;

    let store = state.store.read().await;
    let owner = store.owner_of(collection, &id)?;
    authorize(&*state.sessions.read().await, &owner, token.as_deref())?;

    let record = store
        .get(collection, &id)
        .ok_or_else(|| ApiError::not_found(format!("record {id} not found in {collection}")))?;
    Ok(Json(record.to_api_output(&id)))
}

/// PATCH /:collection/:id - Partially update a record by ID
///
/// Only the submitted fields change. Any declared field of the collection may
/// be sent; `id` and unknown fields may not. Changing the parent key moves
/// the record, and the new parent must exist and belong to the caller.
pub async fn patch(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let collection = collection_from_singular(&segment)?;
    let (changes, token) = parse_payload(&body)?;

    let mut store = state.store.write().await;
    let owner = store.owner_of(collection, &id)?;
    {
        let sessions = state.sessions.read().await;
        authorize(&sessions, &owner, token.as_deref())?;

        let target = store
            .get(collection, &id)
            .ok_or_else(|| ApiError::not_found(format!("record {id} not found in {collection}")))?;
        validate_update(
            &store,
            collection,
            &id,
            target,
            &changes,
            collection.fields(),
            collection.unique_fields(),
        )?;

        if let OwnerLink::Parent { foreign_key, .. } = collection.owner_link() {
            if changes.contains(foreign_key) {
                let mut moved = target.clone();
                moved.apply_changes(changes.clone());
                let new_owner = store.owner_of_new(collection, &moved)?;
                authorize_create(&sessions, &new_owner, token.as_deref())?;
            }
        }
    }

    let record = store.update(collection, &id, changes)?;
    info!(%collection, %id, "Updated record");
    Ok(Json(record.to_api_output(&id)))
}

/// DELETE /:collection/:id - Delete a record by ID
///
/// Dependent records are not removed. Deleting a user also ends its session.
pub async fn delete(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let collection = collection_from_singular(&segment)?;
    let (_, token) = parse_payload(&body)?;

    let mut store = state.store.write().await;
    let owner = store.owner_of(collection, &id)?;
    let mut sessions = state.sessions.write().await;
    authorize(&sessions, &owner, token.as_deref())?;

    store.remove(collection, &id)?;
    if collection == Collection::Users {
        sessions.end_session_for(&id);
    }
    info!(%collection, %id, "Deleted record");
    Ok(StatusCode::NO_CONTENT)
}
