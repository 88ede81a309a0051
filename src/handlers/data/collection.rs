use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;
use tracing::info;

use crate::auth::{authenticate, authorize_create};
use crate::database::OwnerLink;
use crate::error::{ApiError, ApiResult};
use crate::ownership::{Owner, OwnerResolver};
use crate::state::AppState;
use crate::validation::validate_create;

use super::utils::{collection_from_plural, collection_from_singular, parse_payload};

/// GET /:collections - List records in a collection
///
/// Tariffs are listed for everyone. Every other collection needs an
/// `auth_token` and lists only the records owned by its user; records whose
/// owner chain is broken are left out.
pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let collection = collection_from_plural(&segment)?;
    let (_, token) = parse_payload(&body)?;
    let store = state.store.read().await;

    let records: Vec<Value> = if collection.owner_link() == OwnerLink::Global {
        store
            .list(collection)
            .map(|(id, record)| record.to_api_output(id))
            .collect()
    } else {
        let sessions = state.sessions.read().await;
        let caller = Owner::User(authenticate(&sessions, token.as_deref())?.to_string());
        store
            .list(collection)
            .filter(|(id, _)| store.owner_of(collection, id).as_ref() == Ok(&caller))
            .map(|(id, record)| record.to_api_output(id))
            .collect()
    };
    Ok(Json(Value::Array(records)))
}

/// POST /:collection - Create a record
///
/// The payload must hold exactly the collection's fields (plus `auth_token`
/// for owned collections). The new record's parent chain must already
/// belong to the token's user.
pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let collection = collection_from_singular(&segment)?;
    let (candidate, token) = parse_payload(&body)?;

    let mut store = state.store.write().await;
    validate_create(
        &store,
        collection,
        &candidate,
        collection.fields(),
        collection.unique_fields(),
    )?;

    let owner = store.owner_of_new(collection, &candidate)?;
    authorize_create(&*state.sessions.read().await, &owner, token.as_deref())?;

    let id = store.insert(collection, candidate)?;
    info!(%collection, %id, "Created record");

    let record = store
        .get(collection, &id)
        .ok_or_else(|| ApiError::internal_server_error("created record vanished"))?;
    Ok(Json(record.to_api_output(&id)))
}
