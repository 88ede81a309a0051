use axum::{body::Bytes, extract::State, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::data::utils::parse_payload;
use crate::state::AppState;
use crate::validation::ValidationError;

/// POST /login - Exchange email and password hash for a session token
///
/// Input: `{"email": ..., "password_hash": ...}`.
/// Output: `{"auth_token": "<64 hex chars>", "user_id": "<id>"}`.
/// A user who is already logged in receives the token they already hold.
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let (credentials, _) = parse_payload(&body)?;

    let missing: Vec<String> = ["email", "password_hash"]
        .into_iter()
        .filter(|field| !credentials.contains(field))
        .map(str::to_string)
        .collect();
    let (Some(email), Some(password_hash)) = (credentials.get("email"), credentials.get("password_hash")) else {
        return Err(ValidationError::MissingFields(missing).into());
    };

    let store = state.store.read().await;
    let session = state.sessions.write().await.login(&store, email, password_hash)?;
    info!(user_id = %session.user_id, "User logged in");

    Ok(Json(json!({
        "auth_token": session.token,
        "user_id": session.user_id,
    })))
}
