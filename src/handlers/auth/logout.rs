use axum::{body::Bytes, extract::State, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AccessError;
use crate::error::ApiResult;
use crate::handlers::data::utils::parse_payload;
use crate::state::AppState;

/// POST /logout - End the session named by `auth_token`
pub async fn logout(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let (_, token) = parse_payload(&body)?;
    let token = token.ok_or(AccessError::MissingToken)?;

    let user_id = state.sessions.write().await.logout(&token)?;
    info!(%user_id, "User logged out");

    Ok(Json(json!({ "message": "logged out" })))
}
