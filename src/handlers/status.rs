use axum::{extract::State, response::Json};
use serde_json::{json, Map, Value};

use crate::database::Collection;
use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let collections: Vec<Value> = Collection::ALL
        .into_iter()
        .map(|c| {
            json!({
                "list": format!("/{}", c.name()),
                "record": format!("/{}/:id", c.singular()),
                "create": format!("/{}", c.singular()),
            })
        })
        .collect();

    Json(json!({
        "name": "Home Energy API",
        "version": env!("CARGO_PKG_VERSION"),
        "collections": collections,
        "auth": { "login": "/login", "logout": "/logout" },
    }))
}

/// GET /health - Liveness plus record counts
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let counts: Map<String, Value> = Collection::ALL
        .into_iter()
        .map(|c| (c.name().to_string(), json!(store.count(c))))
        .collect();
    let sessions = state.sessions.read().await.len();

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "records": counts,
        "sessions": sessions,
    }))
}
