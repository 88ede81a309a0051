mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let server = common::spawn_server().await?;
    server.user_with_session("a@example.com").await?;

    let wrong = server
        .post("/login", json!({"email": "a@example.com", "password_hash": "nope"}))
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = server
        .post("/login", json!({"email": "ghost@example.com", "password_hash": "hash-1"}))
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let incomplete = server.post("/login", json!({"email": "a@example.com"})).await?;
    assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn repeated_login_returns_the_same_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let (user_id, token) = server.user_with_session("a@example.com").await?;
    assert_eq!(token.len(), 64);

    let again = server
        .post("/login", json!({"email": "a@example.com", "password_hash": "hash-1"}))
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(again["auth_token"], json!(token));
    assert_eq!(again["user_id"], json!(user_id));
    Ok(())
}

#[tokio::test]
async fn logout_invalidates_the_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let (user_id, token) = server.user_with_session("a@example.com").await?;
    let auth = json!({"auth_token": token});

    let res = server.post("/logout", auth.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(server.post("/logout", auth.clone()).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        server.get(&format!("/user/{user_id}"), Some(auth)).await?.status(),
        StatusCode::UNAUTHORIZED
    );

    // A fresh login issues a different token
    let next = server
        .post("/login", json!({"email": "a@example.com", "password_hash": "hash-1"}))
        .await?
        .json::<Value>()
        .await?;
    assert_ne!(next["auth_token"], json!(token));
    Ok(())
}

#[tokio::test]
async fn logout_with_unknown_or_missing_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let unknown = server.post("/logout", json!({"auth_token": "feedface"})).await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let missing = server.post("/logout", json!({})).await?;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn missing_token_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, _, house_id) = server.user_with_house("a@example.com").await?;

    let res = server.get(&format!("/house/{house_id}"), None).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "auth_token needed in payload");

    let patch = server
        .patch(&format!("/house/{house_id}"), json!({"name": "No token"}))
        .await?;
    assert_eq!(patch.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_ends_their_session() -> Result<()> {
    let server = common::spawn_server().await?;
    let (user_id, token) = server.user_with_session("gone@example.com").await?;

    let res = server
        .delete(&format!("/user/{user_id}"), Some(json!({"auth_token": token})))
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        server.post("/logout", json!({"auth_token": token})).await?.status(),
        StatusCode::NOT_FOUND
    );
    let login = server
        .post("/login", json!({"email": "gone@example.com", "password_hash": "hash-1"}))
        .await?;
    assert_eq!(login.status(), StatusCode::NOT_FOUND);
    Ok(())
}
