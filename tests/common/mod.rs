#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use home_energy_api::auth::SessionRegistry;
use home_energy_api::database::Store;
use home_energy_api::AppState;

/// A live server on an ephemeral port, backed by its own data file.
///
/// The data directory is removed when the server handle is dropped.
pub struct TestServer {
    pub base_url: String,
    pub data_file: PathBuf,
    pub client: Client,
    _data_dir: TempDir,
}

pub async fn spawn_server() -> Result<TestServer> {
    let data_dir = tempfile::tempdir().context("failed to create test data dir")?;
    let data_file = data_dir.path().join("database.json");
    let store = Store::open(&data_file, false).context("failed to open test store")?;
    let state = AppState::new(store, SessionRegistry::default());

    // Port 0 keeps parallel tests isolated
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, home_energy_api::app(state)).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        data_file,
        client: Client::new(),
        _data_dir: data_dir,
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, body: Option<Value>) -> Result<Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?)
    }

    /// Read the persisted document straight from disk.
    pub fn data(&self) -> Result<Value> {
        Ok(serde_json::from_str(&std::fs::read_to_string(&self.data_file)?)?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(&body).send().await?)
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).json(&body).send().await?)
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> Result<Response> {
        let mut req = self.client.delete(self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?)
    }

    /// POST and expect 200, returning the created record.
    pub async fn create(&self, singular: &str, body: Value) -> Result<Value> {
        let res = self.post(&format!("/{singular}"), body).await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        anyhow::ensure!(status == StatusCode::OK, "create {singular} failed with {status}: {body}");
        Ok(body)
    }

    /// Register a user and log them in. Returns (user id, token).
    pub async fn user_with_session(&self, email: &str) -> Result<(String, String)> {
        let user = self
            .create(
                "user",
                json!({"email": email, "password_hash": "hash-1", "name": "Test User"}),
            )
            .await?;
        let id = user["id"].as_str().context("user id missing")?.to_string();

        let res = self
            .post("/login", json!({"email": email, "password_hash": "hash-1"}))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body = res.json::<Value>().await?;
        let token = body["auth_token"].as_str().context("token missing")?.to_string();
        Ok((id, token))
    }

    /// A user with a house. Returns (user id, token, house id).
    pub async fn user_with_house(&self, email: &str) -> Result<(String, String, String)> {
        let (user_id, token) = self.user_with_session(email).await?;
        let house = self
            .create(
                "house",
                json!({"user_id": user_id, "address": "Main St", "name": "Home", "auth_token": token}),
            )
            .await?;
        let house_id = house["id"].as_str().context("house id missing")?.to_string();
        Ok((user_id, token, house_id))
    }
}

pub fn id_of(record: &Value) -> String {
    record["id"].as_str().unwrap_or_default().to_string()
}
