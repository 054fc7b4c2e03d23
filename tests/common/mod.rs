#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use schedule_admin_api::auth::{ExternalClaim, IdentityVerifier, VerificationError};
use schedule_admin_api::config::AppConfig;
use schedule_admin_api::database::{bootstrap, DatabaseManager};
use schedule_admin_api::services::MediaProbe;
use schedule_admin_api::{app, AppState};

pub const GOOGLE_CLIENT_ID: &str = "client-123.apps.googleusercontent.com";
pub const GOOGLE_TOKEN: &str = "valid-google-token";

/// Accepts exactly one token for one audience
pub struct StubVerifier;

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, token: &str, audience: &str) -> Result<ExternalClaim, VerificationError> {
        if audience.trim().is_empty() {
            return Err(VerificationError::Unconfigured);
        }
        if token != GOOGLE_TOKEN || audience != GOOGLE_CLIENT_ID {
            return Err(VerificationError::Invalid("stub rejected token".to_string()));
        }
        Ok(ExternalClaim {
            subject: "google-sub-1".to_string(),
            email: "teacher@example.com".to_string(),
            name: Some("Teacher".to_string()),
        })
    }
}

/// The full router over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let config = AppConfig::in_memory();
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;
        bootstrap::ensure_defaults(&pool, &config.security).await?;

        let media = MediaProbe::from_config(&config.integrations)?;
        let state = AppState::new(config, pool, Arc::new(StubVerifier), media);

        Ok(Self {
            router: app(state.clone()),
            state,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("x-access-token", token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", path))?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Log in as the bootstrap admin and return the session token
    pub async fn admin_token(&self) -> Result<String> {
        let (status, body) = self
            .post("/api/auth/login", None, json!({ "username": "admin", "password": "password" }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {} {}", status, body);
        body["apiToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no apiToken")
    }

    /// Create a `User`-role account and return a session token for it
    pub async fn user_token(&self, email: &str) -> Result<String> {
        let admin = self.admin_token().await?;
        let (status, body) = self
            .post("/api/users", Some(&admin), json!({ "email": email, "name": "Regular" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "user create failed: {} {}", status, body);
        let id = body["id"].as_i64().context("created user has no id")?;
        Ok(self.state.sessions.issue(id)?)
    }
}
