use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Failure taxonomy for the session persistence backend. Callers use the
/// variant to decide what to tell the learner (re-authenticate, check the
/// connection, pick another activity); none of these abort a running drill.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend unreachable: {0}")]
    Network(String),
    #[error("authentication expired or missing")]
    Auth,
    #[error("unknown activity or user")]
    NotFound,
    #[error("unexpected backend response: {0}")]
    Protocol(String),
}

/// Persistence collaborator for practice sessions. Abstracted as a trait so
/// the lifecycle manager can be exercised against a fake store in tests and
/// swapped onto other transports without touching the state machine.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, activity_id: &str) -> Result<String, StoreError>;
    async fn complete_session(&self, session_id: &str, score: f64) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    async fn create_session(&self, activity_id: &str) -> Result<String, StoreError> {
        (**self).create_session(activity_id).await
    }

    async fn complete_session(&self, session_id: &str, score: f64) -> Result<(), StoreError> {
        (**self).complete_session(session_id, score).await
    }
}

/// The create endpoint has historically answered with either key, and the id
/// itself shows up as a string or a bare number depending on backend version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    #[serde(default)]
    game_session_id: Option<serde_json::Value>,
    #[serde(default)]
    session_id: Option<serde_json::Value>,
}

impl CreateSessionResponse {
    fn into_session_id(self) -> Option<String> {
        let value = self.game_session_id.or(self.session_id)?;
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// REST-backed session store. Credentials are passed in explicitly rather
/// than read from ambient state, so one store instance serves exactly one
/// authenticated user.
#[derive(Debug, Clone)]
pub struct HttpSessionStore {
    client: Client,
    base_url: String,
    user_id: String,
    bearer_token: Option<String>,
}

impl HttpSessionStore {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn classify_status(status: StatusCode) -> Option<StoreError> {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(StoreError::Auth),
            StatusCode::NOT_FOUND => Some(StoreError::NotFound),
            s if s.is_success() => None,
            s => Some(StoreError::Protocol(format!("http status {s}"))),
        }
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::Network(err.to_string())
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create_session(&self, activity_id: &str) -> Result<String, StoreError> {
        let url = format!(
            "{}/games/users/{}/start/{}",
            self.base_url, self.user_id, activity_id
        );
        debug!(%url, "creating practice session");

        let response = self
            .authorize(self.client.post(&url))
            .send()
            .await
            .map_err(transport_error)?;

        if let Some(err) = Self::classify_status(response.status()) {
            return Err(err);
        }

        let body: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;

        body.into_session_id()
            .ok_or_else(|| StoreError::Protocol("response carries no session id".into()))
    }

    async fn complete_session(&self, session_id: &str, score: f64) -> Result<(), StoreError> {
        let url = format!("{}/games/sessions/{}/complete", self.base_url, session_id);
        debug!(%url, score, "completing practice session");

        let response = self
            .authorize(self.client.post(&url))
            .query(&[("score", score)])
            .send()
            .await
            .map_err(transport_error)?;

        match Self::classify_status(response.status()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
