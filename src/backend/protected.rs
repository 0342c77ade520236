//! Usage: Authenticated API calls: token attachment, failure classification, session teardown.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::session::SessionStore;
use crate::infra::config::ClientConfig;
use crate::shared::error::{ApiError, ApiResult};

const DEPLOY_INFO_PATH: &str = "/api/senvanda/deploy/info";
const DEPLOY_PROJECTS_PATH: &str = "/api/senvanda/deploy/projects";
const HEALTH_CHECK_PATH: &str = "/api/senvanda/health-check";
const ERROR_MESSAGE_SNIPPET_MAX: usize = 200;

/// Client for the console's protected endpoints.
///
/// Attaches the store's token to every call and classifies failures once, at
/// this boundary. A 401/403 clears the shared store unconditionally; the
/// credential is dead for this process and is never silently retried.
/// Navigation after teardown belongs to the caller.
#[derive(Debug, Clone)]
pub struct ProtectedApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ProtectedApiClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            store,
        }
    }

    /// POST an opaque payload to a protected endpoint and return the decoded
    /// JSON body. Sends even without a token; the server answers 401/403.
    pub async fn invoke(&self, path: &str, payload: Option<Value>) -> ApiResult<Value> {
        self.send(Method::POST, path, payload).await
    }

    /// Docker daemon summary for the dashboard.
    pub async fn deploy_info(&self) -> ApiResult<DeployInfo> {
        decode(self.send(Method::POST, DEPLOY_INFO_PATH, None).await?)
    }

    /// Managed projects with their live container status.
    pub async fn projects(&self) -> ApiResult<Vec<ProjectStatus>> {
        decode(self.send(Method::GET, DEPLOY_PROJECTS_PATH, None).await?)
    }

    /// Run a lifecycle action against one project.
    pub async fn project_action(&self, project_id: &str, action: ProjectAction) -> ApiResult<()> {
        let path = format!("/api/senvanda/deploy/{project_id}/action");
        let payload = serde_json::json!({ "action": action.as_str() });
        self.send(Method::POST, &path, Some(payload)).await?;
        Ok(())
    }

    /// Recent container logs for one project.
    pub async fn project_logs(&self, project_id: &str) -> ApiResult<String> {
        let path = format!("/api/senvanda/deploy/{project_id}/logs");
        let body = self.send(Method::GET, &path, None).await?;
        match body.get("logs").and_then(Value::as_str) {
            Some(logs) => Ok(logs.to_string()),
            None => Err(ApiError::InvalidResponse(
                "logs payload missing logs field".to_string(),
            )),
        }
    }

    /// Unauthenticated liveness probe; still classified like any other call.
    pub async fn health_check(&self) -> ApiResult<Value> {
        self.send(Method::GET, HEALTH_CHECK_PATH, None).await
    }

    async fn send(&self, method: Method, path: &str, payload: Option<Value>) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);

        // Raw token, no scheme: the backend reads `Authorization` verbatim.
        if let Some(session) = self.store.current() {
            request = request.header(AUTHORIZATION, session.token);
        }
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_string());
        }

        let response = request.send().await.map_err(ApiError::NetworkFailure)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::NetworkFailure)?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::info!(
                status = status.as_u16(),
                path,
                "session rejected by backend; clearing store"
            );
            self.store.clear();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            return Err(ApiError::ServerError {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Pull a human-readable message out of an error body: the backend's JSON
/// `message` field when present, else a trimmed body snippet, else the status
/// reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return message.chars().take(ERROR_MESSAGE_SNIPPET_MAX).collect();
        }
    }

    let snippet: String = body.trim().chars().take(ERROR_MESSAGE_SNIPPET_MAX).collect();
    if !snippet.is_empty() {
        return snippet;
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

/// Dashboard summary of the Docker daemon behind the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployInfo {
    pub containers: i64,
    pub running: i64,
    pub server_version: String,
    #[serde(default)]
    pub message: String,
}

/// One managed project with its live container status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectStatus {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub db_status: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, rename = "repoUrl")]
    pub repo_url: String,
    #[serde(default)]
    pub created: Value,
}

/// Lifecycle actions accepted by the project action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Start,
    Stop,
    Restart,
    Redeploy,
}

impl ProjectAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Redeploy => "redeploy",
        }
    }
}
