//! Shared test harness: a scripted mock backend plus client/config helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use senvanda_client::ClientConfig;

static TRACING: OnceLock<()> = OnceLock::new();

fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// One request observed by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Scripted behavior for one auth endpoint.
#[derive(Debug, Clone)]
pub enum AuthScript {
    /// The route does not exist on this server generation.
    NotFound,
    /// Definitive reject with the given status for any credentials.
    Reject(u16),
    /// Accept exactly one credential pair; everything else gets a 400.
    Accept {
        identity: String,
        password: String,
        token: String,
        principal_key: String,
        id: String,
        email: String,
    },
}

impl AuthScript {
    pub fn accept(
        identity: &str,
        password: &str,
        token: &str,
        principal_key: &str,
        id: &str,
        email: &str,
    ) -> Self {
        Self::Accept {
            identity: identity.to_string(),
            password: password.to_string(),
            token: token.to_string(),
            principal_key: principal_key.to_string(),
            id: id.to_string(),
            email: email.to_string(),
        }
    }
}

/// Fixed status + body for a dashboard endpoint.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: Value,
}

impl ScriptedResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

pub struct BackendState {
    pub modern_admin: Mutex<AuthScript>,
    pub legacy_admin: Mutex<AuthScript>,
    pub user_collection: Mutex<AuthScript>,
    pub deploy_info: Mutex<ScriptedResponse>,
    pub projects: Mutex<ScriptedResponse>,
    pub project_action: Mutex<ScriptedResponse>,
    pub project_logs: Mutex<ScriptedResponse>,
    pub health: Mutex<ScriptedResponse>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            modern_admin: Mutex::new(AuthScript::NotFound),
            legacy_admin: Mutex::new(AuthScript::NotFound),
            user_collection: Mutex::new(AuthScript::NotFound),
            deploy_info: Mutex::new(ScriptedResponse::ok(json!({}))),
            projects: Mutex::new(ScriptedResponse::ok(json!([]))),
            project_action: Mutex::new(ScriptedResponse::ok(json!({"status": "ok"}))),
            project_logs: Mutex::new(ScriptedResponse::ok(json!({"logs": ""}))),
            health: Mutex::new(ScriptedResponse::ok(json!({"status": "alive"}))),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl BackendState {
    fn record(&self, path: &str, headers: &HeaderMap, body: &Bytes) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = serde_json::from_slice(body).unwrap_or(Value::Null);
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            authorization,
            body,
        });
    }

    fn auth_response(&self, script: &AuthScript, body: &Value) -> Response {
        match script {
            AuthScript::NotFound => {
                respond(404, json!({"code": 404, "message": "Not Found."}))
            }
            AuthScript::Reject(status) => respond(
                *status,
                json!({"code": status, "message": "Failed to authenticate."}),
            ),
            AuthScript::Accept {
                identity,
                password,
                token,
                principal_key,
                id,
                email,
            } => {
                let sent_identity = body.get("identity").and_then(Value::as_str);
                let sent_password = body.get("password").and_then(Value::as_str);
                if sent_identity == Some(identity.as_str())
                    && sent_password == Some(password.as_str())
                {
                    let mut payload = serde_json::Map::new();
                    payload.insert("token".to_string(), json!(token));
                    payload.insert(
                        principal_key.clone(),
                        json!({"id": id, "email": email}),
                    );
                    respond(200, Value::Object(payload))
                } else {
                    respond(400, json!({"code": 400, "message": "Failed to authenticate."}))
                }
            }
        }
    }
}

fn respond(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).expect("valid scripted status");
    (status, Json(body)).into_response()
}

async fn modern_auth(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = "/api/collections/_superusers/auth-with-password";
    state.record(path, &headers, &body);
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let script = state.modern_admin.lock().unwrap().clone();
    state.auth_response(&script, &parsed)
}

async fn legacy_auth(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = "/api/admins/auth-with-password";
    state.record(path, &headers, &body);
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let script = state.legacy_admin.lock().unwrap().clone();
    state.auth_response(&script, &parsed)
}

async fn user_auth(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = "/api/collections/users/auth-with-password";
    state.record(path, &headers, &body);
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let script = state.user_collection.lock().unwrap().clone();
    state.auth_response(&script, &parsed)
}

async fn deploy_info(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("/api/senvanda/deploy/info", &headers, &body);
    let scripted = state.deploy_info.lock().unwrap().clone();
    respond(scripted.status, scripted.body)
}

async fn projects(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("/api/senvanda/deploy/projects", &headers, &Bytes::new());
    let scripted = state.projects.lock().unwrap().clone();
    respond(scripted.status, scripted.body)
}

async fn project_action(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&format!("/api/senvanda/deploy/{id}/action"), &headers, &body);
    let scripted = state.project_action.lock().unwrap().clone();
    respond(scripted.status, scripted.body)
}

async fn project_logs(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&format!("/api/senvanda/deploy/{id}/logs"), &headers, &Bytes::new());
    let scripted = state.project_logs.lock().unwrap().clone();
    respond(scripted.status, scripted.body)
}

async fn health(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("/api/senvanda/health-check", &headers, &Bytes::new());
    let scripted = state.health.lock().unwrap().clone();
    respond(scripted.status, scripted.body)
}

/// Scripted backend bound to an ephemeral localhost port.
pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
    task: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        init_tracing();

        let state = Arc::new(BackendState::default());
        let router = Router::new()
            .route(
                "/api/collections/_superusers/auth-with-password",
                post(modern_auth),
            )
            .route("/api/admins/auth-with-password", post(legacy_auth))
            .route(
                "/api/collections/users/auth-with-password",
                post(user_auth),
            )
            .route("/api/senvanda/deploy/info", post(deploy_info))
            .route("/api/senvanda/deploy/projects", get(projects))
            .route("/api/senvanda/deploy/:id/action", post(project_action))
            .route("/api/senvanda/deploy/:id/logs", get(project_logs))
            .route("/api/senvanda/health-check", get(health))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        let task = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock backend");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    pub fn config(&self) -> ClientConfig {
        test_config(&self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn set_modern(&self, script: AuthScript) {
        *self.state.modern_admin.lock().unwrap() = script;
    }

    pub fn set_legacy(&self, script: AuthScript) {
        *self.state.legacy_admin.lock().unwrap() = script;
    }

    pub fn set_user(&self, script: AuthScript) {
        *self.state.user_collection.lock().unwrap() = script;
    }

    pub fn set_deploy_info(&self, scripted: ScriptedResponse) {
        *self.state.deploy_info.lock().unwrap() = scripted;
    }

    pub fn set_projects(&self, scripted: ScriptedResponse) {
        *self.state.projects.lock().unwrap() = scripted;
    }

    pub fn set_project_logs(&self, scripted: ScriptedResponse) {
        *self.state.project_logs.lock().unwrap() = scripted;
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig {
        base_url: base_url.to_string(),
        request_timeout_seconds: 5,
        data_dir: None,
    };
    config.sanitize();
    config
}

pub fn http_client(config: &ClientConfig) -> reqwest::Client {
    config.http_client().expect("build http client")
}

/// A base URL that refuses connections: the port was bound once and released.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}")
}
