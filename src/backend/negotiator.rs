//! Usage: Ordered-fallback login negotiation against a backend of unknown protocol generation.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;

use crate::backend::strategy::{
    parse_auth_success, AttemptOutcome, AuthAttempt, AuthStrategy, FailureKind, LoginPolicy,
};
use crate::domain::session::{Session, SessionStore};
use crate::infra::config::ClientConfig;
use crate::shared::error::{AuthError, AuthResult};
use crate::shared::security::mask_token;

/// Negotiates login by walking a caller-supplied strategy order and writing
/// the winning session into the shared store.
///
/// Chain rule: only "endpoint not supported" falls through to the next
/// strategy. A definitive reject, a transport failure, or a malformed success
/// payload aborts the chain immediately.
#[derive(Debug, Clone)]
pub struct AuthNegotiator {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl AuthNegotiator {
    pub fn new(http: reqwest::Client, config: &ClientConfig, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            store,
        }
    }

    /// Login with the console's default intent: admin first, then the user
    /// collection once both admin generations are exhausted.
    pub async fn login(&self, identity: &str, secret: &str) -> AuthResult<Session> {
        self.login_with_policy(identity, secret, LoginPolicy::AdminThenUser)
            .await
    }

    pub async fn login_with_policy(
        &self,
        identity: &str,
        secret: &str,
        policy: LoginPolicy,
    ) -> AuthResult<Session> {
        for strategy in policy.strategies() {
            let attempt = self.attempt(*strategy, identity, secret).await;
            tracing::debug!(
                strategy = attempt.strategy.label(),
                outcome = attempt.outcome.label(),
                "auth attempt finished"
            );

            match attempt.outcome {
                AttemptOutcome::Success(session) => {
                    tracing::info!(
                        strategy = attempt.strategy.label(),
                        backend_variant = ?attempt.strategy.backend_variant(),
                        role = session.principal.role.as_str(),
                        token = %mask_token(&session.token),
                        "login negotiated"
                    );
                    self.store.save(session.clone());
                    return Ok(session);
                }
                AttemptOutcome::NotSupported => continue,
                AttemptOutcome::Rejected => return Err(AuthError::Rejected),
                AttemptOutcome::NetworkFailure(err) => {
                    tracing::warn!(
                        strategy = attempt.strategy.label(),
                        "auth attempt failed at transport level: {}",
                        err
                    );
                    return Err(AuthError::NetworkFailure(err));
                }
                AttemptOutcome::Invalid(reason) => {
                    return Err(AuthError::InvalidResponse(reason));
                }
            }
        }

        tracing::warn!(
            policy = ?policy,
            "no strategy produced a definitive answer; backend configuration mismatch"
        );
        Err(AuthError::NotSupported)
    }

    async fn attempt(&self, strategy: AuthStrategy, identity: &str, secret: &str) -> AuthAttempt {
        let url = format!("{}{}", self.base_url, strategy.path());
        let body = serde_json::json!({
            "identity": identity,
            "password": secret,
        });

        let response = match self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return AuthAttempt {
                    strategy,
                    outcome: AttemptOutcome::NetworkFailure(err),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let outcome = match strategy.classify_failure(status) {
                FailureKind::NotSupported => AttemptOutcome::NotSupported,
                FailureKind::Rejected => AttemptOutcome::Rejected,
            };
            return AuthAttempt { strategy, outcome };
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                return AuthAttempt {
                    strategy,
                    outcome: AttemptOutcome::NetworkFailure(err),
                }
            }
        };

        let outcome = match parse_auth_success(strategy, &text) {
            Ok(session) => AttemptOutcome::Success(session),
            Err(reason) => AttemptOutcome::Invalid(reason),
        };
        AuthAttempt { strategy, outcome }
    }
}
