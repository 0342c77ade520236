//! Usage: Login strategies: endpoint selection, status classification, payload normalization.
//!
//! Each strategy is one named attempt against a specific protocol generation
//! of the backend. The generation is inferred per attempt from the response
//! status and never cached across logins, because a backend upgrade or
//! downgrade between logins would make a cached answer stale.

use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::principal::{Principal, Role};
use crate::domain::session::Session;

/// One named login attempt against a specific endpoint generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Current-generation admin endpoint.
    ModernAdmin,
    /// Older admin endpoint kept for servers that predate the modern route.
    LegacyAdmin,
    /// General-purpose user-record endpoint.
    UserCollection,
}

/// Protocol generation of the remote server, inferred from whichever strategy
/// produced a definitive answer. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackendVariant {
    Current,
    Legacy,
}

impl AuthStrategy {
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::ModernAdmin => "/api/collections/_superusers/auth-with-password",
            Self::LegacyAdmin => "/api/admins/auth-with-password",
            Self::UserCollection => "/api/collections/users/auth-with-password",
        }
    }

    pub(crate) const fn role(self) -> Role {
        match self {
            Self::ModernAdmin | Self::LegacyAdmin => Role::Admin,
            Self::UserCollection => Role::User,
        }
    }

    pub(crate) const fn backend_variant(self) -> AuthBackendVariant {
        match self {
            Self::ModernAdmin | Self::UserCollection => AuthBackendVariant::Current,
            Self::LegacyAdmin => AuthBackendVariant::Legacy,
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::ModernAdmin => "modern_admin",
            Self::LegacyAdmin => "legacy_admin",
            Self::UserCollection => "user_collection",
        }
    }

    /// Classify a non-2xx status for this strategy.
    ///
    /// 404 on an admin endpoint is a protocol-generation signal (the route does
    /// not exist on that server build), not a credentials answer, so the chain
    /// may continue. Everything else is a definitive reject. The user-record
    /// endpoint exists on every generation; any failure there is definitive.
    pub(crate) fn classify_failure(self, status: StatusCode) -> FailureKind {
        match self {
            Self::ModernAdmin | Self::LegacyAdmin if status == StatusCode::NOT_FOUND => {
                FailureKind::NotSupported
            }
            _ => FailureKind::Rejected,
        }
    }
}

/// Which strategies a login call attempts, in declared order. Supplied by the
/// caller so UI intent stays out of the negotiation chain itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPolicy {
    /// Admin endpoints only; admin failure is terminal.
    AdminOnly,
    /// Admin endpoints first, the user collection once both are exhausted.
    AdminThenUser,
    /// User collection only.
    UserOnly,
}

impl LoginPolicy {
    pub(crate) const fn strategies(self) -> &'static [AuthStrategy] {
        match self {
            Self::AdminOnly => &[AuthStrategy::ModernAdmin, AuthStrategy::LegacyAdmin],
            Self::AdminThenUser => &[
                AuthStrategy::ModernAdmin,
                AuthStrategy::LegacyAdmin,
                AuthStrategy::UserCollection,
            ],
            Self::UserOnly => &[AuthStrategy::UserCollection],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    NotSupported,
    Rejected,
}

/// Classified result of one negotiation attempt.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    Success(Session),
    NotSupported,
    Rejected,
    NetworkFailure(reqwest::Error),
    /// 2xx response whose payload could not be normalized into a session.
    Invalid(String),
}

impl AttemptOutcome {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NotSupported => "not_supported",
            Self::Rejected => "rejected",
            Self::NetworkFailure(_) => "network_failure",
            Self::Invalid(_) => "invalid_response",
        }
    }
}

/// Transient record of one negotiation try; logged, never cached.
#[derive(Debug)]
pub(crate) struct AuthAttempt {
    pub(crate) strategy: AuthStrategy,
    pub(crate) outcome: AttemptOutcome,
}

/// Normalize a successful auth payload into the common session shape.
///
/// The principal object arrives under `admin` on legacy servers and `record`
/// on current ones, and some builds ship both spellings; the field layout
/// inside also varies, so only `id` and `email` are required. Token and
/// principal are both mandatory; anything less is a malformed response, not a
/// session.
pub(crate) fn parse_auth_success(strategy: AuthStrategy, body: &str) -> Result<Session, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("auth payload is not json: {e}"))?;

    let token = value
        .get("token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "auth payload missing token".to_string())?;

    let principal_obj = value
        .get("admin")
        .or_else(|| value.get("record"))
        .and_then(Value::as_object)
        .ok_or_else(|| "auth payload missing admin/record object".to_string())?;

    let id = principal_obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "auth payload missing principal id".to_string())?;

    let email = principal_obj
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "auth payload missing principal email".to_string())?;

    Ok(Session::new(
        token,
        Principal {
            id: id.to_string(),
            email: email.to_string(),
            role: strategy.role(),
        },
    ))
}
