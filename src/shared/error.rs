//! Usage: Error taxonomy for auth negotiation, protected calls, and session storage.

pub type AuthResult<T> = Result<T, AuthError>;
pub type ApiResult<T> = Result<T, ApiError>;

/// Login failures surfaced to the UI layer.
///
/// Status-code classification happens once, inside the negotiator; callers
/// only ever see these variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A definitive endpoint rejected the credentials. The display message is
    /// deliberately generic so callers cannot leak which strategy answered.
    #[error("invalid email or password")]
    Rejected,

    /// Transport-level failure before any definitive answer. Retryable.
    #[error("authentication request failed: {0}")]
    NetworkFailure(#[source] reqwest::Error),

    /// Every strategy in the policy was exhausted without a definitive accept
    /// or reject. A backend configuration problem, not a credentials problem.
    #[error("no supported authentication endpoint on this backend")]
    NotSupported,

    /// The endpoint accepted the request but returned a payload the
    /// normalizer could not turn into a session.
    #[error("malformed authentication response: {0}")]
    InvalidResponse(String),
}

/// Protected-call failures surfaced to the UI layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend refused the session token (401/403). The store has already
    /// been cleared by the time this is returned.
    #[error("session rejected by backend")]
    Unauthorized,

    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Transport-level failure; the session is untouched.
    #[error("request failed: {0}")]
    NetworkFailure(#[source] reqwest::Error),

    /// A 2xx response whose body did not decode to the declared shape.
    #[error("malformed response body: {0}")]
    InvalidResponse(String),
}

/// Failures of the durable session record. Never propagated through the
/// auth/api taxonomy; save/clear treat these as best-effort and log instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record encode/decode failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no usable data directory: {0}")]
    DataDir(String),
}
