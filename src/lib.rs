//! Client core for the Senvanda cloud console: negotiates login against a
//! backend of unknown protocol generation, owns the persisted session, and
//! gates protected endpoint calls.
//!
//! The UI and route-guard layers consume this crate through [`SessionStore`],
//! [`AuthNegotiator`], and [`ProtectedApiClient`]; they never see raw HTTP
//! status codes, only the [`AuthError`]/[`ApiError`] taxonomy.

mod backend;
mod domain;
mod infra;
mod shared;

pub use backend::negotiator::AuthNegotiator;
pub use backend::protected::{DeployInfo, ProjectAction, ProjectStatus, ProtectedApiClient};
pub use backend::strategy::{AuthBackendVariant, AuthStrategy, LoginPolicy};
pub use domain::principal::{Principal, Role};
pub use domain::session::{Session, SessionStore};
pub use infra::config::{ClientConfig, DEFAULT_BASE_URL};
pub use infra::session_file::{SessionFile, STORAGE_KEY};
pub use shared::error::{ApiError, ApiResult, AuthError, AuthResult, StorageError};
