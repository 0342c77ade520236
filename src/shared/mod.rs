//! Usage: Cross-cutting helpers (errors, security, locking, time).

pub(crate) mod error;
pub(crate) mod mutex_ext;
pub(crate) mod security;
pub(crate) mod time;
