//! Usage: Session state: the single owned credential record plus change notifications.
//!
//! The store is the only writable owner of the session. Collaborators read
//! through `current`/`is_valid` and react to changes through `subscribe`;
//! nothing here performs network I/O.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::principal::Principal;
use crate::infra::session_file::SessionFile;
use crate::shared::mutex_ext::MutexExt;
use crate::shared::time::now_unix_seconds;

/// Live credential state: an opaque backend token plus the identity it was
/// issued for. "No session" is always `None`, never an empty-token value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub obtained_at: i64,
    /// The backend issues opaque tokens with no declared expiry; when this is
    /// absent a present token counts as valid until a call rejects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Session {
    pub fn new(token: impl Into<String>, principal: Principal) -> Self {
        Self {
            token: token.into(),
            principal,
            obtained_at: now_unix_seconds(),
            expires_at: None,
        }
    }

    pub(crate) fn is_live(&self, now_unix: i64) -> bool {
        if self.token.trim().is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expiry) => expiry > now_unix,
            None => true,
        }
    }
}

/// Owner of the current session.
///
/// Mutations are synchronous under a mutex, so overlapping logins resolve to
/// whichever completion applied last. Every save/clear is published on a
/// watch channel; subscribers always observe the latest value.
#[derive(Debug)]
pub struct SessionStore {
    current: Mutex<Option<Session>>,
    changed_tx: watch::Sender<Option<Session>>,
    file: Option<SessionFile>,
}

impl SessionStore {
    /// Store without durable backing (tests, ephemeral embedders).
    pub fn in_memory() -> Self {
        Self::with_initial(None, None)
    }

    /// Store backed by a durable session record, rehydrated from disk.
    ///
    /// A missing record means "no session". An unreadable or corrupt record is
    /// fail-open: logged and treated as no session rather than blocking start.
    pub fn open(file: SessionFile) -> Self {
        let initial = match file.load() {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(
                    path = %file.path().display(),
                    "stored session unreadable; starting without a session: {}",
                    err
                );
                None
            }
        };
        Self::with_initial(initial, Some(file))
    }

    fn with_initial(initial: Option<Session>, file: Option<SessionFile>) -> Self {
        let (changed_tx, _) = watch::channel(initial.clone());
        Self {
            current: Mutex::new(initial),
            changed_tx,
            file,
        }
    }

    /// Replace the current session and persist it.
    ///
    /// The in-memory replacement and the notification always happen; the
    /// durable write is best-effort so a full disk cannot fail a login.
    pub fn save(&self, session: Session) {
        {
            let mut guard = self.current.lock_or_recover();
            *guard = Some(session.clone());
        }

        if let Some(file) = &self.file {
            if let Err(err) = file.store(&session) {
                tracing::warn!(
                    path = %file.path().display(),
                    "session persisted in memory only: {}",
                    err
                );
            }
        }

        self.changed_tx.send_replace(Some(session));
    }

    /// Drop the session and its durable record. Idempotent; subscribers are
    /// notified with `None` on every call.
    pub fn clear(&self) {
        {
            let mut guard = self.current.lock_or_recover();
            guard.take();
        }

        if let Some(file) = &self.file {
            if let Err(err) = file.remove() {
                tracing::warn!(
                    path = %file.path().display(),
                    "stored session record not removed: {}",
                    err
                );
            }
        }

        self.changed_tx.send_replace(None);
    }

    /// True iff a session is present and not past its expiry (when one is set).
    pub fn is_valid(&self) -> bool {
        let now = now_unix_seconds();
        self.current
            .lock_or_recover()
            .as_ref()
            .is_some_and(|session| session.is_live(now))
    }

    pub fn current(&self) -> Option<Session> {
        self.current.lock_or_recover().clone()
    }

    /// Session-changed notifications for the RouteGuard/UI layer. The receiver
    /// starts at the current value and sees every subsequent save/clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changed_tx.subscribe()
    }
}
