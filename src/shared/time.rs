//! Usage: Clock helpers shared across modules.

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix_seconds() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        // Pre-epoch clocks only happen on badly misconfigured hosts; treat as epoch.
        Err(_) => 0,
    }
}
