//! Cross-thread access to a [`Session`].
//!
//! The matcher never locks. A session shared between threads is reachable
//! only through a held guard, so every `match_text` / `reset` / extract call
//! on a shared session runs under the lock by construction.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::RegexError;
use super::session::Session;

/// Cloneable handle to a mutex-protected session.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    /// Create a shared session for `pattern`; same validation as [`Session::create`].
    pub fn create(pattern: &str) -> Result<Self, RegexError> {
        Session::create(pattern).map(Self::from)
    }

    /// [`SharedSession::create`] for a pattern that need not be UTF-8.
    pub fn create_bytes(pattern: &[u8]) -> Result<Self, RegexError> {
        Session::create_bytes(pattern).map(Self::from)
    }

    /// Block until the session is available.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock()
    }

    /// Acquire the session without blocking.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Session>> {
        self.inner.try_lock()
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }
}
