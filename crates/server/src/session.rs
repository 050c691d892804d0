//! Play sessions: created by `/start`, consumed once by `/submit`.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::clock::Clock;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// A started run. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub player_name: String,
    /// Wall-clock start, as an offset from the unix epoch.
    pub started_at: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} expired")]
    Expired(String),
}

/// In-memory session table keyed by random v4 UUIDs.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    /// `None` keeps sessions until consumed.
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Creates a session for `player_name` and returns its id.
    pub fn start(&self, player_name: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            id: id.clone(),
            player_name: player_name.into(),
            started_at: self.clock.now(),
        };
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Removes and returns the session. At most one caller ever gets `Ok` for a given id.
    pub fn consume(&self, session_id: &str) -> Result<Session, SessionError> {
        let (_, session) = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        if self.is_expired(&session) {
            return Err(SessionError::Expired(session.id));
        }
        Ok(session)
    }

    /// Drops sessions older than the TTL; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.is_expired(session));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns a task purging expired sessions every `period`.
    ///
    /// The task holds only a weak reference and exits once the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = store.len(), "Expired sessions purged");
                }
            }
        })
    }

    fn is_expired(&self, session: &Session) -> bool {
        match self.ttl {
            Some(ttl) => self.clock.now().saturating_sub(session.started_at) > ttl,
            None => false,
        }
    }
}
