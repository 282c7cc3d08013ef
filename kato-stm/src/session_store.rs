//! The session storage abstraction: one per-session async lock plus
//! sliding-TTL persistence, grounded on the teacher's
//! `cortex-storage::session`/`locks` pairing of a session record with a
//! keyed mutex per entity.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use kato_core::error::{KatoError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::Session;

/// Async trait every session backend implements.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: Session) -> Result<()>;
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;
    async fn put(&self, session: Session) -> Result<()>;
    /// Extend a session's sliding TTL without reading/writing its STM.
    async fn touch_ttl(&self, session_id: &str) -> Result<()>;
    async fn delete(&self, session_id: &str) -> Result<()>;
    /// Evict every session whose TTL has lapsed. Returns how many were
    /// removed.
    async fn evict_expired(&self) -> Result<usize>;
    /// Acquire the per-session critical section used to serialise
    /// concurrent `observe`/`learn`/`get_predictions` calls against the
    /// same session (spec.md §5).
    async fn lock(&self, session_id: &str) -> Arc<Mutex<()>>;
}

/// In-memory session store. One `DashMap` entry per session, one
/// `Arc<Mutex<()>>` per session for the critical section.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(session_id).map(|s| s.clone()))
    }

    async fn put(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn touch_ttl(&self, session_id: &str) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| KatoError::not_found("session", session_id))?;
        let now = Utc::now();
        entry.touch(now);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.remove(session_id);
        self.locks.remove(session_id);
        Ok(())
    }

    async fn evict_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|e| e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for id in &expired {
            self.sessions.remove(id);
            self.locks.remove(id);
        }
        Ok(expired.len())
    }

    async fn lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(session_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kato_core::interfaces::SessionConfig;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemorySessionStore::new();
        let session = Session::new("s1", "node-1", 3600, SessionConfig::default());
        store.create(session.clone()).await.unwrap();
        let fetched = store.get("s1").await.unwrap().unwrap();
        assert_eq!(fetched.session_id, "s1");
    }

    #[tokio::test]
    async fn touch_ttl_on_missing_session_errors() {
        let store = InMemorySessionStore::new();
        assert!(store.touch_ttl("missing").await.is_err());
    }

    #[tokio::test]
    async fn evict_expired_removes_lapsed_sessions() {
        let store = InMemorySessionStore::new();
        let session = Session::new("s1", "node-1", -1, SessionConfig::default());
        store.create(session).await.unwrap();
        let evicted = store.evict_expired().await.unwrap();
        assert_eq!(evicted, 1);
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lock_returns_the_same_mutex_for_the_same_session() {
        let store = InMemorySessionStore::new();
        let a = store.lock("s1").await;
        let b = store.lock("s1").await;
        assert!(Arc::ptr_eq(&a, &b));
    }
}
