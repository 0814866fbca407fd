/// Server-side session store
///
/// Tokens alone are not enough to stay signed in: every issued token carries a
/// session id, and the corresponding entry here must still exist when a
/// request is authenticated. Logout destroys the entry, which invalidates the
/// token immediately even though its signature and expiry are still valid.
///
/// Entries expire on the same schedule as the token they were issued with.
/// An expired entry is treated as absent and reclaimed on the next lookup;
/// `establish` also sweeps expired entries so abandoned sessions (browser
/// closed, no logout) cannot accumulate.
///
/// The store is in-process shared state behind an async `RwLock`; entries are
/// keyed by a generated UUID and hold the identity triple that was bound at
/// issuance time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The identity triple bound into both the token and the session entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id
    pub account_id: Uuid,

    /// Account email at issuance time
    pub email: String,

    /// Role name at issuance time (e.g., "MEMBER_VIP")
    pub role: String,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-process session store keyed by generated session ids
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an identity into a new session and returns its id
    ///
    /// The time to live mirrors the token the session is issued with.
    /// Already-expired entries are swept while the write lock is held.
    pub async fn establish(&self, identity: Identity, ttl: Duration) -> Uuid {
        let now = Utc::now();
        let sid = Uuid::new_v4();

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            sid,
            SessionEntry {
                identity,
                expires_at: now + ttl,
            },
        );

        sid
    }

    /// Looks up the identity bound to a live session id
    ///
    /// An expired entry is indistinguishable from a destroyed one and is
    /// reclaimed here.
    pub async fn get(&self, sid: Uuid) -> Option<Identity> {
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&sid) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.identity.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(&sid);
        None
    }

    /// Destroys a session
    ///
    /// Returns `false` if the session did not exist, so callers can surface
    /// a failed logout instead of silently ignoring it.
    pub async fn destroy(&self, sid: Uuid) -> bool {
        self.entries.write().await.remove(&sid).is_some()
    }

    /// Number of stored sessions, expired entries included until swept
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::hours(1)
    }

    fn identity() -> Identity {
        Identity {
            account_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role: "MEMBER_FREE".to_string(),
        }
    }

    #[tokio::test]
    async fn test_establish_and_get() {
        let store = SessionStore::new();
        let identity = identity();

        let sid = store.establish(identity.clone(), ttl()).await;
        assert_eq!(store.get(sid).await, Some(identity));
    }

    #[tokio::test]
    async fn test_destroy_invalidates_session() {
        let store = SessionStore::new();
        let sid = store.establish(identity(), ttl()).await;

        assert!(store.destroy(sid).await);
        assert!(store.get(sid).await.is_none());
    }

    #[tokio::test]
    async fn test_destroy_unknown_session_reports_failure() {
        let store = SessionStore::new();
        assert!(!store.destroy(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let sid1 = store.establish(identity(), ttl()).await;
        let sid2 = store.establish(identity(), ttl()).await;

        store.destroy(sid1).await;
        assert!(store.get(sid2).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_session_rejected_and_reclaimed() {
        let store = SessionStore::new();
        let sid = store.establish(identity(), Duration::seconds(-1)).await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(sid).await.is_none());
        // The lookup removed the stale entry
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_establish_sweeps_expired_entries() {
        let store = SessionStore::new();
        store.establish(identity(), Duration::seconds(-1)).await;
        store.establish(identity(), Duration::seconds(-1)).await;

        let live = store.establish(identity(), ttl()).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(live).await.is_some());
    }
}
