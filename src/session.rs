//! UI-facing session state

use crate::error::Result;
use crate::storage::{Storage, PROFILE_KEY};
use crate::types::UserProfile;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Who is logged in, as seen by views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn logged_in(user: UserProfile) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_admin)
    }
}

/// Single authoritative [`Session`], mirrored to storage as a profile snapshot
///
/// Views subscribe instead of keeping their own logged-in flags.
pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(Session::logged_out());
        Self { state, storage }
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Restore the session from the persisted snapshot, without network.
    ///
    /// A corrupt snapshot is removed. Returns whether a user was restored.
    pub fn hydrate(&self) -> Result<bool> {
        let Some(raw) = self.storage.get(PROFILE_KEY)? else {
            return Ok(false);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored from profile snapshot");
                self.state.send_replace(Session::logged_in(user));
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable profile snapshot");
                self.storage.remove(PROFILE_KEY)?;
                Ok(false)
            }
        }
    }

    /// Mark `user` as logged in and persist the snapshot
    pub fn sign_in(&self, user: UserProfile) -> Result<()> {
        self.persist(&user)?;
        self.state.send_replace(Session::logged_in(user));
        Ok(())
    }

    /// Replace the cached profile of the logged-in user
    pub fn update_user(&self, user: UserProfile) -> Result<()> {
        self.sign_in(user)
    }

    /// Forget the user. Never fails: a storage error is logged only.
    pub fn sign_out(&self) {
        if let Err(e) = self.storage.remove(PROFILE_KEY) {
            warn!(error = %e, "Failed to remove profile snapshot");
        }
        self.state.send_replace(Session::logged_out());
    }

    fn persist(&self, user: &UserProfile) -> Result<()> {
        let snapshot = serde_json::to_string(user)?;
        self.storage.set(PROFILE_KEY, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn profile() -> UserProfile {
        serde_json::from_str(r#"{"id": 9, "username": "sam", "teams": [1], "is_staff": false}"#)
            .unwrap()
    }

    #[test]
    fn test_sign_in_and_out() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(Arc::new(storage.clone()));
        assert_eq!(store.current(), Session::logged_out());

        store.sign_in(profile()).unwrap();
        assert!(store.current().is_logged_in);
        assert!(storage.get(PROFILE_KEY).unwrap().is_some());

        store.sign_out();
        assert_eq!(store.current(), Session::logged_out());
        assert!(storage.get(PROFILE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_hydrate_from_snapshot() {
        let storage = MemoryStorage::new();
        storage
            .set(PROFILE_KEY, &serde_json::to_string(&profile()).unwrap())
            .unwrap();

        let store = SessionStore::new(Arc::new(storage));
        assert!(store.hydrate().unwrap());
        assert_eq!(store.current(), Session::logged_in(profile()));
    }

    #[test]
    fn test_hydrate_discards_corrupt_snapshot() {
        let storage = MemoryStorage::new();
        storage.set(PROFILE_KEY, "{not json").unwrap();

        let store = SessionStore::new(Arc::new(storage.clone()));
        assert!(!store.hydrate().unwrap());
        assert!(!store.current().is_logged_in);
        assert!(storage.get(PROFILE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let mut rx = store.subscribe();

        store.sign_in(profile()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_logged_in);

        store.sign_out();
        assert!(!rx.borrow_and_update().is_logged_in);
    }
}
