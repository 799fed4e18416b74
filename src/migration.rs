//! One-time cleanup of tokens left in storage by older clients

use crate::error::Result;
use crate::session_manager::{SessionManager, TokenRefresher};
use crate::storage::{Storage, LEGACY_ACCESS_TOKEN_KEY, LEGACY_REFRESH_TOKEN_KEY};
use tracing::{info, warn};

/// Move a legacy access token into memory and erase both legacy keys.
///
/// The refresh token is dropped, never read into the client. Safe to run on
/// every startup. Returns whether anything legacy was found.
pub fn migrate_legacy_storage<R: TokenRefresher>(
    storage: &dyn Storage,
    session: &SessionManager<R>,
) -> Result<bool> {
    let access = storage.get(LEGACY_ACCESS_TOKEN_KEY)?;
    let had_refresh = storage.get(LEGACY_REFRESH_TOKEN_KEY)?.is_some();

    if access.is_none() && !had_refresh {
        return Ok(false);
    }

    warn!(
        access_token = %access.is_some(),
        refresh_token = %had_refresh,
        "Found tokens in persistent storage, migrating"
    );

    if let Some(token) = access.filter(|t| !t.trim().is_empty()) {
        if session.get_credential().is_none() {
            session.set_credential(token, None);
        }
    }

    storage.remove(LEGACY_ACCESS_TOKEN_KEY)?;
    storage.remove(LEGACY_REFRESH_TOKEN_KEY)?;

    info!("Legacy tokens removed from storage, access token now held in memory only");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::storage::{MemoryStorage, PROFILE_KEY};
    use crate::types::TokenResponse;
    use std::time::Duration;

    struct NeverRefresh;

    impl TokenRefresher for NeverRefresh {
        async fn refresh_access(&self) -> crate::error::Result<TokenResponse> {
            Err(ClientError::RefreshFailed("not available in tests".to_string()))
        }
    }

    fn manager() -> SessionManager<NeverRefresh> {
        SessionManager::with_timings(NeverRefresh, Duration::from_secs(1800), Duration::from_secs(60))
    }

    #[test]
    fn test_migrates_and_erases_legacy_tokens() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();
        storage.set(LEGACY_REFRESH_TOKEN_KEY, "old-refresh").unwrap();
        storage.set(PROFILE_KEY, r#"{"id":1}"#).unwrap();
        let session = manager();

        assert!(migrate_legacy_storage(&storage, &session).unwrap());

        assert_eq!(session.get_credential().as_deref(), Some("old-access"));
        assert_eq!(storage.keys(), vec![PROFILE_KEY.to_string()]);
        assert!(storage.values().iter().all(|v| !v.contains("old-")));
    }

    #[test]
    fn test_refresh_only_legacy_entry_is_erased() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_REFRESH_TOKEN_KEY, "old-refresh").unwrap();
        let session = manager();

        assert!(migrate_legacy_storage(&storage, &session).unwrap());
        assert!(session.get_credential().is_none());
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();
        let session = manager();

        assert!(migrate_legacy_storage(&storage, &session).unwrap());
        assert!(!migrate_legacy_storage(&storage, &session).unwrap());
        assert_eq!(session.get_credential().as_deref(), Some("old-access"));
    }

    #[test]
    fn test_existing_credential_is_kept() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();
        let session = manager();
        session.set_credential("current", None);

        assert!(migrate_legacy_storage(&storage, &session).unwrap());
        assert_eq!(session.get_credential().as_deref(), Some("current"));
        assert!(storage.get(LEGACY_ACCESS_TOKEN_KEY).unwrap().is_none());
    }
}
