//! Type definitions for authentication

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on any credential lifetime, whatever the server announces.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Short-lived bearer access token with an absolute expiry.
///
/// Lives in memory only. Deliberately not `Serialize`.
#[derive(Clone)]
pub struct Credential {
    token: String,
    expires_at: Instant,
}

impl Credential {
    /// `ttl` is clamped to [`MAX_TOKEN_TTL`].
    pub fn new(token: String, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_TOKEN_TTL))
            .unwrap_or(now);
        Self { token, expires_at }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// True once `now >= expires_at - buffer`.
    pub fn is_expired_within(&self, buffer: Duration) -> bool {
        self.expires_at
            .checked_sub(buffer)
            .map_or(true, |threshold| Instant::now() >= threshold)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of `/auth/login/`, `/auth/register/` and `/auth/refresh/` responses.
///
/// Only `access` and `expires_in` are read. A `refresh` field, if the server
/// sends one, is ignored: the refresh secret travels in an HTTP-only cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A team membership as returned inside a user payload: either a bare id or
/// an embedded team object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamRef {
    Id(i64),
    Team {
        id: i64,
        #[serde(default)]
        team_name: Option<String>,
    },
}

impl TeamRef {
    pub fn id(&self) -> i64 {
        match self {
            TeamRef::Id(id) | TeamRef::Team { id, .. } => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TeamRef::Id(_) => None,
            TeamRef::Team { team_name, .. } => team_name.as_deref(),
        }
    }
}

/// Snapshot of the authenticated user, as served by `/users/me/`.
///
/// Contains no secret material and may be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
    /// Admin flag.
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl UserProfile {
    /// Full name if the server provides one, else first + last, else username.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return full.trim().to_string();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.username.clone()
        } else {
            joined
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_staff
    }

    pub fn team_ids(&self) -> Vec<i64> {
        self.teams.iter().map(TeamRef::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_credential_expiry_buffer() {
        let credential = Credential::new("tok".to_string(), Duration::from_secs(1800));

        assert!(!credential.is_expired_within(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(1739)).await;
        assert!(!credential.is_expired_within(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(credential.is_expired_within(Duration::from_secs(60)));
        assert!(!credential.is_expired_within(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_lifetime_is_clamped() {
        let credential = Credential::new("tok".to_string(), Duration::from_secs(u64::MAX));
        assert_eq!(credential.expires_at(), Instant::now() + MAX_TOKEN_TTL);
        assert!(!credential.is_expired_within(Duration::from_secs(60)));
        assert!(credential.is_expired_within(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = Credential::new("super-secret".to_string(), Duration::from_secs(10));
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_token_response_ignores_refresh_field() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access": "a1", "refresh": "r1"}"#).unwrap();
        assert_eq!(parsed.access, "a1");
        assert_eq!(parsed.expires_in, None);
    }

    #[test]
    fn test_user_profile_mixed_team_refs() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "id": 7,
                "username": "jdoe",
                "first_name": "Jane",
                "last_name": "Doe",
                "teams": [3, {"id": 4, "team_name": "Platform"}],
                "is_staff": true
            }"#,
        )
        .unwrap();

        assert_eq!(profile.display_name(), "Jane Doe");
        assert_eq!(profile.team_ids(), vec![3, 4]);
        assert_eq!(profile.teams[1].name(), Some("Platform"));
        assert!(profile.is_admin());
        assert!(profile.is_active);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id": 1, "username": "ops", "first_name": " "}"#).unwrap();
        assert_eq!(profile.display_name(), "ops");
    }
}
