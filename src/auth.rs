//! Login, signup, logout and startup flows

use crate::api_client::parse_json;
use crate::client::PulseClient;
use crate::error::{ClientError, Result};
use crate::migration::migrate_legacy_storage;
use crate::session_manager::TokenRefresher;
use crate::types::{TokenResponse, UserProfile};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

/// Body of `POST /auth/login/`
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register/`
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<i64>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("username", &self.username)
            .field("team", &self.team)
            .finish()
    }
}

impl<R: TokenRefresher> PulseClient<R> {
    /// Startup step: erase legacy token storage, then restore the session
    /// from the profile snapshot. No network access; token validity is
    /// established by the first authenticated call.
    pub fn startup(&self) -> Result<bool> {
        let store = self.api.session_store();
        migrate_legacy_storage(store.storage().as_ref(), self.api.session_manager())?;
        store.hydrate()
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile> {
        let tokens = self.obtain_tokens("auth/login/", credentials).await?;
        let user = self.establish_session(tokens).await?;
        info!(user_id = %user.id, "Login successful");
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile> {
        let tokens = self.obtain_tokens("auth/register/", request).await?;
        let user = self.establish_session(tokens).await?;
        info!(user_id = %user.id, "Registration successful");
        Ok(user)
    }

    /// Log out. Always succeeds locally: a failing server call is logged.
    pub async fn logout(&self) {
        let token = self.api.session_manager().get_credential();
        match self.api.post_with_token("auth/logout/", token.as_deref()).await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Server logout rejected, clearing local session anyway");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        self.api.session_manager().clear();
        self.api.session_store().sign_out();
        info!("Logged out");
    }

    /// PATCH `/users/me/` and refresh the cached profile
    pub async fn update_me(&self, patch: &Value) -> Result<UserProfile> {
        let user = self.users().update_me(patch).await?;
        self.api.session_store().update_user(user.clone())?;
        Ok(user)
    }

    async fn obtain_tokens<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<TokenResponse> {
        let response = self
            .api
            .send_public(Method::POST, path, |req| req.json(body))
            .await?;
        parse_json::<TokenResponse>(response)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("missing access token: {e}")))
    }

    async fn establish_session(&self, tokens: TokenResponse) -> Result<UserProfile> {
        let session_manager = self.api.session_manager();
        session_manager.set_credential(tokens.access, tokens.expires_in);
        let generation = session_manager.generation();

        let user = match self.users().me().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Profile fetch after login failed");
                session_manager.clear_if_current(generation);
                return Err(e);
            }
        };

        self.api.session_store().sign_in(user.clone())?;
        Ok(user)
    }
}
