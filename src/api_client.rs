//! HTTP layer: bearer attachment, status mapping and 401 recovery

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;
use crate::session_manager::{HttpTokenRefresher, SessionManager, TokenRefresher};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Query string pairs
pub type Query = Vec<(&'static str, String)>;

/// Authenticated REST client for the Pulse API
///
/// Every authenticated request asks the [`SessionManager`] for a valid token
/// first. A 401 triggers exactly one refresh and one retry; if that does not
/// resolve it, the credential and the UI session are cleared and
/// [`ClientError::SessionExpired`] is returned.
pub struct ApiClient<R = HttpTokenRefresher> {
    http_client: Client,
    api_url: String,
    session_manager: Arc<SessionManager<R>>,
    session_store: Arc<SessionStore>,
}

/// Build the cookie-enabled client shared by API calls and the refresher
pub fn build_http_client(config: &ClientConfig) -> Result<Client> {
    let client = Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

impl<R: TokenRefresher> ApiClient<R> {
    pub fn new(
        http_client: Client,
        config: &ClientConfig,
        session_manager: Arc<SessionManager<R>>,
        session_store: Arc<SessionStore>,
    ) -> Self {
        Self {
            http_client,
            api_url: config.api_url(),
            session_manager,
            session_store,
        }
    }

    pub fn session_manager(&self) -> &Arc<SessionManager<R>> {
        &self.session_manager
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session_store
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut req = self
            .http_client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send an authenticated request, applying the refresh-then-retry-once policy.
    ///
    /// `customize` adds query and body; it runs once per attempt. A 401 only
    /// expires the session the rejected token belonged to: if a login or a
    /// refresh replaced it meanwhile, the request is retried with the current
    /// token instead of refreshing again.
    pub async fn send<F>(&self, method: Method, path: &str, customize: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let (token, generation) = self.session_manager.valid_token_tracked().await;
        let response = customize(self.request(method.clone(), path, token.as_deref()))
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        let (retry_token, retry_generation) = match self.session_manager.token_snapshot() {
            (Some(current), current_generation) if token.as_deref() != Some(current.as_str()) => {
                debug!(%method, path = %path, "Unauthorized, token changed meanwhile, retrying with current token");
                (current, current_generation)
            }
            // No token sent: valid_token_tracked already spent the one refresh
            // attempt. Token sent but store now empty: logout or a failed refresh.
            (None, current_generation) if token.is_none() || current_generation != generation => {
                debug!(%method, path = %path, "Unauthorized with no session to recover");
                return Err(self.expire_session(generation));
            }
            _ => {
                debug!(%method, path = %path, "Unauthorized, refreshing token and retrying once");
                match self.session_manager.refresh_tracked().await {
                    Ok(renewed) => renewed,
                    Err(e) => {
                        warn!(error = %e, path = %path, "Refresh after 401 failed");
                        return Err(self.expire_session(generation));
                    }
                }
            }
        };

        let retried = customize(self.request(method.clone(), path, Some(&retry_token)))
            .send()
            .await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(%method, path = %path, "Still unauthorized after retry");
            return Err(self.expire_session(retry_generation));
        }
        ensure_success(retried).await
    }

    /// Send a request with no credential and no 401 recovery
    pub async fn send_public<F>(&self, method: Method, path: &str, customize: F) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let response = customize(self.request(method, path, None)).send().await?;
        ensure_success(response).await
    }

    /// Best-effort POST carrying a specific token and no recovery.
    /// Returns the raw response so the caller decides what failure means.
    pub async fn post_with_token(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let response = self
            .request(Method::POST, path, token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, |req| req).await?;
        parse_json(response).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        let response = self.send(Method::GET, path, |req| req.query(query)).await?;
        parse_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, |req| req.json(body)).await?;
        parse_json(response).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PATCH, path, |req| req.json(body)).await?;
        parse_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, |req| req).await?;
        Ok(())
    }

    /// Expire the session that `generation` identifies. A credential written
    /// after it (a new login) is left alone, and so is the UI session.
    fn expire_session(&self, generation: u64) -> ClientError {
        if self.session_manager.clear_if_current(generation)
            || self.session_manager.get_credential().is_none()
        {
            self.session_store.sign_out();
        } else {
            debug!(generation = %generation, "Session replaced while request was in flight, keeping it");
        }
        ClientError::SessionExpired
    }
}

/// Map non-2xx responses to [`ClientError::Api`]
pub async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let err = ClientError::from_response_body(status, &text);
    debug!(status = %status, error = %err, "Request failed");
    Err(err)
}

pub async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(ClientError::InvalidResponse("empty response body".to_string()));
    }
    Ok(serde_json::from_str(&body)?)
}
