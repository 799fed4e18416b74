//! Pulse Rust Client
//!
//! A Rust client library for the Pulse team wellness API. The access token
//! lives only in memory and is renewed through an HTTP-only refresh cookie,
//! with concurrent refreshes collapsed into a single network call.

pub mod api_client;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod services;
pub mod session;
pub mod session_manager;
pub mod storage;
pub mod token_store;
pub mod types;

pub use api_client::ApiClient;
pub use auth::{LoginRequest, RegisterRequest};
pub use client::PulseClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{Session, SessionStore};
pub use session_manager::{HttpTokenRefresher, SessionManager, TokenRefresher};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use token_store::TokenStore;
pub use types::{Credential, TokenResponse, UserProfile};
