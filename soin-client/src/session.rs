//! Session state: the single source of truth for "who is logged in", with
//! durable-token restore on startup.
//!
//! `restore()` must complete before the first gate decision is made for the
//! initial screen; that is the only ordering constraint in the client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::{ApiClient, AuthResponse, RegisterProfile};
use crate::error::Result;
use crate::identity::Identity;
use crate::storage::TokenStore;

/// Credential attached to an outgoing request. Constructed fresh from the
/// session at call time and passed explicitly, not kept in a hidden global.
#[derive(Debug, Clone)]
pub struct AuthContext {
    bearer: String,
}

impl AuthContext {
    pub fn new(bearer: impl Into<String>) -> Self {
        Self {
            bearer: bearer.into(),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.bearer
    }
}

/// Network seam for the auth flow. Implemented by [`ApiClient`]; tests plug
/// in a stub.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse>;
    async fn register(&self, profile: &RegisterProfile) -> Result<AuthResponse>;
    async fn me(&self, ctx: &AuthContext) -> Result<Identity>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        ApiClient::login(self, email, password).await
    }

    async fn register(&self, profile: &RegisterProfile) -> Result<AuthResponse> {
        ApiClient::register(self, profile).await
    }

    async fn me(&self, ctx: &AuthContext) -> Result<Identity> {
        ApiClient::me(self, ctx).await
    }
}

/// Holds the current authenticated identity (or none) and the bearer token
/// backing it.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    identity: Option<Identity>,
    token: Option<String>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn AuthBackend>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            backend,
            tokens,
            identity: None,
            token: None,
        }
    }

    /// Attempt to re-establish a session from the durable token.
    ///
    /// On any failure the durable token is cleared and the session stays
    /// empty. An expired token and an unreachable network are
    /// not distinguished here; neither surfaces an error and nothing is retried.
    /// Returns whether a session was established.
    pub async fn restore(&mut self) -> bool {
        let stored = match self.tokens.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!("could not read stored token: {e}");
                return false;
            }
        };

        match self.backend.me(&AuthContext::new(stored.clone())).await {
            Ok(identity) => {
                info!("session restored for {}", identity.email);
                self.token = Some(stored);
                self.identity = Some(identity);
                true
            }
            Err(e) => {
                warn!("session restore failed, falling back to logged out: {e}");
                if let Err(e) = self.tokens.clear().await {
                    warn!("could not clear stored token: {e}");
                }
                self.identity = None;
                self.token = None;
                false
            }
        }
    }

    /// Authenticate with credentials. On success the token is persisted and
    /// the identity set; on failure state is left unchanged and the error
    /// carries the server-provided reason.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity> {
        let AuthResponse { access_token, user } = self.backend.login(email, password).await?;
        self.tokens.save(&access_token).await?;
        info!("logged in as {} ({:?})", user.email, user.role);
        self.token = Some(access_token);
        self.identity = Some(user.clone());
        Ok(user)
    }

    /// Create an account and establish a session, same contract as `login`.
    /// A doctor registration yields a pending identity that the gate keeps
    /// off the doctor dashboard until approved.
    pub async fn register(&mut self, profile: &RegisterProfile) -> Result<Identity> {
        let AuthResponse { access_token, user } = self.backend.register(profile).await?;
        self.tokens.save(&access_token).await?;
        info!("registered {} ({:?})", user.email, user.role);
        self.token = Some(access_token);
        self.identity = Some(user.clone());
        Ok(user)
    }

    /// End the session. Requires no network call; a storage failure is
    /// logged and swallowed so logout always succeeds.
    pub async fn logout(&mut self) {
        if let Err(e) = self.tokens.clear().await {
            warn!("could not clear stored token: {e}");
        }
        self.identity = None;
        self.token = None;
        info!("logged out");
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// A fresh request credential for the current session, or `None` when
    /// logged out.
    pub fn auth_context(&self) -> Option<AuthContext> {
        self.token.as_deref().map(AuthContext::new)
    }
}
