//! Host collaborator interfaces and the session handoff outcome.
//!
//! The plugin never owns sessions, cookies or the user database; it talks to
//! the host through these seams.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::FlowError;
use crate::request::AuthRequest;

/// Outcome of a completed login flow: an HTTP redirect plus any cookie
/// directives the host wants set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Redirect status code.
    pub status: u16,
    /// Value for the `Location` header.
    pub location: String,
    /// `Set-Cookie` values, in order.
    pub cookies: Vec<String>,
}

impl SessionOutcome {
    /// A `302 Found` redirect with no cookies.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: location.into(),
            cookies: Vec::new(),
        }
    }

    /// Attach a `Set-Cookie` directive.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }
}

/// The host's set of recognized application usernames.
///
/// Membership checks are read-only; the plugin never mutates this set.
pub trait UserDirectory: Send + Sync {
    fn contains(&self, username: &str) -> bool;
}

impl UserDirectory for HashSet<String> {
    fn contains(&self, username: &str) -> bool {
        HashSet::contains(self, username)
    }
}

/// A pluggable login entry point, chosen by the host at runtime.
#[async_trait]
pub trait LoginHandler: Send + Sync {
    /// Human-readable handler name, for wiring diagnostics.
    fn name(&self) -> &str;

    /// Handle an inbound login-initiation request.
    async fn handle_login(&self, request: &AuthRequest) -> Result<SessionOutcome, FlowError>;

    /// Redirect the requester to this handler's identity provider.
    async fn handle_login_redirect(
        &self,
        request: &AuthRequest,
    ) -> Result<SessionOutcome, FlowError>;
}

/// The host's authentication service.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Recognized application usernames.
    fn user_map(&self) -> &dyn UserDirectory;

    /// Mint a session for a verified application username and produce the
    /// post-login redirect. The outcome propagates to the client unchanged.
    async fn handle_successful_login(
        &self,
        request: &AuthRequest,
        username: &str,
    ) -> Result<SessionOutcome, FlowError>;

    /// Register an alternate login entry point ahead of the default one.
    fn set_optional_login_handler(&self, handler: Arc<dyn LoginHandler>);

    /// The credential-based fallback handler, if the host configured one.
    fn default_login_handler(&self) -> Option<Arc<dyn LoginHandler>>;
}
