//! The pluggable login handler that puts SSO in front of the host's login.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::FlowError;
use crate::host::{LoginHandler, SessionOutcome};
use crate::login::dispatch::{self, LoginDecision};
use crate::request::AuthRequest;
use crate::service::SamlService;

/// Name the handler registers under.
pub const HANDLER_NAME: &str = "SAML Login Handler";

/// Login entry point that redirects to the identity provider unless the
/// requester supplied credentials, in which case the host's default handler
/// takes over.
pub struct SamlLoginHandler {
    service: Arc<SamlService>,
}

impl SamlLoginHandler {
    pub fn new(service: Arc<SamlService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LoginHandler for SamlLoginHandler {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    async fn handle_login(&self, request: &AuthRequest) -> Result<SessionOutcome, FlowError> {
        match dispatch::decide(request) {
            LoginDecision::SsoRedirect => {
                debug!("handling SAML login");
                self.handle_login_redirect(request).await
            }
            LoginDecision::Fallback => {
                debug!("requester provided login credentials, using default login handler instead");
                let fallback = self
                    .service
                    .auth()
                    .default_login_handler()
                    .ok_or(FlowError::HostServiceUnavailable("default login handler"))?;
                fallback.handle_login(request).await
            }
        }
    }

    async fn handle_login_redirect(
        &self,
        request: &AuthRequest,
    ) -> Result<SessionOutcome, FlowError> {
        self.service.login_redirect(request).await
    }
}
