//! The SAML login flow and its fail-closed boundary.

use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::FlowError;
use crate::host::{AuthService, SessionOutcome};
use crate::login::resolve::resolve_identity;
use crate::request::AuthRequest;
use crate::saml::SamlToolkit;

/// Where every failed SAML login lands, whatever the cause.
pub const GENERIC_LOGIN_PATH: &str = "/login";

/// Orchestrates the SAML login flow between the toolkit and the host.
///
/// Holds its configuration and collaborators from construction; nothing is
/// mutated per request.
pub struct SamlService {
    toolkit: Arc<dyn SamlToolkit>,
    auth: Arc<dyn AuthService>,
}

impl SamlService {
    pub fn new(toolkit: Arc<dyn SamlToolkit>, auth: Arc<dyn AuthService>) -> Self {
        Self { toolkit, auth }
    }

    /// Handle the IdP callback at the assertion consumer endpoint.
    ///
    /// This is the fail-closed boundary: any flow error is logged server-side
    /// and collapsed into a redirect to the generic login page, so the client
    /// never learns why a login was refused. Only a successful handoff
    /// produces a different response.
    pub async fn handle_saml(&self, request: &AuthRequest) -> SessionOutcome {
        match self.saml_login(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_expected_rejection() {
                    warn!(error = %e, "SAML login rejected");
                } else {
                    error!(error = %e, "exception when handling /saml request");
                }
                debug!("redirecting to main login page");
                SessionOutcome::redirect(GENERIC_LOGIN_PATH)
            }
        }
    }

    /// Validate the POSTed response, resolve identities and hand off to the
    /// host for session creation.
    async fn saml_login(&self, request: &AuthRequest) -> Result<SessionOutcome, FlowError> {
        debug!("handling login from SAML identity provider");

        let toolkit = Arc::clone(&self.toolkit);
        let params = request.toolkit_params();

        // The toolkit does synchronous XML and signature work; keep it off
        // the async runtime.
        let result = tokio::task::spawn_blocking(move || toolkit.validate_and_extract(&params))
            .await
            .context("SAML validation task failed")
            .map_err(FlowError::Internal)??;

        if !result.errors.is_empty() {
            return Err(FlowError::Protocol(result.errors.join(", ")));
        }
        if !result.authenticated {
            return Err(FlowError::NotAuthenticated);
        }

        let identity = resolve_identity(&result)?;

        if !self.auth.user_map().contains(&identity.application_username) {
            info!(
                audit_username = %identity.audit_username,
                application_username = %identity.application_username,
                "user failed to authenticate via SAML under application user"
            );
            return Err(FlowError::UnknownApplicationUser(
                identity.application_username,
            ));
        }

        info!(
            audit_username = %identity.audit_username,
            application_username = %identity.application_username,
            "user authenticated via SAML under application user"
        );

        self.auth
            .handle_successful_login(request, &identity.application_username)
            .await
    }

    /// Build the IdP redirect that starts an SP-initiated login.
    ///
    /// The request's relay state, when present, rides along so the IdP can
    /// return the user to where they started.
    pub async fn login_redirect(&self, request: &AuthRequest) -> Result<SessionOutcome, FlowError> {
        let toolkit = Arc::clone(&self.toolkit);
        let params = request.toolkit_params();
        let relay_state = request.relay_state().map(str::to_string);

        let url = tokio::task::spawn_blocking(move || {
            toolkit.login_redirect_url(&params, relay_state.as_deref())
        })
        .await
        .context("SAML redirect task failed")
        .map_err(FlowError::Internal)??;

        Ok(SessionOutcome::redirect(url))
    }

    /// The host auth service this flow hands sessions off to.
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.auth
    }
}
