//! SAML 2.0 single sign-on plugin for a host web application.
//!
//! The plugin sits in front of the host's login: bare login requests are
//! redirected to the configured identity provider, credentialed ones fall
//! through to the host's own handler, and the IdP's POSTed assertions are
//! validated and handed off to the host for session creation. All protocol
//! work is delegated to the samael toolkit behind the [`saml::SamlToolkit`]
//! seam; the host is reached only through the [`host::AuthService`] traits.
//!
//! Wiring is one call at startup:
//!
//! ```no_run
//! # use std::path::Path;
//! # use std::sync::Arc;
//! # fn wire(auth: Arc<dyn saml_sso_plugin::host::AuthService>) -> anyhow::Result<()> {
//! let service = saml_sso_plugin::enable(Path::new("conf/settings.json"), auth)?;
//! # Ok(()) }
//! ```

pub mod error;
pub mod host;
pub mod login;
pub mod request;
pub mod saml;
pub mod service;

#[cfg(test)]
mod testutil;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::host::{AuthService, LoginHandler};
use crate::login::SamlLoginHandler;
use crate::saml::{SamaelProvider, SamlSettings, SamlToolkit};
use crate::service::SamlService;

pub use crate::error::FlowError;
pub use crate::host::SessionOutcome;
pub use crate::request::AuthRequest;

/// Enable the plugin from an on-disk settings file.
///
/// Fails fast on a missing or invalid configuration; SSO is never silently
/// disabled.
pub fn enable(settings_path: &Path, auth: Arc<dyn AuthService>) -> Result<Arc<SamlService>> {
    let settings = SamlSettings::load(settings_path)?;
    enable_with_settings(settings, auth)
}

/// Enable the plugin with already-loaded settings.
pub fn enable_with_settings(
    settings: SamlSettings,
    auth: Arc<dyn AuthService>,
) -> Result<Arc<SamlService>> {
    debug!(
        idp = %settings.idp.entity_id,
        strict = settings.strict,
        "initializing SAML provider"
    );
    let provider = SamaelProvider::new(settings)?;
    Ok(enable_with_toolkit(Arc::new(provider), auth))
}

/// Enable the plugin with an explicit toolkit implementation.
pub fn enable_with_toolkit(
    toolkit: Arc<dyn SamlToolkit>,
    auth: Arc<dyn AuthService>,
) -> Arc<SamlService> {
    let service = Arc::new(SamlService::new(toolkit, Arc::clone(&auth)));
    let handler = Arc::new(SamlLoginHandler::new(Arc::clone(&service)));

    info!(
        handler = handler.name(),
        "setting SAML as primary login handler for auth service"
    );
    auth.set_optional_login_handler(handler);

    service
}
