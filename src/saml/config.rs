//! SAML settings loaded from the plugin's JSON configuration file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process-wide SAML configuration, loaded once at startup and immutable
/// afterwards. The on-disk shape is the OneLogin-style `settings.json`:
///
/// ```json
/// {
///   "strict": true,
///   "sp": { "entityId": "...", "assertionConsumerService": { "url": "..." } },
///   "idp": { "entityId": "...", "singleSignOnService": { "url": "..." }, "x509cert": "..." }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SamlSettings {
    /// Reject responses that fail strict protocol checks (destination match,
    /// signature presence). Leave off only for test IdPs.
    #[serde(default)]
    pub strict: bool,

    /// Enable verbose toolkit diagnostics.
    #[serde(default)]
    pub debug: bool,

    /// Service-provider identity: this application.
    pub sp: SpSettings,

    /// Identity-provider endpoint and trust material.
    pub idp: IdpSettings,

    /// Clock skew tolerance in seconds for assertion validity windows.
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: i64,
}

/// Service-provider section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpSettings {
    /// SP entity ID (the audience the IdP asserts for).
    pub entity_id: String,

    /// Endpoint the IdP POSTs assertions back to.
    pub assertion_consumer_service: EndpointSettings,
}

/// Identity-provider section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IdpSettings {
    /// IdP entity ID.
    pub entity_id: String,

    /// Where to send the browser for login initiation.
    pub single_sign_on_service: EndpointSettings,

    /// IdP signing certificate, base64 DER without PEM armor.
    #[serde(rename = "x509cert", default)]
    pub x509_cert: String,
}

/// A SAML endpoint: URL plus binding URN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EndpointSettings {
    pub url: String,

    /// Binding URN, e.g. `urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST`.
    #[serde(default)]
    pub binding: String,
}

fn default_clock_skew() -> i64 {
    300 // 5 minutes
}

impl SamlSettings {
    /// Load settings from a JSON file.
    ///
    /// A missing or malformed file is a startup failure; SSO is never
    /// silently disabled by falling back to an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read SAML settings: {}", path.display()))?;
        let settings: SamlSettings = serde_json::from_slice(&raw)
            .with_context(|| format!("malformed SAML settings: {}", path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("invalid SAML settings in {}: {e}", path.display()))?;
        Ok(settings)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.sp.entity_id.is_empty() {
            return Err("sp.entityId is required".to_string());
        }

        if self.sp.assertion_consumer_service.url.is_empty() {
            return Err("sp.assertionConsumerService.url is required".to_string());
        }

        if self.idp.single_sign_on_service.url.is_empty() {
            return Err("idp.singleSignOnService.url is required".to_string());
        }

        if self.strict && self.idp.x509_cert.is_empty() {
            return Err("strict mode requires idp.x509cert".to_string());
        }

        Ok(())
    }
}
