//! samael-backed implementation of the SAML toolkit seam.
//!
//! Handles the SP side of the flow: AuthnRequest generation for the redirect
//! binding and validation of the IdP's POSTed response. Signature
//! cryptography, canonicalization and replay tracking stay inside the
//! toolkit layer; the login flow never sees XML.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::config::SamlSettings;
use super::toolkit::{AssertionResult, SamlToolkit};
use crate::request::ToolkitParams;

/// Form field carrying the base64 protocol message on the IdP callback.
pub const SAML_RESPONSE_FIELD: &str = "SAMLResponse";

const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// SAML service provider backed by the samael toolkit.
pub struct SamaelProvider {
    settings: SamlSettings,
    replay: ReplayCache,
}

/// Assertion IDs already accepted, kept until their validity window closes.
#[derive(Default)]
struct ReplayCache {
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ReplayCache {
    /// Record an assertion ID. Returns false if the ID was already recorded
    /// and has not yet aged out of its validity window.
    fn mark_used(&self, id: &str, retain_until: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|p| p.into_inner());
        seen.retain(|_, expiry| *expiry > now);
        if seen.contains_key(id) {
            return false;
        }
        seen.insert(id.to_string(), retain_until);
        true
    }
}

impl SamaelProvider {
    /// Create a provider from validated settings.
    pub fn new(settings: SamlSettings) -> Result<Self> {
        settings.validate().map_err(|e| anyhow!(e))?;
        Ok(Self {
            settings,
            replay: ReplayCache::default(),
        })
    }

    /// The settings this provider was built with.
    pub fn settings(&self) -> &SamlSettings {
        &self.settings
    }

    /// Build a SAML AuthnRequest document for the redirect binding.
    fn build_authn_request(&self) -> String {
        let request_id = format!("_id{}", uuid::Uuid::new_v4());
        let issue_instant = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        format!(
            r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
                xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
                ID="{}"
                Version="2.0"
                IssueInstant="{}"
                Destination="{}"
                AssertionConsumerServiceURL="{}">
                <saml:Issuer>{}</saml:Issuer>
            </samlp:AuthnRequest>"#,
            request_id,
            issue_instant,
            self.settings.idp.single_sign_on_service.url,
            self.settings.sp.assertion_consumer_service.url,
            self.settings.sp.entity_id
        )
    }

    /// Decode, parse and check a POSTed SAML response.
    ///
    /// Protocol rejections land in [`AssertionResult::errors`]; the subject
    /// and attributes are only extracted once every check has passed.
    fn process_response(&self, saml_response: &str) -> Result<AssertionResult> {
        let mut result = AssertionResult::default();

        let response_xml = BASE64
            .decode(saml_response.trim())
            .context("failed to decode SAMLResponse")?;
        let response_str =
            String::from_utf8(response_xml).context("SAML response is not valid UTF-8")?;

        let response: samael::schema::Response = match response_str.parse() {
            Ok(response) => response,
            Err(e) => {
                result.errors.push(format!("failed to parse SAML response: {e}"));
                return Ok(result);
            }
        };

        // Status must be Success before anything else is trusted.
        match response.status {
            Some(ref status) => {
                if status.status_code.value.as_deref() != Some(STATUS_SUCCESS) {
                    let message = status
                        .status_message
                        .as_ref()
                        .and_then(|m| m.value.clone())
                        .unwrap_or_else(|| "unknown error".to_string());
                    result
                        .errors
                        .push(format!("IdP returned non-success status: {message}"));
                }
            }
            None => {
                result.errors.push("SAML response carries no status".to_string());
            }
        }

        let assertion = match response.assertion {
            Some(ref assertion) => assertion,
            None => {
                result
                    .errors
                    .push("SAML response contains no assertion".to_string());
                return Ok(result);
            }
        };

        // Validity window with clock skew tolerance.
        let now = Utc::now();
        let skew = Duration::seconds(self.settings.clock_skew_secs);
        if let Some(ref conditions) = assertion.conditions {
            if let Some(not_before) = conditions.not_before {
                if now < not_before - skew {
                    result.errors.push("SAML assertion not yet valid".to_string());
                }
            }
            if let Some(not_on_or_after) = conditions.not_on_or_after {
                if now >= not_on_or_after + skew {
                    result.errors.push("SAML assertion has expired".to_string());
                }
            }
        }

        if self.settings.strict {
            if let Some(ref destination) = response.destination {
                if destination != &self.settings.sp.assertion_consumer_service.url {
                    result.errors.push(format!(
                        "response destination {destination} does not match the assertion consumer endpoint"
                    ));
                }
            }
            if response.signature.is_none() && assertion.signature.is_none() {
                result
                    .errors
                    .push("unsigned SAML response rejected in strict mode".to_string());
            }
        }

        if !result.errors.is_empty() {
            return Ok(result);
        }

        // Assertions are one-shot: an ID seen before, inside its validity
        // window, is a replay.
        let retain_until = assertion
            .conditions
            .as_ref()
            .and_then(|c| c.not_on_or_after)
            .unwrap_or(now)
            + skew;
        if !self.replay.mark_used(&assertion.id, retain_until, now) {
            result
                .errors
                .push("SAML assertion has already been used".to_string());
            return Ok(result);
        }

        result.name_id = assertion
            .subject
            .as_ref()
            .and_then(|subject| subject.name_id.as_ref())
            .map(|name_id| name_id.value.trim().to_string())
            .filter(|value| !value.is_empty());

        if let Some(ref statements) = assertion.attribute_statements {
            for statement in statements {
                for attribute in &statement.attributes {
                    let name = match attribute.name {
                        Some(ref name) => name.clone(),
                        None => continue,
                    };
                    let values: Vec<String> = attribute
                        .values
                        .iter()
                        .filter_map(|v| v.value.as_deref())
                        .map(|v| v.trim().to_string())
                        .collect();
                    if !values.is_empty() {
                        result.attributes.insert(name, values);
                    }
                }
            }
        }

        result.authenticated = true;

        debug!(
            name_id = ?result.name_id,
            attributes = result.attributes.len(),
            "SAML assertion validated"
        );

        Ok(result)
    }
}

impl SamlToolkit for SamaelProvider {
    fn validate_and_extract(&self, params: &ToolkitParams) -> Result<AssertionResult> {
        debug!(
            host = %params.http_host,
            path = %params.script_name,
            "processing SAML response"
        );

        match params.post_value(SAML_RESPONSE_FIELD) {
            Some(saml_response) => self.process_response(saml_response),
            None => Ok(AssertionResult {
                errors: vec!["request carries no SAMLResponse field".to_string()],
                ..AssertionResult::default()
            }),
        }
    }

    fn login_redirect_url(
        &self,
        _params: &ToolkitParams,
        relay_state: Option<&str>,
    ) -> Result<String> {
        let authn_request = self.build_authn_request();
        let encoded = deflate_and_encode(&authn_request)?;

        let mut url = format!(
            "{}?SAMLRequest={}",
            self.settings.idp.single_sign_on_service.url,
            urlencoding::encode(&encoded)
        );

        if let Some(state) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(state)));
        }

        debug!(url = %url, "created SAML AuthnRequest redirect");
        Ok(url)
    }
}

/// Deflate and base64 encode for the SAML redirect binding.
fn deflate_and_encode(xml: &str) -> Result<String> {
    use std::io::Write;

    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(xml.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(BASE64.encode(compressed))
}
