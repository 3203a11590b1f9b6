//! Inbound request snapshot and its toolkit-shaped translation.

use std::collections::HashMap;

/// Multi-valued string mapping used for query and form parameters.
pub type ParamMap = HashMap<String, Vec<String>>;

/// Form field carrying the opaque return-to state across the IdP round trip.
pub const RELAY_STATE_FIELD: &str = "RelayState";

/// Immutable snapshot of an inbound authentication request.
///
/// Owned by the host's HTTP layer; the core only reads it. One snapshot per
/// inbound call.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// Request host, without scheme or port.
    pub http_host: String,
    /// Request path.
    pub script_name: String,
    /// Port the request arrived on.
    pub server_port: u16,
    /// Parsed query string.
    pub query: ParamMap,
    /// Parsed form-encoded POST body.
    pub form: ParamMap,
}

impl AuthRequest {
    pub fn new(
        http_host: impl Into<String>,
        script_name: impl Into<String>,
        server_port: u16,
    ) -> Self {
        Self {
            http_host: http_host.into(),
            script_name: script_name.into(),
            server_port,
            query: ParamMap::new(),
            form: ParamMap::new(),
        }
    }

    /// Add a form field, appending to any existing values for the key.
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Add a query parameter, appending to any existing values for the key.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value of a form field, if any.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// The relay state posted with this request, if any.
    pub fn relay_state(&self) -> Option<&str> {
        self.form_value(RELAY_STATE_FIELD)
    }

    /// Translate into the parameter shape the SAML toolkit expects.
    ///
    /// The query and form maps are copied, never aliased: the toolkit may
    /// treat them as consumable.
    pub fn toolkit_params(&self) -> ToolkitParams {
        ToolkitParams {
            http_host: self.http_host.clone(),
            script_name: self.script_name.clone(),
            server_port: self.server_port,
            get_data: self.query.clone(),
            post_data: self.form.clone(),
        }
    }
}

/// Parameter shape expected by the SAML toolkit.
#[derive(Debug, Clone)]
pub struct ToolkitParams {
    pub http_host: String,
    pub script_name: String,
    pub server_port: u16,
    pub get_data: ParamMap,
    pub post_data: ParamMap,
}

impl ToolkitParams {
    /// First value of a POSTed field, if any.
    pub fn post_value(&self, key: &str) -> Option<&str> {
        self.post_data
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}
