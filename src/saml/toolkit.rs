//! The external SAML toolkit seam.
//!
//! Everything protocol-shaped lives behind this trait: XML parsing,
//! canonicalization, signature verification, replay and audience checks
//! belong to the implementation, never to the login flow.

use anyhow::Result;
use std::collections::HashMap;

use crate::request::ToolkitParams;

/// Outcome reported by the toolkit for one validation call.
///
/// Transient; one per validation call, never persisted.
#[derive(Debug, Clone, Default)]
pub struct AssertionResult {
    /// Whether the toolkit authenticated the assertion.
    pub authenticated: bool,

    /// Protocol errors, in the order the toolkit reported them. Empty on
    /// success.
    pub errors: Vec<String>,

    /// Toolkit-verified subject identifier (NameID).
    pub name_id: Option<String>,

    /// Assertion attributes as name to ordered values.
    pub attributes: HashMap<String, Vec<String>>,
}

impl AssertionResult {
    /// First value of an attribute, if present and non-empty.
    pub fn first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// External SAML toolkit interface.
///
/// Calls are synchronous CPU-bound XML work; the flow offloads them from the
/// async runtime.
pub trait SamlToolkit: Send + Sync {
    /// Validate an IdP callback and extract the subject and attributes.
    ///
    /// Protocol rejections are reported through [`AssertionResult::errors`];
    /// `Err` is reserved for faults outside the protocol (I/O, poisoned
    /// state).
    fn validate_and_extract(&self, params: &ToolkitParams) -> Result<AssertionResult>;

    /// Generate the IdP redirect URL for login initiation.
    fn login_redirect_url(
        &self,
        params: &ToolkitParams,
        relay_state: Option<&str>,
    ) -> Result<String>;
}
