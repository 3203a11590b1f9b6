//! Identity resolution over a validated assertion.
//!
//! Two identities come out of one assertion: the application username the
//! session is minted for, and the audit username recorded in the log trail.
//! The subject NameID wins the application username when present; the
//! `username` attribute is mandatory either way, since every successful login
//! must be attributable to an IdP-side identity.

use tracing::debug;

use crate::error::FlowError;
use crate::saml::AssertionResult;

/// Assertion attribute holding the IdP-side username.
pub const USERNAME_ATTRIBUTE: &str = "username";

/// The two usernames resolved from one assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Username the host mints the session for.
    pub application_username: String,
    /// IdP-side username recorded for auditing.
    pub audit_username: String,
}

/// Resolve the application and audit usernames from a validated assertion.
///
/// Only called once the toolkit has authenticated the response; nothing here
/// re-checks signatures or validity windows.
pub fn resolve_identity(result: &AssertionResult) -> Result<ResolvedIdentity, FlowError> {
    let audit_username = result.first_attribute(USERNAME_ATTRIBUTE);
    let application_username = result
        .name_id
        .as_deref()
        .filter(|n| !n.is_empty())
        .or(audit_username);

    debug!(
        username = application_username.unwrap_or(""),
        "identity provider provided application username"
    );
    debug!(
        username = audit_username.unwrap_or(""),
        "identity provider provided username attribute"
    );

    let audit_username = audit_username.ok_or(FlowError::MissingAuditIdentity)?;
    let application_username = application_username.ok_or(FlowError::NoUsernameProvided)?;

    Ok(ResolvedIdentity {
        application_username: application_username.to_string(),
        audit_username: audit_username.to_string(),
    })
}
