//! Flow error taxonomy for the SAML login plugin.

use thiserror::Error;

/// Errors that can terminate a SAML login flow.
///
/// Every variant is caught at the flow boundary and collapsed into a uniform
/// redirect to the generic login page, so none of this detail reaches the
/// client. The server-side log severity depends on the variant.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The SAML toolkit reported one or more protocol errors (signature,
    /// format, replay, audience).
    #[error("error when processing SAML response: {0}")]
    Protocol(String),

    /// The toolkit processed the response but did not authenticate it.
    #[error("SAML response not authenticated")]
    NotAuthenticated,

    /// The assertion carried no `username` attribute. Every successful login
    /// must be attributable to a specific IdP-asserted identity, so this
    /// fails closed even when a NameID is present.
    #[error("no username attribute provided in SAML response; required for auditing")]
    MissingAuditIdentity,

    /// Neither a NameID nor a `username` attribute was present.
    #[error("no NameID or username attribute provided in SAML response")]
    NoUsernameProvided,

    /// The asserted application username is not a recognized application user.
    #[error("application username \"{0}\" not configured for login")]
    UnknownApplicationUser(String),

    /// A required host collaborator was not wired in. Startup defect, not a
    /// per-request condition.
    #[error("host service unavailable: {0}")]
    HostServiceUnavailable(&'static str),

    /// Unexpected fault (I/O, task join, toolkit panic).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FlowError {
    /// Whether this is an expected rejection (logged at warn) rather than a
    /// protocol, policy or wiring fault (logged at error).
    pub fn is_expected_rejection(&self) -> bool {
        matches!(
            self,
            FlowError::NotAuthenticated | FlowError::UnknownApplicationUser(_)
        )
    }
}
