//! Login dispatch: SSO redirect or credential fallback.

use crate::request::AuthRequest;

/// Form field carrying a fallback username.
pub const USERNAME_FIELD: &str = "username";

/// Form field carrying a fallback password.
pub const PASSWORD_FIELD: &str = "password";

/// Where an inbound login request is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// Send the requester to the identity provider.
    SsoRedirect,
    /// Hand the request to the host's credential-based login handler.
    Fallback,
}

/// Route a login request on the shape of its form body.
///
/// A request carrying a `username` or `password` field is a deliberate
/// credential login, even when the values are empty, and is never redirected
/// to the identity provider.
pub fn decide(request: &AuthRequest) -> LoginDecision {
    if request.form.contains_key(USERNAME_FIELD) || request.form.contains_key(PASSWORD_FIELD) {
        LoginDecision::Fallback
    } else {
        LoginDecision::SsoRedirect
    }
}
