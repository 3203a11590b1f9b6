//! Login dispatch, identity resolution and the pluggable SAML handler.

pub mod dispatch;
pub mod handler;
pub mod resolve;

pub use dispatch::LoginDecision;
pub use handler::SamlLoginHandler;
pub use resolve::ResolvedIdentity;
