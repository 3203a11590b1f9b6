//! SAML toolkit seam, settings and the samael-backed adapter.

pub mod config;
pub mod provider;
pub mod toolkit;

pub use config::SamlSettings;
pub use provider::SamaelProvider;
pub use toolkit::{AssertionResult, SamlToolkit};
