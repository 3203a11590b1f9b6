//! Shared test doubles for the login flow.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::FlowError;
use crate::host::{AuthService, LoginHandler, SessionOutcome, UserDirectory};
use crate::request::{AuthRequest, ToolkitParams};
use crate::saml::{AssertionResult, SamlToolkit};

/// Canned SAML toolkit.
pub struct StubToolkit {
    result: Option<AssertionResult>,
    validations: AtomicUsize,
}

impl StubToolkit {
    /// Toolkit that authenticates every response with the given identities.
    pub fn authenticated(name_id: Option<&str>, username: Option<&str>) -> Self {
        let mut result = AssertionResult {
            authenticated: true,
            ..AssertionResult::default()
        };
        result.name_id = name_id.map(str::to_string);
        if let Some(username) = username {
            result
                .attributes
                .insert("username".to_string(), vec![username.to_string()]);
        }
        Self::with_result(Some(result))
    }

    /// Toolkit that reports the given protocol errors.
    pub fn rejected(errors: Vec<String>) -> Self {
        Self::with_result(Some(AssertionResult {
            errors,
            ..AssertionResult::default()
        }))
    }

    /// Toolkit that processes the response but does not authenticate it.
    pub fn unauthenticated() -> Self {
        Self::with_result(Some(AssertionResult::default()))
    }

    /// Toolkit that fails outside the protocol.
    pub fn faulty() -> Self {
        Self::with_result(None)
    }

    fn with_result(result: Option<AssertionResult>) -> Self {
        Self {
            result,
            validations: AtomicUsize::new(0),
        }
    }

    /// How many times `validate_and_extract` was called.
    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

impl SamlToolkit for StubToolkit {
    fn validate_and_extract(&self, _params: &ToolkitParams) -> Result<AssertionResult> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Some(result) => Ok(result.clone()),
            None => Err(anyhow!("toolkit state poisoned")),
        }
    }

    fn login_redirect_url(
        &self,
        _params: &ToolkitParams,
        relay_state: Option<&str>,
    ) -> Result<String> {
        let mut url = "http://idp.example.com/SSOService.php?SAMLRequest=stub".to_string();
        if let Some(state) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(state)));
        }
        Ok(url)
    }
}

/// Host auth service that records successful handoffs.
pub struct RecordingAuthService {
    users: HashSet<String>,
    logins: Mutex<Vec<String>>,
    optional_handler: Mutex<Option<Arc<dyn LoginHandler>>>,
    default_handler: Mutex<Option<Arc<dyn LoginHandler>>>,
}

impl RecordingAuthService {
    pub fn with_users<'a>(users: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            users: users.into_iter().map(str::to_string).collect(),
            logins: Mutex::new(Vec::new()),
            optional_handler: Mutex::new(None),
            default_handler: Mutex::new(None),
        }
    }

    /// Usernames handed off so far, in order.
    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }

    pub fn set_default_login_handler(&self, handler: Arc<dyn LoginHandler>) {
        *self.default_handler.lock().unwrap() = Some(handler);
    }

    /// The handler registered through `set_optional_login_handler`, if any.
    pub fn optional_login_handler(&self) -> Option<Arc<dyn LoginHandler>> {
        self.optional_handler.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthService for RecordingAuthService {
    fn user_map(&self) -> &dyn UserDirectory {
        &self.users
    }

    async fn handle_successful_login(
        &self,
        _request: &AuthRequest,
        username: &str,
    ) -> Result<SessionOutcome, FlowError> {
        self.logins.lock().unwrap().push(username.to_string());
        Ok(SessionOutcome::redirect("/")
            .with_cookie(format!("API_SESSION={username}; Path=/; HttpOnly")))
    }

    fn set_optional_login_handler(&self, handler: Arc<dyn LoginHandler>) {
        *self.optional_handler.lock().unwrap() = Some(handler);
    }

    fn default_login_handler(&self) -> Option<Arc<dyn LoginHandler>> {
        self.default_handler.lock().unwrap().clone()
    }
}

/// Login handler that redirects to a fixed location and counts calls.
pub struct StubLoginHandler {
    location: String,
    calls: AtomicUsize,
}

impl StubLoginHandler {
    pub fn redirecting_to(location: &str) -> Self {
        Self {
            location: location.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginHandler for StubLoginHandler {
    fn name(&self) -> &str {
        "Stub Login Handler"
    }

    async fn handle_login(&self, _request: &AuthRequest) -> Result<SessionOutcome, FlowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SessionOutcome::redirect(self.location.clone()))
    }

    async fn handle_login_redirect(
        &self,
        request: &AuthRequest,
    ) -> Result<SessionOutcome, FlowError> {
        self.handle_login(request).await
    }
}
