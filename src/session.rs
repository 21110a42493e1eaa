use secrecy::{ExposeSecret as _, SecretString};

use crate::Result;
use crate::error::Error;

/// Where the login sequence currently stands.
///
/// Derived from which credentials the [`Session`] holds, so it can never drift
/// from the data itself.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoginState {
    Disconnected,
    Connected,
    NonceIssued,
    Signed,
    Authorized,
}

/// Every credential and identifier produced by the login and resource calls.
///
/// Each field is written only by the step that owns it, and only when that
/// step succeeds. Tokens are kept as [`SecretString`] and redacted in `Debug`.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) address: Option<String>,
    pub(crate) nonce: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) signature: Option<String>,
    pub(crate) access_token: Option<SecretString>,
    pub(crate) card_id: Option<String>,
    pub(crate) card_token: Option<String>,
    pub(crate) app_scoped_token: Option<SecretString>,
    pub(crate) ephemeral_token: Option<SecretString>,
    pub(crate) ephemeral_expiry: Option<String>,
    pub(crate) public_key: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> LoginState {
        if self.access_token.is_some() {
            LoginState::Authorized
        } else if self.signature.is_some() {
            LoginState::Signed
        } else if self.nonce.is_some() {
            LoginState::NonceIssued
        } else if self.address.is_some() {
            LoginState::Connected
        } else {
            LoginState::Disconnected
        }
    }

    /// Starts a new login cycle: drops every credential except the connected
    /// wallet address.
    pub(crate) fn begin_cycle(&mut self, nonce: String) {
        let address = self.address.take();
        *self = Self {
            address,
            nonce: Some(nonce),
            ..Self::default()
        };
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    #[must_use]
    pub fn card_id(&self) -> Option<&str> {
        self.card_id.as_deref()
    }

    #[must_use]
    pub fn card_token(&self) -> Option<&str> {
        self.card_token.as_deref()
    }

    #[must_use]
    pub fn app_scoped_token(&self) -> Option<&SecretString> {
        self.app_scoped_token.as_ref()
    }

    #[must_use]
    pub fn ephemeral_token(&self) -> Option<&SecretString> {
        self.ephemeral_token.as_ref()
    }

    #[must_use]
    pub fn ephemeral_expiry(&self) -> Option<&str> {
        self.ephemeral_expiry.as_deref()
    }

    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub(crate) fn require_address(&self) -> Result<&str> {
        required(self.address.as_deref(), "address", "connect the wallet first")
    }

    pub(crate) fn require_nonce(&self) -> Result<&str> {
        required(self.nonce.as_deref(), "nonce", "fetch a nonce first")
    }

    pub(crate) fn require_message(&self) -> Result<&str> {
        required(self.message.as_deref(), "message", "sign the SIWE message first")
    }

    pub(crate) fn require_signature(&self) -> Result<&str> {
        required(
            self.signature.as_deref(),
            "signature",
            "sign the SIWE message first",
        )
    }

    pub(crate) fn require_access_token(&self) -> Result<&str> {
        required(
            self.access_token.as_ref().map(|t| t.expose_secret()),
            "access token",
            "authorize first",
        )
    }

    pub(crate) fn require_card_token(&self) -> Result<&str> {
        required(self.card_token.as_deref(), "card token", "list cards first")
    }

    pub(crate) fn require_app_scoped_token(&self) -> Result<&str> {
        required(
            self.app_scoped_token.as_ref().map(|t| t.expose_secret()),
            "app-scoped token",
            "exchange the access token for an app-scoped token first",
        )
    }

    pub(crate) fn require_ephemeral_token(&self) -> Result<&str> {
        required(
            self.ephemeral_token.as_ref().map(|t| t.expose_secret()),
            "ephemeral token",
            "fetch an ephemeral token first",
        )
    }

    pub(crate) fn require_public_key(&self) -> Result<&str> {
        required(
            self.public_key.as_deref(),
            "public key",
            "fetch the card public key first",
        )
    }
}

/// Empty strings count as missing: a step never sends a blank credential.
fn required<'session>(
    value: Option<&'session str>,
    field: &'static str,
    hint: &str,
) -> Result<&'session str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing(field, hint)),
    }
}
