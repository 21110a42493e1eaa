use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};

/// Broad category of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// A step ran before the step producing one of its inputs, or an input is empty/invalid.
    Precondition,
    /// An upstream answered with a non-success HTTP status.
    Status,
    /// No wallet capability was attached to the client.
    CapabilityUnavailable,
    /// The wallet is attached but failed to sign.
    Signing,
    /// The upstream could not be reached.
    Transport,
    /// Malformed configuration or caller input.
    Validation,
    /// The upstream answered successfully but the payload lacked an expected field.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    /// The upstream status code when this is a [`Kind::Status`] error.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.downcast_ref::<Status>().map(|s| s.status_code)
    }

    pub fn precondition<S: Into<String>>(reason: S) -> Self {
        Precondition {
            reason: reason.into(),
        }
        .into()
    }

    pub fn missing<S: Into<String>>(field: &'static str, hint: S) -> Self {
        Self::precondition(format!("{field} is not set: {}", hint.into()))
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Validation {
            reason: reason.into(),
        }
        .into()
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    #[must_use]
    pub fn capability_unavailable() -> Self {
        Self {
            kind: Kind::CapabilityUnavailable,
            source: Some(Box::new(CapabilityUnavailable)),
        }
    }

    pub fn missing_field<S: Into<String>>(reason: S) -> Self {
        Self::with_source(
            Kind::Internal,
            MissingField {
                reason: reason.into(),
            },
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {src}", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Precondition {
    pub reason: String,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precondition failed: {}", self.reason)
    }
}

impl StdError for Precondition {}

impl From<Precondition> for Error {
    fn from(err: Precondition) -> Self {
        Error::with_source(Kind::Precondition, err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CapabilityUnavailable;

impl fmt::Display for CapabilityUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no wallet attached; install or inject a compatible wallet")
    }
}

impl StdError for CapabilityUnavailable {}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MissingField {
    pub reason: String,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl StdError for MissingField {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::with_source(Kind::Internal, e)
        } else if e.is_builder() {
            Error::with_source(Kind::Validation, e)
        } else {
            Error::with_source(Kind::Transport, e)
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<alloy::signers::Error> for Error {
    fn from(e: alloy::signers::Error) -> Self {
        Error::with_source(Kind::Signing, e)
    }
}
