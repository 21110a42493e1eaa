use bon::Builder;
use url::Url;

use crate::error::Error;
use crate::pagination::DEFAULT_PAGE_LIMIT;
use crate::{ChainId, GNOSIS, Result};

pub const DEFAULT_DOMAIN: &str = "something.com";
pub const DEFAULT_URI: &str = "https://something.com/";
pub const DEFAULT_STATEMENT: &str = "Sign in with Ethereum to Gnosis Pay";
pub const DEFAULT_TTL_IN_SECONDS: u64 = 36_000;

/// Header carrying the application identifier on secondary-provider calls.
pub const APP_ID_HEADER: &str = "x-app-id";

/// Upstream paths, resolved against [`ClientConfig::base`].
///
/// Paths under `/pse/` and `/pse-public/` only work when `base` points at the
/// gateway, which strips those prefixes before forwarding.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoints {
    pub nonce: String,
    pub challenge: String,
    pub cards: String,
    pub transactions: String,
    pub app_token: String,
    pub ephemeral_token: String,
    /// Contains a `{cardToken}` placeholder.
    pub card_public_key: String,
    /// Contains a `{cardToken}` placeholder.
    pub card_details: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nonce: "/api/v1/auth/nonce".to_owned(),
            challenge: "/api/v1/auth/challenge".to_owned(),
            cards: "/api/v1/cards".to_owned(),
            transactions: "/api/v1/cards/transactions".to_owned(),
            app_token: "/pse/api/v1/auth/token".to_owned(),
            ephemeral_token: "/pse-public/api/v1/ephemeral-token".to_owned(),
            card_public_key: "/pse/api/v1/cards/{cardToken}/public-key".to_owned(),
            card_details: "/pse/api/v1/cards/{cardToken}/details".to_owned(),
        }
    }
}

impl Endpoints {
    #[must_use]
    pub fn with_app_token<S: Into<String>>(mut self, path: S) -> Self {
        self.app_token = path.into();
        self
    }

    #[must_use]
    pub fn with_ephemeral_token<S: Into<String>>(mut self, path: S) -> Self {
        self.ephemeral_token = path.into();
        self
    }

    #[must_use]
    pub fn with_card_public_key<S: Into<String>>(mut self, template: S) -> Self {
        self.card_public_key = template.into();
        self
    }

    #[must_use]
    pub fn with_card_details<S: Into<String>>(mut self, template: S) -> Self {
        self.card_details = template.into();
        self
    }

    pub(crate) fn card_path(template: &str, card_token: &str) -> String {
        template.replace("{cardToken}", card_token)
    }
}

/// Client configuration.
#[non_exhaustive]
#[derive(Builder, Clone, Debug)]
#[builder(on(String, into))]
pub struct ClientConfig {
    /// Origin every endpoint path is joined onto, normally the gateway.
    pub base: Url,
    /// Application identifier sent to the secondary provider.
    pub app_id: Option<String>,
    #[builder(default = GNOSIS)]
    pub chain_id: ChainId,
    #[builder(default = DEFAULT_DOMAIN.to_owned())]
    pub domain: String,
    #[builder(default = DEFAULT_URI.to_owned())]
    pub uri: String,
    #[builder(default = DEFAULT_STATEMENT.to_owned())]
    pub statement: String,
    #[builder(default = DEFAULT_TTL_IN_SECONDS)]
    pub ttl_in_seconds: u64,
    #[builder(default = DEFAULT_PAGE_LIMIT)]
    pub page_limit: u32,
    #[builder(default)]
    pub endpoints: Endpoints,
}

impl ClientConfig {
    /// Defaults against `base`, e.g. `http://localhost:8080`.
    pub fn new(base: &str) -> Result<Self> {
        let config = Self::builder().base(Url::parse(base)?).build();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "base URL must be http or https, got {}",
                self.base.scheme()
            )));
        }
        if self.base.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "base URL {} cannot have paths joined onto it",
                self.base
            )));
        }
        if self.page_limit == 0 {
            return Err(Error::validation("page_limit must be positive"));
        }
        if self.app_id.as_deref().is_some_and(str::is_empty) {
            return Err(Error::validation("app_id must not be empty when set"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn defaults_follow_gnosis_pay() {
        let config = ClientConfig::new("http://localhost:8080").unwrap();

        assert_eq!(config.chain_id, 100);
        assert_eq!(config.domain, "something.com");
        assert_eq!(config.uri, "https://something.com/");
        assert_eq!(config.ttl_in_seconds, 36_000);
        assert_eq!(config.page_limit, 25);
        assert_eq!(config.endpoints.nonce, "/api/v1/auth/nonce");
        assert!(config.app_id.is_none());
    }

    #[test]
    fn rejects_zero_page_limit() {
        let config = ClientConfig::builder()
            .base(Url::parse("http://localhost:8080").unwrap())
            .page_limit(0)
            .build();

        assert_eq!(config.validate().unwrap_err().kind(), Kind::Validation);
    }

    #[test]
    fn rejects_non_http_base() {
        let err = ClientConfig::new("ftp://localhost").unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn card_path_fills_placeholder() {
        let endpoints = Endpoints::default();
        assert_eq!(
            Endpoints::card_path(&endpoints.card_details, "ct_1"),
            "/pse/api/v1/cards/ct_1/details"
        );
    }
}
