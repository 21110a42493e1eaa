use std::fmt;

use reqwest::Client as ReqwestClient;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

use crate::config::{APP_ID_HEADER, ClientConfig};
use crate::error::Error;
use crate::session::{LoginState, Session};
use crate::Result;
use crate::wallet::Wallet;

/// Gnosis Pay client: login sequencer, scoped-resource fetcher and
/// transaction paginator over one [`Session`].
///
/// Every step takes `&mut self`, so two steps can never write the session at
/// the same time.
pub struct Client {
    config: ClientConfig,
    pub(crate) http: ReqwestClient,
    pub(crate) wallet: Option<Box<dyn Wallet>>,
    pub(crate) session: Session,
}

impl Client {
    /// Creates a client with no wallet attached.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_http_client(config, ReqwestClient::new())
    }

    /// Creates a client with a custom HTTP client, e.g. one with timeouts.
    pub fn with_http_client(config: ClientConfig, http: ReqwestClient) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            http,
            wallet: None,
            session: Session::new(),
        })
    }

    /// Attaches the signing capability used by `connect` and `sign_in`.
    #[must_use]
    pub fn with_wallet<W: Wallet + 'static>(mut self, wallet: W) -> Self {
        self.wallet = Some(Box::new(wallet));
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn state(&self) -> LoginState {
        self.session.state()
    }

    /// Drops every credential, including the connected address.
    pub fn logout(&mut self) {
        self.session = Session::new();
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.base.join(path)?)
    }

    pub(crate) fn app_id(&self) -> Result<&str> {
        self.config
            .app_id
            .as_deref()
            .ok_or_else(|| Error::missing("app id", "configure ClientConfig::app_id"))
    }

    pub(crate) fn wallet(&self) -> Result<&dyn Wallet> {
        self.wallet
            .as_deref()
            .ok_or_else(Error::capability_unavailable)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("wallet", &self.wallet.is_some())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

pub(crate) fn bearer(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| Error::validation(format!("token is not a valid header value: {e}")))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

pub(crate) fn bearer_with_app_id(token: &str, app_id: &str) -> Result<HeaderMap> {
    let mut headers = bearer(token)?;
    let value = HeaderValue::from_str(app_id)
        .map_err(|e| Error::validation(format!("app id is not a valid header value: {e}")))?;
    headers.insert(APP_ID_HEADER, value);
    Ok(headers)
}
