//! Login sequencer: connect, nonce, sign, authorize.
//!
//! | Step        | Guard                                   | Writes                  |
//! |-------------|-----------------------------------------|-------------------------|
//! | `connect`   | wallet attached                         | `address`               |
//! | `fetch_nonce` | none                                  | `nonce` (new cycle)     |
//! | `sign_in`   | `address`, `nonce`, non-empty SIWE text | `message`, `signature`  |
//! | `authorize` | `message`, `signature`, TTL > 0         | `access_token`          |
//!
//! A step whose guard fails returns [`Kind::Precondition`](crate::error::Kind)
//! before any I/O. A step that fails for any reason leaves the session as it
//! was.

use chrono::{DateTime, Utc};
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;

use crate::client::Client;
use crate::error::Error;
use crate::extract::ACCESS_TOKEN;
use crate::siwe::SiweMessage;
use crate::{Result, request_json, request_text};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequest<'body> {
    message: &'body str,
    signature: &'body str,
    ttl_in_seconds: u64,
}

#[expect(clippy::multiple_inherent_impl, reason = "Login steps live beside the types they use")]
impl Client {
    /// Asks the wallet for its accounts and records the signing address.
    pub async fn connect(&mut self) -> Result<&str> {
        let wallet = self.wallet()?;
        let accounts = wallet.request_accounts().await?;
        if accounts.is_empty() {
            return Err(Error::capability_unavailable());
        }
        let address = wallet.address().await?.to_checksum(None);

        #[cfg(feature = "tracing")]
        tracing::info!(%address, "wallet connected");

        Ok(self.session.address.insert(address).as_str())
    }

    /// Fetches a single-use nonce and starts a new login cycle.
    pub async fn fetch_nonce(&mut self) -> Result<&str> {
        let request = self
            .http
            .request(Method::GET, self.endpoint(&self.config().endpoints.nonce)?)
            .build()?;
        let nonce = request_text(&self.http, request, None)
            .await?
            .trim()
            .to_owned();
        if nonce.is_empty() {
            return Err(Error::missing_field("nonce endpoint returned an empty body"));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(%nonce, "nonce issued");

        self.session.begin_cycle(nonce);
        Ok(self.session.nonce.as_deref().unwrap_or_default())
    }

    /// Builds the SIWE message for the current address and nonce, stamped now.
    pub fn siwe_message(&self) -> Result<SiweMessage> {
        self.siwe_message_at(Utc::now())
    }

    /// Builds the SIWE message for the current address and nonce.
    pub fn siwe_message_at(&self, issued_at: DateTime<Utc>) -> Result<SiweMessage> {
        let address = self.session.require_address()?;
        let nonce = self.session.require_nonce()?;
        let config = self.config();

        let message = SiweMessage::builder()
            .domain(config.domain.clone())
            .address(address)
            .statement(config.statement.clone())
            .uri(config.uri.clone())
            .chain_id(config.chain_id)
            .nonce(nonce)
            .issued_at(issued_at)
            .build();
        message.validate()?;

        Ok(message)
    }

    /// Signs a SIWE message issued now.
    pub async fn sign_in(&mut self) -> Result<&str> {
        self.sign_in_at(Utc::now()).await
    }

    /// Signs a SIWE message with a pinned `issued_at`.
    ///
    /// The stored message is the exact text handed to the wallet.
    pub async fn sign_in_at(&mut self, issued_at: DateTime<Utc>) -> Result<&str> {
        let message = self.siwe_message_at(issued_at)?.prepare();
        let signature = self.wallet()?.sign_message(&message).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%message, %signature, "SIWE message signed");

        self.session.message = Some(message);
        Ok(self.session.signature.insert(signature).as_str())
    }

    /// Exchanges the signed message for an access token with the configured TTL.
    pub async fn authorize(&mut self) -> Result<()> {
        self.authorize_with_ttl(self.config().ttl_in_seconds).await
    }

    /// Exchanges the signed message for an access token.
    pub async fn authorize_with_ttl(&mut self, ttl_in_seconds: u64) -> Result<()> {
        let message = self.session.require_message()?;
        let signature = self.session.require_signature()?;
        if ttl_in_seconds == 0 {
            return Err(Error::precondition("ttlInSeconds must be positive"));
        }

        let body = ChallengeRequest {
            message,
            signature,
            ttl_in_seconds,
        };
        let request = self
            .http
            .request(
                Method::POST,
                self.endpoint(&self.config().endpoints.challenge)?,
            )
            .json(&body)
            .build()?;
        let response = request_json(&self.http, request, None).await?;
        let token = ACCESS_TOKEN.require_str(&response)?;

        #[cfg(feature = "tracing")]
        tracing::info!(ttl_in_seconds, "authorized");

        self.session.access_token = Some(SecretString::from(token));
        Ok(())
    }
}
