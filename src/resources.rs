//! Calls that spend the access token: cards, and the card-secrets provider.
//!
//! Every call checks the session for the credentials it needs before building
//! a request, and none of them retries.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::Value;

use crate::client::{Client, bearer, bearer_with_app_id};
use crate::config::Endpoints;
use crate::error::Error;
use crate::extract::{
    self, APP_SCOPED_TOKEN, CARD_ID, CARD_LIST, CARD_TOKEN, EPHEMERAL_EXPIRY, EPHEMERAL_TOKEN,
    PUBLIC_KEY,
};
use crate::{Result, request_json, request_text};

/// Short-lived token from the public card-secrets provider, as reported.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct EphemeralToken {
    pub token: SecretString,
    pub expires_at: Option<String>,
}

#[expect(clippy::multiple_inherent_impl, reason = "Card calls live beside their response types")]
impl Client {
    /// Lists the account's cards and remembers the first card's id and token.
    pub async fn list_cards(&mut self) -> Result<Vec<Value>> {
        let token = self.session.require_access_token()?;
        let request = self
            .http
            .request(Method::GET, self.endpoint(&self.config().endpoints.cards)?)
            .build()?;
        let response = request_json(&self.http, request, Some(bearer(token)?)).await?;

        let cards = extract::list(&response, &CARD_LIST)
            .cloned()
            .ok_or_else(|| Error::missing_field("cards response is not a list"))?;

        // Both are rewritten together so they always describe the same card.
        let first = cards.first();
        self.session.card_id = first.and_then(|card| CARD_ID.first_scalar(card));
        let card_token = first
            .and_then(|card| CARD_TOKEN.first_str(card))
            .map(str::to_owned);
        // A public key belongs to the card it was fetched for.
        if self.session.card_token != card_token {
            self.session.public_key = None;
        }
        self.session.card_token = card_token;

        #[cfg(feature = "tracing")]
        if first.is_none() {
            tracing::warn!("account has no cards");
        }

        Ok(cards)
    }

    /// Trades the access token for one scoped to the card-secrets provider.
    pub async fn exchange_app_token(&mut self) -> Result<()> {
        let token = self.session.require_access_token()?;
        let headers = bearer_with_app_id(token, self.app_id()?)?;
        let request = self
            .http
            .request(
                Method::POST,
                self.endpoint(&self.config().endpoints.app_token)?,
            )
            .build()?;
        let response = request_json(&self.http, request, Some(headers)).await?;
        let app_token = APP_SCOPED_TOKEN.require_str(&response)?;

        self.session.app_scoped_token = Some(SecretString::from(app_token));
        Ok(())
    }

    /// Fetches a short-lived token from the public provider. No credentials
    /// are sent and the expiry is not enforced locally.
    pub async fn fetch_ephemeral_token(&mut self) -> Result<EphemeralToken> {
        let request = self
            .http
            .request(
                Method::GET,
                self.endpoint(&self.config().endpoints.ephemeral_token)?,
            )
            .build()?;
        let response = request_json(&self.http, request, None).await?;
        let token = EPHEMERAL_TOKEN.require_str(&response)?;
        let expires_at = EPHEMERAL_EXPIRY.first_scalar(&response);

        self.session.ephemeral_token = Some(SecretString::from(token.clone()));
        self.session.ephemeral_expiry.clone_from(&expires_at);

        Ok(EphemeralToken {
            token: SecretString::from(token),
            expires_at,
        })
    }

    /// Fetches the public key of the remembered card.
    pub async fn fetch_public_key(&mut self) -> Result<&str> {
        let app_token = self.session.require_app_scoped_token()?;
        let card_token = self.session.require_card_token()?;
        let headers = bearer_with_app_id(app_token, self.app_id()?)?;
        let path = Endpoints::card_path(&self.config().endpoints.card_public_key, card_token);
        let request = self
            .http
            .request(Method::GET, self.endpoint(&path)?)
            .build()?;
        let body = request_text(&self.http, request, Some(headers)).await?;

        let public_key = parse_public_key(&body)?;
        Ok(self.session.public_key.insert(public_key).as_str())
    }

    /// Fetches the encrypted details of the remembered card.
    ///
    /// `encrypted_key` is the caller's session key, encrypted out-of-band with
    /// the card public key. The public key itself is not sent; it only has to
    /// have been fetched.
    pub async fn fetch_card_details(&self, encrypted_key: &str) -> Result<Value> {
        let app_token = self.session.require_app_scoped_token()?;
        let ephemeral_token = self.session.require_ephemeral_token()?;
        self.session.require_public_key()?;
        let card_token = self.session.require_card_token()?;
        if encrypted_key.is_empty() {
            return Err(Error::precondition("encrypted key must not be empty"));
        }

        let headers = bearer_with_app_id(app_token, self.app_id()?)?;
        let path = Endpoints::card_path(&self.config().endpoints.card_details, card_token);
        let request = self
            .http
            .request(Method::GET, self.endpoint(&path)?)
            .query(&[
                ("ephemeralToken", ephemeral_token),
                ("encryptedKey", encrypted_key),
            ])
            .build()?;

        request_json(&self.http, request, Some(headers)).await
    }
}

/// The key may come back as JSON (object or bare string) or as raw text.
fn parse_public_key(body: &str) -> Result<String> {
    let key = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(value @ Value::Object(_)) => PUBLIC_KEY.require_str(&value)?,
        _ => body.trim().to_owned(),
    };
    if key.is_empty() {
        return Err(Error::missing_field("public key response is empty"));
    }

    Ok(key)
}
