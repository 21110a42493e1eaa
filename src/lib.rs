//! Gnosis Pay Sign-In with Ethereum client and multi-host development gateway.
//!
//! The client half ([`Client`]) sequences the SIWE login against the auth
//! service, then chains the resulting bearer token into card, card-secret and
//! transaction calls. Every credential it produces lives in a [`Session`] owned
//! by the client.
//!
//! The gateway half ([`gateway`], behind the `gateway` feature) forwards
//! browser requests verbatim to one of several upstream hosts picked by path
//! prefix, and serves the demo UI for everything else.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
#[cfg(feature = "gateway")]
pub mod gateway;
pub mod login;
pub mod pagination;
pub mod resources;
pub mod session;
pub mod siwe;
pub mod wallet;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Request, Response};
use serde_json::Value;

pub use client::Client;
pub use config::{ClientConfig, Endpoints};
pub use error::Error;
pub use session::Session;

pub type Result<T> = std::result::Result<T, Error>;

pub type ChainId = u64;

/// Gnosis Chain.
pub const GNOSIS: ChainId = 100;

/// Sends `request` and fails with [`error::Kind::Status`] on any non-success answer.
pub(crate) async fn send(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(%method, %path, "sending request");

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::debug!(%method, %path, status = %status_code, "received response");

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::status(status_code, method, path, message));
    }

    Ok(response)
}

/// Sends `request` and decodes the body as untyped JSON.
pub(crate) async fn request_json(
    client: &ReqwestClient,
    request: Request,
    headers: Option<HeaderMap>,
) -> Result<Value> {
    let response = send(client, request, headers).await?;
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_slice(&bytes)?)
}

/// Sends `request` and returns the body as text.
pub(crate) async fn request_text(
    client: &ReqwestClient,
    request: Request,
    headers: Option<HeaderMap>,
) -> Result<String> {
    let response = send(client, request, headers).await?;
    Ok(response.text().await?)
}
