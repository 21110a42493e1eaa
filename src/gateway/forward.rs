//! Verbatim request/response relay to an upstream host.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{self, HeaderName};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse as _, Response};
use reqwest::Client as ReqwestClient;
use url::Url;

/// Request headers never forwarded: the upstream would reject a Host or
/// Origin naming the gateway.
pub const STRIPPED_REQUEST_HEADERS: [HeaderName; 2] = [header::HOST, header::ORIGIN];

/// Upstream client for the gateway: redirects are relayed, never followed.
pub fn upstream_client() -> reqwest::Result<ReqwestClient> {
    ReqwestClient::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Forwards `request` to `target` and relays the answer.
///
/// Method, headers (minus [`STRIPPED_REQUEST_HEADERS`]) and, except for GET
/// and HEAD, the body stream go upstream unchanged. Status, headers and body
/// stream come back unchanged. An unreachable upstream yields an empty
/// `502 Bad Gateway`.
pub async fn forward(client: &ReqwestClient, target: Url, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;

    let mut headers = parts.headers;
    for name in &STRIPPED_REQUEST_HEADERS {
        headers.remove(name);
    }

    tracing::info!(%method, %target, "proxy request");

    let mut upstream = client
        .request(method.clone(), target.clone())
        .headers(headers);
    if !matches!(method, Method::GET | Method::HEAD) {
        upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    match upstream.send().await {
        Ok(response) => {
            tracing::info!(%method, %target, status = %response.status(), "proxy response");
            relay(response)
        }
        Err(e) => {
            tracing::warn!(%method, %target, error = %e, "upstream unreachable");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
