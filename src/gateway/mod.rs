//! Development gateway between the browser and the Gnosis Pay hosts.
//!
//! Every request whose path starts with a registered prefix is forwarded
//! verbatim to that prefix's upstream ([`forward`]); everything else is served
//! from the static root ([`assets`]). The gateway keeps no per-request state.

pub mod assets;
pub mod config;
pub mod forward;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse as _, Response};
use reqwest::Client as ReqwestClient;

pub use config::Args;
pub use forward::upstream_client;
pub use routes::{HostRouter, RouteEntry};

#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct GatewayState {
    pub routes: Arc<HostRouter>,
    pub http: ReqwestClient,
    pub static_root: Arc<PathBuf>,
}

impl GatewayState {
    #[must_use]
    pub fn new(routes: HostRouter, http: ReqwestClient, static_root: PathBuf) -> Self {
        Self {
            routes: Arc::new(routes),
            http,
            static_root: Arc::new(static_root),
        }
    }
}

/// Build the axum router for the gateway.
pub fn router(state: GatewayState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

async fn handle_request(State(state): State<GatewayState>, request: Request) -> Response {
    let uri = request.uri().clone();

    let Some(entry) = state.routes.route(uri.path()) else {
        return assets::serve(&state.static_root, uri.path()).await;
    };

    match entry.target(uri.path(), uri.query()) {
        Ok(target) => forward::forward(&state.http, target, request).await,
        Err(e) => {
            tracing::warn!(path = uri.path(), error = %e, "cannot build upstream URL");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}
