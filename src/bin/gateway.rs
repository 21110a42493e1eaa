//! Gateway binary.
//!
//! Listens on `GATEWAY_LISTEN` (default `0.0.0.0:8080`), proxies `/api/`,
//! `/pse/` and `/pse-public/` to their upstream hosts and serves the demo UI
//! from `STATIC_ROOT` for every other path.
//!
//! # Environment variables
//!
//! | Variable          | Default                                 | Description                   |
//! |-------------------|-----------------------------------------|-------------------------------|
//! | `GATEWAY_LISTEN`  | `0.0.0.0:8080`                          | Address to listen on          |
//! | `STATIC_ROOT`     | `.`                                     | Directory served for the UI   |
//! | `API_HOST`        | `https://api.gnosispay.com`             | Upstream for `/api/`          |
//! | `PSE_HOST`        | `https://api-pse.gnosispay.com`         | Upstream for `/pse/`          |
//! | `PSE_PUBLIC_HOST` | `https://api-pse-public.gnosispay.com`  | Upstream for `/pse-public/`   |
//! | `RUST_LOG`        | `LOG_LEVEL`, then `info`                | Log filter (tracing-subscriber) |
//!
//! A `.env` file in the working directory is loaded first when present.

use anyhow::Context as _;
use clap::Parser as _;
use gnosis_pay_client::gateway::{self, Args, GatewayState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let routes = args.host_router().context("invalid route table")?;
    for entry in routes.entries() {
        tracing::info!(
            prefix = %entry.prefix,
            upstream = %entry.upstream,
            strip_prefix = entry.strip_prefix,
            "route registered"
        );
    }

    let http = gateway::upstream_client().context("failed to build upstream HTTP client")?;
    let state = GatewayState::new(routes, http, args.static_root.clone());

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    tracing::info!(
        listen = %args.listen,
        static_root = %args.static_root.display(),
        "gateway listening"
    );
    axum::serve(listener, gateway::router(state))
        .await
        .context("server error")?;

    Ok(())
}
