//! Gateway command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::Result;
use crate::gateway::routes::{
    DEFAULT_API_HOST, DEFAULT_PSE_HOST, DEFAULT_PSE_PUBLIC_HOST, HostRouter,
};

/// Development gateway for the Gnosis Pay SIWE demo.
///
/// Proxies `/api/`, `/pse/` and `/pse-public/` to their upstream hosts and
/// serves every other path from the static root.
#[derive(Parser, Debug, Clone)]
#[command(name = "gateway")]
#[command(about = "Multi-host development gateway for the Gnosis Pay SIWE demo")]
#[non_exhaustive]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "GATEWAY_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Directory the demo UI is served from
    #[arg(long, env = "STATIC_ROOT", default_value = ".")]
    pub static_root: PathBuf,

    /// Upstream for `/api/` (path kept)
    #[arg(long, env = "API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: Url,

    /// Upstream for `/pse/` (prefix stripped)
    #[arg(long, env = "PSE_HOST", default_value = DEFAULT_PSE_HOST)]
    pub pse_host: Url,

    /// Upstream for `/pse-public/` (prefix stripped)
    #[arg(long, env = "PSE_PUBLIC_HOST", default_value = DEFAULT_PSE_PUBLIC_HOST)]
    pub pse_public_host: Url,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn host_router(&self) -> Result<HostRouter> {
        HostRouter::gnosis_pay(
            self.api_host.clone(),
            self.pse_host.clone(),
            self.pse_public_host.clone(),
        )
    }
}
