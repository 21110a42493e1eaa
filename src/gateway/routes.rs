//! Path-prefix routing table for the gateway.

use url::Url;

use crate::Result;
use crate::error::Error;

pub const DEFAULT_API_HOST: &str = "https://api.gnosispay.com";
pub const DEFAULT_PSE_HOST: &str = "https://api-pse.gnosispay.com";
pub const DEFAULT_PSE_PUBLIC_HOST: &str = "https://api-pse-public.gnosispay.com";

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteEntry {
    pub prefix: String,
    pub upstream: Url,
    pub strip_prefix: bool,
}

impl RouteEntry {
    /// `prefix` must start and end with `/`; `upstream` must be an http(s) origin.
    pub fn new<S: Into<String>>(prefix: S, upstream: Url, strip_prefix: bool) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(Error::validation(format!(
                "route prefix `{prefix}` must start and end with `/`"
            )));
        }
        if !matches!(upstream.scheme(), "http" | "https") || upstream.host().is_none() {
            return Err(Error::validation(format!(
                "upstream `{upstream}` for `{prefix}` must be an http(s) URL with a host"
            )));
        }

        Ok(Self {
            prefix,
            upstream,
            strip_prefix,
        })
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Upstream URL for `path`, which must match this entry.
    ///
    /// With `strip_prefix`, `/pse/api/v1/x` under `/pse/` becomes `/api/v1/x`.
    pub fn target(&self, path: &str, query: Option<&str>) -> Result<Url> {
        let path = if self.strip_prefix {
            // Keep the prefix's trailing slash as the new leading slash.
            let kept = self.prefix.trim_end_matches('/');
            path.strip_prefix(kept).unwrap_or(path)
        } else {
            path
        };

        let mut target = format!("{}{path}", self.upstream.as_str().trim_end_matches('/'));
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        Ok(Url::parse(&target)?)
    }
}

/// Prefix → upstream table, most specific prefix first.
#[derive(Clone, Debug, Default)]
pub struct HostRouter {
    entries: Vec<RouteEntry>,
}

impl HostRouter {
    pub fn new(mut entries: Vec<RouteEntry>) -> Result<Self> {
        entries.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
        if let Some(dup) = entries.windows(2).find(|w| w[0].prefix == w[1].prefix) {
            return Err(Error::validation(format!(
                "route prefix `{}` registered twice",
                dup[0].prefix
            )));
        }

        Ok(Self { entries })
    }

    /// The Gnosis Pay layout: the main API kept as-is, and the two
    /// card-secrets hosts with their prefix stripped.
    pub fn gnosis_pay(api: Url, pse: Url, pse_public: Url) -> Result<Self> {
        Self::new(vec![
            RouteEntry::new("/api/", api, false)?,
            RouteEntry::new("/pse/", pse, true)?,
            RouteEntry::new("/pse-public/", pse_public, true)?,
        ])
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// The entry forwarding `path`, or `None` for a static-asset request.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.matches(path))
    }
}
