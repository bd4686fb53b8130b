//! Same-origin proxy in front of the internal backend.
//!
//! Requests under the prefix are replayed against the backend with the
//! prefix removed. Only status and body text come back.

use http::Method;
use tracing::info;

use crate::config::{backend_url, PROXY_PREFIX};

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub prefix: String,
    pub backend: String,
}

impl ProxyConfig {
    pub fn new(prefix: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            backend: backend.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(PROXY_PREFIX, backend_url())
    }

    pub fn matches(&self, path: &str) -> bool {
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .map(|rest| rest.starts_with('/'))
                .unwrap_or(false)
    }

    /// Backend URL for an incoming path and raw query string.
    pub fn target_url(&self, path: &str, query: &str) -> String {
        let rewritten = path.replacen(self.prefix.as_str(), "", 1);
        if query.is_empty() {
            format!("{}{}", self.backend, rewritten)
        } else {
            format!("{}{}?{}", self.backend, rewritten, query)
        }
    }
}

pub fn is_forwarded_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::POST | Method::PUT)
}

/// Headers the outgoing client sets itself. `accept-encoding` stays behind
/// so the upstream answers in plain text.
pub fn is_forwarded_header(name: &str) -> bool {
    !["host", "content-length", "accept-encoding"]
        .iter()
        .any(|hop| name.eq_ignore_ascii_case(hop))
}

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedResponse {
    pub status: u16,
    pub body: String,
}

pub async fn forward(
    client: &reqwest::Client,
    config: &ProxyConfig,
    req: ProxyRequest,
) -> anyhow::Result<ProxiedResponse> {
    let target = config.target_url(&req.path, &req.query);

    let mut builder = client.request(req.method.clone(), &target);
    for (name, value) in req.headers {
        if is_forwarded_header(&name) {
            builder = builder.header(name, value);
        }
    }
    if req.method != Method::GET && req.method != Method::HEAD {
        builder = builder.body(req.body);
    }

    let resp = builder.send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    info!(method = %req.method, %target, status, "proxied");

    Ok(ProxiedResponse { status, body })
}
