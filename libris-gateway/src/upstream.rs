//! Relaying a single request to the library backend.
//!
//! [`ForwardedRequest`] captures the parts of an inbound request that are
//! allowed through; [`Upstream`] sends it and hands back the raw reply.

use async_trait::async_trait;
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderValue, Method, StatusCode,
};
use bytes::Bytes;

use crate::GatewayError;

/// The subset of an inbound request that is relayed upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedRequest {
    pub method: Method,
    /// Backend path, possibly with its own query string, e.g. `/api/books?page=1`.
    pub target: String,
    /// The inbound `Authorization` header, unchanged.
    pub authorization: Option<HeaderValue>,
    /// Raw request text; `None` for GET/HEAD and for empty bodies.
    pub body: Option<String>,
}

impl ForwardedRequest {
    /// Builds the relayed request from inbound parts.
    ///
    /// Of all inbound headers only `Authorization` survives. The body is
    /// decoded lossily as UTF-8 and dropped for GET and HEAD or when empty.
    #[must_use]
    pub fn from_parts(method: Method, target: Option<String>, headers: &HeaderMap, body: &[u8]) -> Self {
        let body = if carries_body(&method) && !body.is_empty() {
            Some(String::from_utf8_lossy(body).into_owned())
        } else {
            None
        };
        Self {
            method,
            target: target.unwrap_or_default(),
            authorization: headers.get(AUTHORIZATION).cloned(),
            body,
        }
    }

    /// The upstream URL: `base` and the target path concatenated as text.
    #[must_use]
    pub fn upstream_url(&self, base: &str) -> String {
        format!("{base}{}", self.target)
    }
}

/// Whether requests with this method have their body relayed.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// A relayed upstream response, body untouched.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Sends forwarded requests to the backend.
///
/// Implementations hold no per-request state and must be usable from many
/// concurrent handlers.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Relays `request` and returns the upstream's status and body.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidTarget`] if the target URL cannot be
    /// built, or [`GatewayError::Upstream`] if the backend cannot be reached
    /// or its body cannot be read.
    async fn forward(&self, request: ForwardedRequest) -> Result<UpstreamReply, GatewayError>;
}

/// [`Upstream`] over HTTP(S) with a pooled `reqwest` client.
///
/// No timeout is configured: a backend that never answers holds the
/// corresponding inbound request open.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base: String,
}

impl HttpUpstream {
    /// Create an upstream relaying to `base`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Upstream`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base: base.into() })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(&self, request: ForwardedRequest) -> Result<UpstreamReply, GatewayError> {
        let url = request.upstream_url(&self.base);
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| GatewayError::InvalidTarget { url: url.clone(), reason: e.to_string() })?;

        let mut builder = self
            .client
            .request(request.method, parsed)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = request.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        tracing::debug!(%url, %status, bytes = body.len(), "upstream replied");

        Ok(UpstreamReply { status, content_type, body })
    }
}
