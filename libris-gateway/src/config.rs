//! Gateway configuration, read from flags with environment fallbacks.

use clap::Parser;

/// Address the gateway binds when none is configured.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3456";

/// Library backend the gateway relays to when none is configured.
pub const DEFAULT_UPSTREAM_URL: &str = "https://library-backend-glsk.onrender.com";

/// How the `Content-Type` of relayed responses is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypePolicy {
    /// Always `application/json`, whatever the upstream sent.
    #[default]
    ForceJson,
    /// Copy the upstream header; fall back to JSON when it is absent.
    Passthrough,
}

/// Runtime configuration of the forwarding gateway.
#[derive(Debug, Clone, Parser)]
#[command(name = "libris-gateway", version, about = "Forwarding gateway for the libris library backend")]
pub struct GatewayConfig {
    /// Socket address to listen on.
    #[arg(long = "listen", env = "LIBRIS_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Base URL of the library backend; request paths are appended verbatim.
    #[arg(
        long = "upstream",
        env = "LIBRIS_UPSTREAM_URL",
        default_value = DEFAULT_UPSTREAM_URL,
        value_parser = parse_upstream_base
    )]
    pub upstream_base: String,

    /// Relay the upstream `Content-Type` instead of forcing JSON.
    #[arg(long, env = "LIBRIS_PASS_CONTENT_TYPE")]
    pub pass_content_type: bool,
}

impl GatewayConfig {
    /// Configuration for `upstream_base` with every other setting defaulted.
    ///
    /// # Errors
    /// Returns a description of the problem if `upstream_base` is not an
    /// absolute `http` or `https` URL.
    pub fn for_upstream(upstream_base: &str) -> Result<Self, String> {
        Ok(Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            upstream_base: parse_upstream_base(upstream_base)?,
            pass_content_type: false,
        })
    }

    #[must_use]
    pub fn content_type_policy(&self) -> ContentTypePolicy {
        if self.pass_content_type {
            ContentTypePolicy::Passthrough
        } else {
            ContentTypePolicy::ForceJson
        }
    }
}

/// Validates an upstream base URL and strips trailing slashes so that
/// `base + "/api/..."` never produces a double slash.
fn parse_upstream_base(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = url::Url::parse(trimmed).map_err(|e| format!("invalid upstream URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(format!("unsupported upstream scheme '{other}'; expected http or https")),
    }
}
