//! Stateless forwarding gateway for the libris library backend.
//!
//! Relays each request named by its `?path=` parameter to a fixed upstream,
//! passing only the `Authorization` header and the raw body, and returns the
//! upstream status and body unchanged behind permissive CORS headers.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
pub mod upstream;

pub use config::{ContentTypePolicy, GatewayConfig};
pub use error::GatewayError;
pub use routes::{create_router, GatewayState};
pub use upstream::{ForwardedRequest, HttpUpstream, Upstream, UpstreamReply};
