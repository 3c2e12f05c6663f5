//! Axum router and the forwarding handler.

use std::{sync::Arc, time::Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            CONTENT_TYPE,
        },
        HeaderMap, HeaderValue, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::ContentTypePolicy,
    error::GatewayError,
    upstream::{carries_body, ForwardedRequest, Upstream},
};

// ── Shared state ─────────────────────────────────────────────────────────────

/// Immutable state shared by every handler invocation.
#[derive(Clone)]
pub struct GatewayState {
    upstream: Arc<dyn Upstream>,
    content_type: ContentTypePolicy,
}

impl GatewayState {
    /// Create state relaying through `upstream`.
    pub fn new(upstream: Arc<dyn Upstream>, content_type: ContentTypePolicy) -> Self {
        Self { upstream, content_type }
    }
}

// ── CORS ──────────────────────────────────────────────────────────────────────

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Client-Info, Apikey";

fn json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the gateway router.
///
/// Only `GET /health` is answered locally. Every other method on that path,
/// and every other path, goes to [`forward`]. The CORS headers are set on
/// every response, including errors.
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(forward))
        .fallback(forward)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: answers without contacting the backend.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

/// Any other request: relay it to the backend named by `?path=`.
///
/// Pre-flight `OPTIONS` requests are answered here with an empty `200`.
/// Failures are rendered as the `500` envelope by [`GatewayError`].
pub async fn forward(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let target = target_path(&uri);
    let span = tracing::info_span!(
        "forward",
        request_id = %Uuid::new_v4(),
        method = %method,
        target = target.as_deref().unwrap_or(""),
    );

    async move {
        let start = Instant::now();
        match relay(&state, method, target, &headers, body).await {
            Ok(response) => {
                tracing::info!(
                    status = response.status().as_u16(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "relayed"
                );
                response
            }
            Err(e) => {
                tracing::warn!(error = %e, elapsed_ms = start.elapsed().as_millis(), "forwarding failed");
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn relay(
    state: &GatewayState,
    method: Method,
    target: Option<String>,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    let raw = if carries_body(&method) {
        axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| GatewayError::Body(e.to_string()))?
    } else {
        bytes::Bytes::new()
    };

    let request = ForwardedRequest::from_parts(method, target, headers, &raw);
    let reply = state.upstream.forward(request).await?;

    let content_type = match state.content_type {
        ContentTypePolicy::ForceJson => json(),
        ContentTypePolicy::Passthrough => reply.content_type.unwrap_or_else(json),
    };
    Ok((reply.status, [(CONTENT_TYPE, content_type)], reply.body).into_response())
}

/// The first `path` query parameter, form-decoded.
fn target_path(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "path")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::{header::AUTHORIZATION, Request};
    use bytes::Bytes;
    use tower::ServiceExt;

    use super::*;
    use crate::upstream::UpstreamReply;

    /// Records every forwarded request and answers with a canned reply.
    struct RecordingUpstream {
        calls: Mutex<Vec<ForwardedRequest>>,
        status: StatusCode,
        body: &'static str,
        content_type: Option<&'static str>,
    }

    impl RecordingUpstream {
        fn replying(status: StatusCode, body: &'static str) -> Arc<Self> {
            Arc::new(Self { calls: Mutex::new(Vec::new()), status, body, content_type: None })
        }

        fn calls(&self) -> Vec<ForwardedRequest> {
            match self.calls.lock() {
                Ok(calls) => calls.clone(),
                Err(e) => panic!("recording lock poisoned: {e}"),
            }
        }
    }

    #[async_trait]
    impl Upstream for RecordingUpstream {
        async fn forward(&self, request: ForwardedRequest) -> Result<UpstreamReply, GatewayError> {
            match self.calls.lock() {
                Ok(mut calls) => calls.push(request),
                Err(e) => panic!("recording lock poisoned: {e}"),
            }
            Ok(UpstreamReply {
                status: self.status,
                content_type: self.content_type.map(HeaderValue::from_static),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    /// Fails every request the way an unreachable backend would.
    struct BrokenUpstream;

    #[async_trait]
    impl Upstream for BrokenUpstream {
        async fn forward(&self, request: ForwardedRequest) -> Result<UpstreamReply, GatewayError> {
            Err(GatewayError::InvalidTarget { url: request.target, reason: "empty host".to_owned() })
        }
    }

    fn router(upstream: Arc<dyn Upstream>) -> Router {
        create_router(GatewayState::new(upstream, ContentTypePolicy::ForceJson))
    }

    fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
        match Request::builder().method(method).uri(uri).body(body) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let resp = match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        (status, headers, bytes)
    }

    fn assert_cors(headers: &HeaderMap) {
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN), Some(&HeaderValue::from_static("*")));
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_METHODS),
            Some(&HeaderValue::from_static(CORS_ALLOW_METHODS))
        );
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_HEADERS),
            Some(&HeaderValue::from_static(CORS_ALLOW_HEADERS))
        );
    }

    #[tokio::test]
    async fn preflight_short_circuits_without_upstream_call() {
        let upstream = RecordingUpstream::replying(StatusCode::OK, "{}");
        let app = router(upstream.clone());
        let (status, headers, body) =
            send(app, request(Method::OPTIONS, "/?path=%2Fapi%2Fbooks", Body::empty())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty(), "pre-flight response must have no body");
        assert_cors(&headers);
        assert!(upstream.calls().is_empty(), "pre-flight must not reach the upstream");
    }

    #[tokio::test]
    async fn get_is_forwarded_without_body_and_reply_passed_through() {
        let upstream = RecordingUpstream::replying(StatusCode::NOT_FOUND, r#"{"success":false,"message":"nope"}"#);
        let app = router(upstream.clone());
        let (status, headers, body) =
            send(app, request(Method::GET, "/?path=%2Fapi%2Fbooks", Body::from("ignored"))).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "upstream status must be relayed");
        assert_eq!(&body[..], br#"{"success":false,"message":"nope"}"#);
        assert_eq!(headers.get(CONTENT_TYPE), Some(&json()));
        assert_cors(&headers);

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].target, "/api/books");
        assert!(calls[0].body.is_none());
    }

    #[tokio::test]
    async fn post_forwards_body_and_authorization_only() {
        let upstream = RecordingUpstream::replying(StatusCode::CREATED, "{}");
        let app = router(upstream.clone());
        let req = match Request::builder()
            .method(Method::POST)
            .uri("/?path=%2Fapi%2Fborrow%2F7")
            .header(AUTHORIZATION, "Bearer abc")
            .header("x-client-info", "web")
            .body(Body::from(r#"{"daysToKeep":30}"#))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let (status, _, _) = send(app, req).await;
        assert_eq!(status, StatusCode::CREATED);

        let calls = upstream.calls();
        assert_eq!(calls[0].target, "/api/borrow/7");
        assert_eq!(calls[0].body.as_deref(), Some(r#"{"daysToKeep":30}"#));
        assert_eq!(calls[0].authorization, Some(HeaderValue::from_static("Bearer abc")));
    }

    #[tokio::test]
    async fn nested_query_in_path_is_preserved() {
        let upstream = RecordingUpstream::replying(StatusCode::OK, "{}");
        let app = router(upstream.clone());
        send(
            app,
            request(Method::GET, "/?path=%2Fapi%2Fbooks%3Fpage%3D1%26size%3D12", Body::empty()),
        )
        .await;
        assert_eq!(upstream.calls()[0].target, "/api/books?page=1&size=12");
    }

    #[tokio::test]
    async fn forwarding_failure_yields_500_envelope_with_cors() {
        let app = router(Arc::new(BrokenUpstream));
        let (status, headers, body) =
            send(app, request(Method::DELETE, "/?path=%2Fapi%2Fbooks%2F3", Body::empty())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&headers);
        let json: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(json["success"], false);
        assert_eq!(json["statusCode"], 500);
        assert!(json["data"].is_null());
        assert!(json["message"].as_str().is_some_and(|m| m.contains("empty host")));
    }

    #[tokio::test]
    async fn passthrough_policy_relays_upstream_content_type() {
        let upstream = Arc::new(RecordingUpstream {
            calls: Mutex::new(Vec::new()),
            status: StatusCode::OK,
            body: "<html></html>",
            content_type: Some("text/html"),
        });
        let app = create_router(GatewayState::new(upstream, ContentTypePolicy::Passthrough));
        let (_, headers, _) = send(app, request(Method::GET, "/?path=%2F", Body::empty())).await;
        assert_eq!(headers.get(CONTENT_TYPE), Some(&HeaderValue::from_static("text/html")));
    }

    #[tokio::test]
    async fn gateway_liveness_is_answered_without_the_backend() {
        let upstream = RecordingUpstream::replying(StatusCode::OK, "{}");
        let (status, headers, bytes) =
            send(router(upstream.clone()), request(Method::GET, "/health", Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        let body: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "libris-gateway");
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn preflight_on_health_path_is_answered_like_any_other() {
        let upstream = RecordingUpstream::replying(StatusCode::OK, "{}");
        let (status, headers, body) = send(
            router(upstream.clone()),
            request(Method::OPTIONS, "/health?path=%2Fapi%2Fbooks", Body::empty()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&headers);
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn non_get_on_health_path_is_forwarded() {
        let upstream = RecordingUpstream::replying(StatusCode::CREATED, "{}");
        let (status, _, _) = send(
            router(upstream.clone()),
            request(Method::POST, "/health?path=%2Fapi%2Fbooks", Body::from(r#"{"title":"Emma"}"#)),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].target, "/api/books");
        assert_eq!(calls[0].body.as_deref(), Some(r#"{"title":"Emma"}"#));
    }

    #[test]
    fn target_path_decodes_first_path_parameter() {
        let uri: Uri = "/fn?x=1&path=%2Fapi%2Fuser%2Fprofile&path=%2Fother".parse().unwrap_or_default();
        assert_eq!(target_path(&uri).as_deref(), Some("/api/user/profile"));
        let bare: Uri = "/fn".parse().unwrap_or_default();
        assert_eq!(target_path(&bare), None);
    }
}
