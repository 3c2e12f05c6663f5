//! Client flows end to end: `LibraryClient` → gateway → stub backend.
//!
//! The stub backend speaks the envelope format and checks bearer tokens, so
//! these tests cover path encoding through the gateway, auth propagation and
//! session persistence together.

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use libris_client::{Authenticator, ClientError, LibraryClient, Session, SessionStore};
use libris_core::{
    examples::{example_loans, example_page, example_users},
    ApiResponse, BookId, BookQuery, BorrowRequest, BorrowStatus, BorrowingRecord, Credentials, LoginResponse,
    Registration, StatusLabel,
};
use libris_gateway::{create_router, ContentTypePolicy, GatewayState, HttpUpstream};
use serde::Serialize;
use serde_json::Value;

const ADMIN_TOKEN: &str = "tok-admin";

fn envelope<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = ApiResponse {
        success: status.is_success(),
        message: message.to_owned(),
        data,
        status_code: status.as_u16(),
        timestamp: "2024-03-26T00:00:00".to_owned(),
    };
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    envelope::<()>(StatusCode::UNAUTHORIZED, "Unauthorized", None)
}

fn is_admin(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer tok-admin")
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "librarian" && body["password"] == "pw" {
        let login = LoginResponse { user: example_users().remove(1), token: ADMIN_TOKEN.to_owned() };
        envelope(StatusCode::OK, "Login successful", Some(login))
    } else {
        envelope::<()>(StatusCode::UNAUTHORIZED, "Invalid credentials", None)
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "librarian" {
        return envelope::<()>(StatusCode::CONFLICT, "Username already exists", None);
    }
    envelope(StatusCode::CREATED, "User registered", Some(example_users().remove(0)))
}

async fn validate(headers: HeaderMap) -> Response {
    if is_admin(&headers) {
        envelope(StatusCode::OK, "Token valid", Some(example_users().remove(1)))
    } else {
        unauthorized()
    }
}

async fn list_books(uri: Uri) -> Response {
    // The raw query is echoed back so tests can see what crossed the gateway.
    envelope(StatusCode::OK, uri.query().unwrap_or(""), Some(example_page()))
}

async fn borrow(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return unauthorized();
    }
    let record = BorrowingRecord {
        id: 500.into(),
        user_id: 11.into(),
        book_id: BookId::new(id),
        borrowed_date: "2024-03-26".to_owned(),
        due_date: "2024-04-25".to_owned(),
        return_date: None,
        status: BorrowStatus::Active,
    };
    let message = format!("daysToKeep={}", body["daysToKeep"]);
    envelope(StatusCode::CREATED, &message, Some(record))
}

#[derive(serde::Deserialize)]
struct StatusFilter {
    status: Option<BorrowStatus>,
}

async fn borrowed(headers: HeaderMap, Query(filter): Query<StatusFilter>) -> Response {
    if !is_admin(&headers) {
        return unauthorized();
    }
    let loans: Vec<_> = example_loans()
        .into_iter()
        .filter(|loan| filter.status.is_none_or(|s| s == loan.status))
        .collect();
    envelope(StatusCode::OK, "ok", Some(loans))
}

async fn delete_book(headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if !is_admin(&headers) {
        return unauthorized();
    }
    envelope::<()>(StatusCode::OK, "Book deleted", None)
}

async fn spawn(app: Router) -> String {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(l) => l,
        Err(e) => panic!("failed to bind: {e}"),
    };
    let addr = match listener.local_addr() {
        Ok(a) => a,
        Err(e) => panic!("no local addr: {e}"),
    };
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server stopped: {e}");
        }
    });
    format!("http://{addr}")
}

/// Start backend and gateway; return a client pointed at the gateway.
async fn client() -> LibraryClient {
    let backend = spawn(
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/validate", get(validate))
            .route("/api/books", get(list_books))
            .route("/api/books/{id}", delete(delete_book))
            .route("/api/borrow/{id}", post(borrow))
            .route("/api/user/borrowed-books", get(borrowed)),
    )
    .await;
    let upstream = match HttpUpstream::new(backend) {
        Ok(u) => u,
        Err(e) => panic!("upstream should build: {e}"),
    };
    let gateway = spawn(create_router(GatewayState::new(Arc::new(upstream), ContentTypePolicy::ForceJson))).await;
    match LibraryClient::new(&format!("{gateway}/functions/v1/library-api-proxy")) {
        Ok(c) => c,
        Err(e) => panic!("client should build: {e}"),
    }
}

fn temp_store() -> (tempfile::TempDir, SessionStore) {
    let dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("failed to create temp dir: {e}"),
    };
    let store = SessionStore::new(dir.path().join("session.json"));
    (dir, store)
}

fn admin_credentials() -> Credentials {
    Credentials { username: "librarian".to_owned(), password: "pw".to_owned() }
}

#[tokio::test]
async fn sign_in_persists_token_and_restore_confirms_it() {
    let client = client().await;
    let (_dir, store) = temp_store();
    let auth = Authenticator::new(&client, &store);
    let mut session = Session::default();

    let outcome = match auth.sign_in(&mut session, &admin_credentials()).await {
        Ok(o) => o,
        Err(e) => panic!("sign in failed: {e}"),
    };
    assert!(outcome.success);
    assert_eq!(outcome.message, "Login successful");
    assert_eq!(session.token(), Some(ADMIN_TOKEN));

    let mut reloaded = match store.load() {
        Ok(s) => s,
        Err(e) => panic!("load failed: {e}"),
    };
    reloaded.user = None;
    if let Err(e) = auth.restore(&mut reloaded).await {
        panic!("restore failed: {e}");
    }
    assert!(reloaded.is_admin(), "validate must re-establish the user");
}

#[tokio::test]
async fn rejected_sign_in_reports_backend_message_and_stores_nothing() {
    let client = client().await;
    let (_dir, store) = temp_store();
    let auth = Authenticator::new(&client, &store);
    let mut session = Session::default();

    let bad = Credentials { username: "librarian".to_owned(), password: "wrong".to_owned() };
    let outcome = match auth.sign_in(&mut session, &bad).await {
        Ok(o) => o,
        Err(e) => panic!("sign in errored: {e}"),
    };
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Invalid credentials");
    assert!(!session.is_signed_in());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn restore_with_rejected_token_clears_the_session() {
    let client = client().await;
    let (_dir, store) = temp_store();
    let auth = Authenticator::new(&client, &store);
    let mut session = Session { token: Some("expired".to_owned()), user: None };
    if let Err(e) = store.save(&session) {
        panic!("save failed: {e}");
    }

    if let Err(e) = auth.restore(&mut session).await {
        panic!("restore failed: {e}");
    }
    assert_eq!(session, Session::default());
    assert!(!store.path().exists(), "rejected token must be removed from storage");
}

#[tokio::test]
async fn sign_up_maps_outcomes_to_messages() {
    let client = client().await;
    let (_dir, store) = temp_store();
    let auth = Authenticator::new(&client, &store);

    let fresh = Registration {
        username: "reader".to_owned(),
        email: "reader@example.org".to_owned(),
        password: "pw".to_owned(),
    };
    let outcome = auth.sign_up(&fresh).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Registration successful. Please login.");

    let taken = Registration { username: "librarian".to_owned(), ..fresh };
    let outcome = auth.sign_up(&taken).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Username already exists");
}

#[tokio::test]
async fn catalog_query_survives_the_gateway_verbatim() {
    let client = client().await;
    let query = BookQuery {
        page: Some(0),
        size: Some(12),
        genre: Some("Science Fiction".to_owned()),
        search: None,
    };
    let resp = match client.list_books(&query).await {
        Ok(r) => r,
        Err(e) => panic!("list failed: {e}"),
    };
    assert!(resp.success);
    assert_eq!(resp.message, "page=0&size=12&genre=Science+Fiction");
    assert_eq!(resp.data.map(|page| page.content.len()), Some(3));
}

#[tokio::test]
async fn zero_page_size_fails_before_any_request() {
    let client = client().await;
    let query = BookQuery { size: Some(0), ..BookQuery::new() };
    assert!(matches!(client.list_books(&query).await, Err(ClientError::Core(_))));
}

#[tokio::test]
async fn borrow_carries_token_and_loan_length() {
    let client = client().await;
    let session = Session { token: Some(ADMIN_TOKEN.to_owned()), user: None };

    let request = match BorrowRequest::new(14) {
        Ok(r) => r,
        Err(e) => panic!("valid loan length rejected: {e}"),
    };
    let resp = match client.borrow_book(&session, BookId::new(2), request).await {
        Ok(r) => r,
        Err(e) => panic!("borrow failed: {e}"),
    };
    assert!(resp.success);
    assert_eq!(resp.status_code, 201);
    assert_eq!(resp.message, "daysToKeep=14");
    assert_eq!(resp.data.map(|r| r.book_id), Some(BookId::new(2)));

    let anonymous = Session::default();
    let resp = match client.borrow_book(&anonymous, BookId::new(2), BorrowRequest::default()).await {
        Ok(r) => r,
        Err(e) => panic!("borrow errored: {e}"),
    };
    assert!(!resp.success, "request without token must be rejected by the backend");
    assert_eq!(resp.status_code, 401);
}

#[tokio::test]
async fn borrowed_books_filter_and_classification() {
    let client = client().await;
    let session = Session { token: Some(ADMIN_TOKEN.to_owned()), user: None };

    let resp = match client.borrowed_books(&session, Some(BorrowStatus::Overdue)).await {
        Ok(r) => r,
        Err(e) => panic!("listing failed: {e}"),
    };
    let loans = resp.into_data().unwrap_or_default();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].classify_at(chrono::Utc::now()).label, StatusLabel::Overdue);
}

#[tokio::test]
async fn delete_decodes_null_payload() {
    let client = client().await;
    let session = Session { token: Some(ADMIN_TOKEN.to_owned()), user: None };
    let resp = match client.delete_book(&session, BookId::new(3)).await {
        Ok(r) => r,
        Err(e) => panic!("delete failed: {e}"),
    };
    assert!(resp.success);
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error_and_a_failed_login() {
    let listener = match std::net::TcpListener::bind("127.0.0.1:0") {
        Ok(l) => l,
        Err(e) => panic!("failed to reserve port: {e}"),
    };
    let addr = match listener.local_addr() {
        Ok(a) => a,
        Err(e) => panic!("no local addr: {e}"),
    };
    drop(listener);

    let client = match LibraryClient::new(&format!("http://{addr}/")) {
        Ok(c) => c,
        Err(e) => panic!("client should build: {e}"),
    };
    assert!(matches!(
        client.get_book(BookId::new(1)).await,
        Err(ClientError::Transport { .. })
    ));

    let (_dir, store) = temp_store();
    let auth = Authenticator::new(&client, &store);
    let mut session = Session::default();
    let outcome = match auth.sign_in(&mut session, &admin_credentials()).await {
        Ok(o) => o,
        Err(e) => panic!("sign in errored: {e}"),
    };
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Login failed. Please try again.");
}
