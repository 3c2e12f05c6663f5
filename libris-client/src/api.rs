//! Typed calls to the library backend, routed through the gateway.
//!
//! Every backend path is passed to the gateway as its percent-encoded
//! `path` query parameter. Responses are decoded as [`ApiResponse`]
//! envelopes whatever their HTTP status, since the backend reports
//! rejections inside the envelope.

use libris_core::{
    ApiResponse, Book, BookDraft, BookId, BookPatch, BookQuery, BooksPage, BorrowRequest, BorrowStatus,
    BorrowedBook, BorrowingRecord, Credentials, LoginResponse, ProfileUpdate, Registration, User,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{ClientError, Session};

/// Gateway address used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3456";

/// Client for the backend endpoints the front-end consumes.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl LibraryClient {
    /// Create a client talking to the gateway at `gateway_url`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] if `gateway_url` is not an
    /// absolute URL, or [`ClientError::Transport`] if the HTTP client cannot
    /// be initialised.
    pub fn new(gateway_url: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(gateway_url)
            .map_err(|e| ClientError::InvalidUrl { url: gateway_url.to_owned(), reason: e.to_string() })?;
        if endpoint.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: gateway_url.to_owned(),
                reason: "not a hierarchical URL".to_owned(),
            });
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|source| ClientError::Transport { path: String::new(), source })?;
        Ok(Self { http, endpoint })
    }

    /// The gateway URL that relays `path` to the backend.
    #[must_use]
    pub fn proxy_url(&self, path: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.query_pairs_mut().append_pair("path", path);
        url
    }

    // ── Auth ─────────────────────────────────────────────────────────────────

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn register(&self, registration: &Registration) -> Result<ApiResponse<User>, ClientError> {
        let path = "/api/auth/register";
        self.send(path, self.request(Method::POST, path).json(registration)).await
    }

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiResponse<LoginResponse>, ClientError> {
        let path = "/api/auth/login";
        self.send(path, self.request(Method::POST, path).json(credentials)).await
    }

    /// `GET /api/auth/validate`: checks the session's token.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn validate(&self, session: &Session) -> Result<ApiResponse<User>, ClientError> {
        let path = "/api/auth/validate";
        self.send(path, self.authorized(Method::GET, path, session)).await
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    /// `GET /api/books` with the query's filters.
    ///
    /// # Errors
    /// Returns [`ClientError::Core`] if the query is invalid, otherwise
    /// [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn list_books(&self, query: &BookQuery) -> Result<ApiResponse<BooksPage>, ClientError> {
        query.validate()?;
        let path = query.to_path();
        self.send(&path, self.request(Method::GET, &path)).await
    }

    /// `GET /api/books/{id}`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn get_book(&self, id: BookId) -> Result<ApiResponse<Book>, ClientError> {
        let path = format!("/api/books/{id}");
        self.send(&path, self.request(Method::GET, &path)).await
    }

    /// `POST /api/books`. Administrators only.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn create_book(&self, session: &Session, draft: &BookDraft) -> Result<ApiResponse<Book>, ClientError> {
        let path = "/api/books";
        self.send(path, self.authorized(Method::POST, path, session).json(draft)).await
    }

    /// `PUT /api/books/{id}`. Administrators only.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn update_book(
        &self,
        session: &Session,
        id: BookId,
        patch: &BookPatch,
    ) -> Result<ApiResponse<Book>, ClientError> {
        let path = format!("/api/books/{id}");
        self.send(&path, self.authorized(Method::PUT, &path, session).json(patch)).await
    }

    /// `DELETE /api/books/{id}`. Administrators only.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn delete_book(
        &self,
        session: &Session,
        id: BookId,
    ) -> Result<ApiResponse<serde_json::Value>, ClientError> {
        let path = format!("/api/books/{id}");
        self.send(&path, self.authorized(Method::DELETE, &path, session)).await
    }

    // ── Borrowing ────────────────────────────────────────────────────────────

    /// `POST /api/borrow/{bookId}`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn borrow_book(
        &self,
        session: &Session,
        id: BookId,
        request: BorrowRequest,
    ) -> Result<ApiResponse<BorrowingRecord>, ClientError> {
        let path = format!("/api/borrow/{id}");
        self.send(&path, self.authorized(Method::POST, &path, session).json(&request)).await
    }

    /// `POST /api/return/{bookId}`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn return_book(&self, session: &Session, id: BookId) -> Result<ApiResponse<BorrowingRecord>, ClientError> {
        let path = format!("/api/return/{id}");
        self.send(&path, self.authorized(Method::POST, &path, session)).await
    }

    /// `GET /api/user/borrowed-books`, optionally filtered by status.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn borrowed_books(
        &self,
        session: &Session,
        status: Option<BorrowStatus>,
    ) -> Result<ApiResponse<Vec<BorrowedBook>>, ClientError> {
        let path = borrowed_books_path(status);
        self.send(&path, self.authorized(Method::GET, &path, session)).await
    }

    // ── Profile ──────────────────────────────────────────────────────────────

    /// `GET /api/user/profile`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn profile(&self, session: &Session) -> Result<ApiResponse<User>, ClientError> {
        let path = "/api/user/profile";
        self.send(path, self.authorized(Method::GET, path, session)).await
    }

    /// `PUT /api/user/profile`.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] or [`ClientError::Decode`].
    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<ApiResponse<User>, ClientError> {
        let path = "/api/user/profile";
        self.send(path, self.authorized(Method::PUT, path, session).json(update)).await
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.proxy_url(path))
    }

    /// Like [`Self::request`], with the session's bearer token when it has one.
    fn authorized(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let builder = self.request(method, path);
        match session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let transport = |source| ClientError::Transport { path: path.to_owned(), source };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;

        tracing::debug!(path, status, bytes = body.len(), "backend replied");

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { path: path.to_owned(), status, source })
    }
}

/// Backend path of the borrowed-books listing.
#[must_use]
pub fn borrowed_books_path(status: Option<BorrowStatus>) -> String {
    match status {
        Some(status) => format!("/api/user/borrowed-books?status={status}"),
        None => "/api/user/borrowed-books".to_owned(),
    }
}
