//! Error types for the client crate.

use std::path::PathBuf;

use libris_core::CoreError;

/// Errors that prevent a client operation from producing an envelope.
///
/// A backend answer with `success: false` is not an error: it is returned
/// as an [`ApiResponse`](libris_core::ApiResponse) so that its message can be
/// shown as-is.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The gateway URL could not be parsed.
    #[error("invalid gateway URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced a readable response.
    #[error("request for {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not a response envelope.
    #[error("unexpected response for {path} (HTTP {status}): {source}")]
    Decode {
        path: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// An authenticated command was run without a stored token.
    #[error("not signed in; run `libris login` first")]
    NotSignedIn,

    /// An administrator command was run by a regular user.
    #[error("this command requires an administrator account")]
    NotAdmin,

    /// A field required to add a book was not given.
    #[error("missing required option --{0}")]
    MissingField(&'static str),

    /// An update was requested without any field to change.
    #[error("nothing to update; pass at least one field")]
    NothingToUpdate,

    /// No location for the session file could be determined.
    #[error("no session file location; set LIBRIS_SESSION_FILE or HOME")]
    NoSessionPath,

    /// The session file could not be read or written.
    #[error("session file {}: {source}", path.display())]
    SessionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session file exists but does not hold a session.
    #[error("session file {} is corrupt: {source}", path.display())]
    SessionFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Local validation of a request failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}
