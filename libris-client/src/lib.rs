//! Typed client and terminal front-end for the libris library catalog.
//!
//! Talks to the library backend through the forwarding gateway. Signed-in
//! state is an explicit [`Session`] persisted by a [`SessionStore`].

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod error;
pub mod session;

pub use api::LibraryClient;
pub use auth::{AuthOutcome, Authenticator};
pub use error::ClientError;
pub use session::{Session, SessionStore};
