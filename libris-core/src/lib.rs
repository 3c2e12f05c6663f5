//! Core types for the libris library catalog.
//!
//! Defines the catalog, account and borrowing records exchanged with the
//! backend, the response envelope wrapped around them, and the
//! classification that turns a loan into a display label and urgency.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod account;
pub mod borrowing;
pub mod catalog;
pub mod envelope;
pub mod error;
pub mod examples;
pub mod id;
pub mod status;

pub use account::{Credentials, LoginResponse, ProfileUpdate, Registration, Role, User};
pub use borrowing::{BorrowRequest, BorrowStatus, BorrowedBook, BorrowingRecord, DEFAULT_LOAN_DAYS};
pub use catalog::{Book, BookDraft, BookPatch, BookQuery, BooksPage, DEFAULT_PAGE_SIZE};
pub use envelope::{iso_timestamp, ApiResponse};
pub use error::CoreError;
pub use id::{BookId, RecordId, UserId};
pub use status::{classify, Classification, StatusLabel, Urgency};
