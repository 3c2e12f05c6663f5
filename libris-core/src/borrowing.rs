//! Borrowing records as the backend reports them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Book;
use crate::error::CoreError;
use crate::id::{BookId, RecordId, UserId};
use crate::status::{self, Classification};

/// Loan length the front-end asks for when none is given.
pub const DEFAULT_LOAN_DAYS: u32 = 30;

/// Lifecycle state of a loan, owned and advanced by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Active,
    Returned,
    Overdue,
}

impl BorrowStatus {
    /// Wire name used in JSON and in the `status` query filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BorrowStatus::Active => "ACTIVE",
            BorrowStatus::Returned => "RETURNED",
            BorrowStatus::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorrowStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(BorrowStatus::Active),
            "RETURNED" => Ok(BorrowStatus::Returned),
            "OVERDUE" => Ok(BorrowStatus::Overdue),
            _ => Err(CoreError::UnknownStatus { value: s.to_owned() }),
        }
    }
}

/// A single loan of one book to one user.
///
/// Dates are kept in their wire form; a malformed due date must still
/// deserialize so that it can be classified fail-safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrowed_date: String,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub status: BorrowStatus,
}

impl BorrowingRecord {
    /// Classifies this loan as of `now`.
    #[must_use]
    pub fn classify_at(&self, now: DateTime<Utc>) -> Classification {
        status::classify_raw(self.status, &self.due_date, now)
    }
}

/// A book joined with the caller's loan of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedBook {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed_date: String,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub status: BorrowStatus,
}

impl BorrowedBook {
    /// Classifies this loan as of `now`.
    #[must_use]
    pub fn classify_at(&self, now: DateTime<Utc>) -> Classification {
        status::classify_raw(self.status, &self.due_date, now)
    }

    /// Only active loans can be returned.
    #[must_use]
    pub fn is_returnable(&self) -> bool {
        self.status == BorrowStatus::Active
    }
}

/// Body of `POST /api/borrow/{bookId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub days_to_keep: u32,
}

impl BorrowRequest {
    /// Creates a request for a loan of `days`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidLoanLength`] if `days` is zero.
    pub fn new(days: u32) -> Result<Self, CoreError> {
        if days == 0 {
            return Err(CoreError::InvalidLoanLength { days });
        }
        Ok(Self { days_to_keep: days })
    }
}

impl Default for BorrowRequest {
    fn default() -> Self {
        Self { days_to_keep: DEFAULT_LOAN_DAYS }
    }
}
