//! Catalog records and the query used to page through them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::BookId;

/// Page size the catalog browser requests when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A book as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Book {
    /// Returns `true` while at least one copy can be borrowed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Short availability badge shown next to a book.
    #[must_use]
    pub fn availability_label(&self) -> &'static str {
        if self.is_available() {
            "Available"
        } else {
            "Out of Stock"
        }
    }
}

/// One page of the paginated catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooksPage {
    pub content: Vec<Book>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_elements: u64,
}

impl BooksPage {
    /// Returns `true` if a page follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page.saturating_add(1) < self.total_pages
    }
}

/// Fields an administrator supplies when adding a book.
///
/// The backend assigns the id and derives the available copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_copies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

/// A partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl BookPatch {
    /// Returns `true` if no field would be changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters and paging for `GET /api/books`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub genre: Option<String>,
    pub search: Option<String>,
}

impl BookQuery {
    /// An unfiltered query for the first page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the query before it is sent.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPageSize`] if a page size of zero was set.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.size {
            Some(0) => Err(CoreError::InvalidPageSize { size: 0 }),
            _ => Ok(()),
        }
    }

    /// Backend path including the form-encoded query string.
    ///
    /// Only the fields that are set are emitted, in `page`, `size`, `genre`,
    /// `search` order. Empty genre and search strings count as unset.
    #[must_use]
    pub fn to_path(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(size) = self.size {
            query.append_pair("size", &size.to_string());
        }
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.is_empty()) {
            query.append_pair("genre", genre);
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("search", search);
        }
        format!("/api/books?{}", query.finish())
    }
}
