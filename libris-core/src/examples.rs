//! Fixture records shaped like real backend responses.
//!
//! Used by tests across the workspace and by the fuzz targets as seeds.

use crate::account::{Role, User};
use crate::borrowing::{BorrowStatus, BorrowedBook};
use crate::catalog::{Book, BooksPage};
use crate::id::{BookId, UserId};

/// Three catalog books; the last one has no copies left.
#[must_use]
pub fn example_books() -> Vec<Book> {
    vec![
        Book {
            id: BookId::new(1),
            title: "The Left Hand of Darkness".to_owned(),
            author: "Ursula K. Le Guin".to_owned(),
            isbn: "9780441478125".to_owned(),
            published_year: 1969,
            genre: Some("Science Fiction".to_owned()),
            description: None,
            total_copies: 4,
            available_copies: 2,
            cover_image: None,
        },
        Book {
            id: BookId::new(2),
            title: "Middlemarch".to_owned(),
            author: "George Eliot".to_owned(),
            isbn: "9780141439549".to_owned(),
            published_year: 1871,
            genre: Some("Classic".to_owned()),
            description: Some("A study of provincial life.".to_owned()),
            total_copies: 1,
            available_copies: 1,
            cover_image: None,
        },
        Book {
            id: BookId::new(3),
            title: "Structure and Interpretation of Computer Programs".to_owned(),
            author: "Harold Abelson".to_owned(),
            isbn: "9780262510875".to_owned(),
            published_year: 1985,
            genre: Some("Computing".to_owned()),
            description: None,
            total_copies: 2,
            available_copies: 0,
            cover_image: None,
        },
    ]
}

/// A single page holding [`example_books`].
#[must_use]
pub fn example_page() -> BooksPage {
    let content = example_books();
    let total_elements = content.len() as u64;
    BooksPage { content, total_pages: 1, current_page: 0, total_elements }
}

/// A regular member and an administrator.
#[must_use]
pub fn example_users() -> Vec<User> {
    vec![
        User {
            id: UserId::new(10),
            username: "reader".to_owned(),
            email: "reader@example.org".to_owned(),
            role: Role::User,
            created_at: None,
            borrowed_books_count: Some(1),
        },
        User {
            id: UserId::new(11),
            username: "librarian".to_owned(),
            email: "librarian@example.org".to_owned(),
            role: Role::Admin,
            created_at: None,
            borrowed_books_count: None,
        },
    ]
}

/// One loan per status, all against fixed calendar dates.
#[must_use]
pub fn example_loans() -> Vec<BorrowedBook> {
    let books = example_books();
    let loan = |book: &Book, due: &str, returned: Option<&str>, status| BorrowedBook {
        book: book.clone(),
        borrowed_date: "2024-03-01".to_owned(),
        due_date: due.to_owned(),
        return_date: returned.map(str::to_owned),
        status,
    };
    vec![
        loan(&books[0], "2024-03-31", None, BorrowStatus::Active),
        loan(&books[1], "2024-03-31", Some("2024-03-12"), BorrowStatus::Returned),
        loan(&books[2], "2024-03-08", None, BorrowStatus::Overdue),
    ]
}
