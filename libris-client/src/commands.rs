//! Execution and rendering of `libris` subcommands.

use chrono::{DateTime, Utc};
use libris_core::{
    status::parse_due_date, ApiResponse, Book, BookDraft, BookId, BookPatch, BookQuery, BorrowRequest,
    BorrowedBook, Classification, Credentials, ProfileUpdate, Registration, Urgency,
};
use serde::Serialize;

use crate::cli::{BookCommands, BookFields, Cli, Commands};
use crate::{Authenticator, ClientError, LibraryClient, Session, SessionStore};

/// Runs one command. Returns whether the backend accepted it.
///
/// # Errors
/// Returns a [`ClientError`] when the command could not be carried out at
/// all: bad configuration, unreachable gateway, missing sign-in, or an
/// unreadable session file.
pub async fn run(cli: Cli) -> Result<bool, ClientError> {
    let client = LibraryClient::new(&cli.gateway)?;
    let path = cli
        .session
        .clone()
        .or_else(SessionStore::default_path)
        .ok_or(ClientError::NoSessionPath)?;
    let store = SessionStore::new(path);
    let auth = Authenticator::new(&client, &store);
    let mut session = store.load()?;
    let out = Output { json: cli.json };

    if cli.command.needs_session() {
        auth.restore(&mut session).await?;
    }
    execute(&client, &auth, &mut session, &out, cli.command).await
}

async fn execute(
    client: &LibraryClient,
    auth: &Authenticator<'_>,
    session: &mut Session,
    out: &Output,
    command: Commands,
) -> Result<bool, ClientError> {
    match command {
        Commands::Login { username, password } => {
            let outcome = auth.sign_in(session, &Credentials { username, password }).await?;
            Ok(out.message(outcome.success, &outcome.message))
        }
        Commands::Register { username, email, password } => {
            let outcome = auth.sign_up(&Registration { username, email, password }).await;
            Ok(out.message(outcome.success, &outcome.message))
        }
        Commands::Logout => {
            auth.sign_out(session)?;
            Ok(out.message(true, "Signed out"))
        }
        Commands::Whoami => Ok(out.whoami(session)),
        Commands::Books { command } => books(client, session, out, command).await,
        Commands::Borrow { id, days } => {
            require_signed_in(session)?;
            let request = BorrowRequest::new(days)?;
            let resp = client.borrow_book(session, BookId::new(id), request).await?;
            Ok(out.envelope(&resp, |record| {
                format!("Book borrowed successfully! Due {}", format_date(&record.due_date))
            }))
        }
        Commands::Return { id } => {
            require_signed_in(session)?;
            let resp = client.return_book(session, BookId::new(id)).await?;
            Ok(out.envelope(&resp, |_| "Book returned successfully!".to_owned()))
        }
        Commands::Borrowed { status } => {
            require_signed_in(session)?;
            let resp = client.borrowed_books(session, status).await?;
            Ok(out.loans(&resp, Utc::now()))
        }
        Commands::Profile { email, password } => {
            require_signed_in(session)?;
            let update = ProfileUpdate { email, password };
            if update == ProfileUpdate::default() {
                let resp = client.profile(session).await?;
                Ok(out.envelope(&resp, |user| {
                    let mut text = format!("{} <{}> ({})", user.username, user.email, user.role);
                    if let Some(count) = user.borrowed_books_count {
                        text.push_str(&format!("\nBorrowed books: {count}"));
                    }
                    text
                }))
            } else {
                let resp = client.update_profile(session, &update).await?;
                Ok(out.envelope(&resp, |_| "Profile updated successfully!".to_owned()))
            }
        }
    }
}

async fn books(
    client: &LibraryClient,
    session: &Session,
    out: &Output,
    command: BookCommands,
) -> Result<bool, ClientError> {
    match command {
        BookCommands::List { page, size, genre, search } => {
            let query = BookQuery { page: Some(page), size: Some(size), genre, search };
            let resp = client.list_books(&query).await?;
            Ok(out.envelope(&resp, |page| {
                let mut lines: Vec<String> = page.content.iter().map(render_book_row).collect();
                if lines.is_empty() {
                    lines.push("No books found".to_owned());
                }
                lines.push(format!(
                    "Page {} of {} ({} books)",
                    page.current_page + 1,
                    page.total_pages.max(1),
                    page.total_elements
                ));
                lines.join("\n")
            }))
        }
        BookCommands::Show { id } => {
            let resp = client.get_book(BookId::new(id)).await?;
            Ok(out.envelope(&resp, render_book_detail))
        }
        BookCommands::Add(fields) => {
            require_admin(session)?;
            let draft = draft_from(fields)?;
            let resp = client.create_book(session, &draft).await?;
            Ok(out.envelope(&resp, |_| "Book added successfully!".to_owned()))
        }
        BookCommands::Update { id, fields } => {
            require_admin(session)?;
            let patch = patch_from(fields);
            if patch.is_empty() {
                return Err(ClientError::NothingToUpdate);
            }
            let resp = client.update_book(session, BookId::new(id), &patch).await?;
            Ok(out.envelope(&resp, |_| "Book updated successfully!".to_owned()))
        }
        BookCommands::Delete { id, yes } => {
            require_admin(session)?;
            if !yes {
                return Ok(out.message(false, &format!("Refusing to delete book {id} without --yes")));
            }
            let resp = client.delete_book(session, BookId::new(id)).await?;
            Ok(out.envelope(&resp, |_| "Book deleted successfully!".to_owned()))
        }
    }
}

fn require_signed_in(session: &Session) -> Result<(), ClientError> {
    if session.is_signed_in() {
        Ok(())
    } else {
        Err(ClientError::NotSignedIn)
    }
}

fn require_admin(session: &Session) -> Result<(), ClientError> {
    require_signed_in(session)?;
    if session.is_admin() {
        Ok(())
    } else {
        Err(ClientError::NotAdmin)
    }
}

/// Builds a new catalog entry; a copy count defaults to one.
///
/// # Errors
/// Returns [`ClientError::MissingField`] naming the first absent required option.
pub fn draft_from(fields: BookFields) -> Result<BookDraft, ClientError> {
    Ok(BookDraft {
        title: fields.title.ok_or(ClientError::MissingField("title"))?,
        author: fields.author.ok_or(ClientError::MissingField("author"))?,
        isbn: fields.isbn.ok_or(ClientError::MissingField("isbn"))?,
        published_year: fields.year.ok_or(ClientError::MissingField("year"))?,
        genre: fields.genre,
        description: fields.description,
        total_copies: fields.copies.unwrap_or(1),
        cover_image: fields.cover,
    })
}

#[must_use]
pub fn patch_from(fields: BookFields) -> BookPatch {
    BookPatch {
        title: fields.title,
        author: fields.author,
        isbn: fields.isbn,
        published_year: fields.year,
        genre: fields.genre,
        description: fields.description,
        total_copies: fields.copies,
        cover_image: fields.cover,
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Where command results go: human text or raw JSON.
struct Output {
    json: bool,
}

impl Output {
    fn message(&self, success: bool, message: &str) -> bool {
        if self.json {
            self.print_json(&serde_json::json!({ "success": success, "message": message }));
        } else if success {
            println!("{message}");
        } else {
            eprintln!("Error: {message}");
        }
        success
    }

    /// Prints an envelope: the rendered payload on success, the backend's
    /// message otherwise.
    fn envelope<T: Serialize>(&self, resp: &ApiResponse<T>, render: impl FnOnce(&T) -> String) -> bool {
        if self.json {
            self.print_json(resp);
            return resp.success;
        }
        match (&resp.data, resp.success) {
            (Some(data), true) => println!("{}", render(data)),
            (None, true) => println!("{}", resp.message),
            (_, false) => eprintln!("Error: {}", resp.message),
        }
        resp.success
    }

    fn loans(&self, resp: &ApiResponse<Vec<BorrowedBook>>, now: DateTime<Utc>) -> bool {
        let loans = resp.data.as_deref().unwrap_or_default();
        if self.json {
            let views: Vec<LoanView<'_>> = loans
                .iter()
                .map(|loan| LoanView { loan, classification: loan.classify_at(now) })
                .collect();
            self.print_json(&serde_json::json!({
                "success": resp.success,
                "message": resp.message,
                "data": views,
            }));
            return resp.success;
        }
        if !resp.success {
            eprintln!("Error: {}", resp.message);
            return false;
        }
        if loans.is_empty() {
            println!("No borrowed books");
        }
        for loan in loans {
            println!("{}", render_loan(loan, now));
        }
        true
    }

    fn whoami(&self, session: &Session) -> bool {
        match (&session.user, self.json) {
            (Some(user), true) => self.print_json(user),
            (Some(user), false) => println!("{} <{}> ({})", user.username, user.email, user.role),
            (None, true) => self.print_json(&serde_json::Value::Null),
            (None, false) => println!("Not signed in"),
        }
        session.user.is_some()
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error: failed to encode output: {e}"),
        }
    }
}

/// A borrowed book with its classification, for JSON output.
#[derive(Serialize)]
struct LoanView<'a> {
    #[serde(flatten)]
    loan: &'a BorrowedBook,
    classification: Classification,
}

/// One catalog line: id, title, author, year, copies and availability.
#[must_use]
pub fn render_book_row(book: &Book) -> String {
    format!(
        "{:>5}  {:<40}  {:<24}  {:>4}  {}/{} {}",
        book.id,
        truncate(&book.title, 40),
        truncate(&book.author, 24),
        book.published_year,
        book.available_copies,
        book.total_copies,
        book.availability_label()
    )
}

/// Multi-line description of one book.
#[must_use]
pub fn render_book_detail(book: &Book) -> String {
    let mut lines = vec![
        format!("{} (#{})", book.title, book.id),
        format!("Author:    {}", book.author),
        format!("ISBN:      {}", book.isbn),
        format!("Published: {}", book.published_year),
    ];
    if let Some(genre) = &book.genre {
        lines.push(format!("Genre:     {genre}"));
    }
    lines.push(format!(
        "Copies:    {} of {} available ({})",
        book.available_copies,
        book.total_copies,
        book.availability_label()
    ));
    if let Some(description) = &book.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    lines.join("\n")
}

/// One borrowed-book line with its status label; critical loans end in `!`.
#[must_use]
pub fn render_loan(loan: &BorrowedBook, now: DateTime<Utc>) -> String {
    let classification = loan.classify_at(now);
    let mut line = format!(
        "{:>5}  {:<40}  borrowed {:<12}  due {:<12}  {}",
        loan.book.id,
        truncate(&loan.book.title, 40),
        format_date(&loan.borrowed_date),
        format_date(&loan.due_date),
        classification.label,
    );
    if let Some(returned) = &loan.return_date {
        line.push_str(&format!(" on {}", format_date(returned)));
    }
    if classification.urgency == Urgency::Critical {
        line.push_str(" !");
    }
    line
}

/// `Mar 5, 2024` for readable dates; anything else is shown as given.
#[must_use]
pub fn format_date(raw: &str) -> String {
    parse_due_date(raw).map_or_else(|| raw.to_owned(), |at| at.format("%b %-d, %Y").to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
