use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use libris_core::{BorrowStatus, DEFAULT_LOAN_DAYS, DEFAULT_PAGE_SIZE};

use crate::api::DEFAULT_GATEWAY_URL;

#[derive(Parser, Debug)]
#[command(name = "libris", version, about = "Browse, borrow and administer the libris library catalog")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "LIBRIS_GATEWAY_URL",
        default_value = DEFAULT_GATEWAY_URL,
        help = "Gateway URL that relays requests to the library backend"
    )]
    pub gateway: String,
    #[arg(long, global = true, env = "LIBRIS_SESSION_FILE", help = "Where the sign-in token is kept")]
    pub session: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Login {
        username: String,
        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        username: String,
        email: String,
        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Books {
        #[command(subcommand)]
        command: BookCommands,
    },
    Borrow {
        id: i64,
        #[arg(long, default_value_t = DEFAULT_LOAN_DAYS)]
        days: u32,
    },
    Return {
        id: i64,
    },
    Borrowed {
        #[arg(long, help = "ACTIVE, RETURNED or OVERDUE")]
        status: Option<BorrowStatus>,
    },
    Profile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookCommands {
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Add(BookFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: BookFields,
    },
    Delete {
        id: i64,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

impl Commands {
    /// Whether a stored token should be re-validated before running.
    ///
    /// Sign-in, registration and sign-out manage the session themselves.
    #[must_use]
    pub fn needs_session(&self) -> bool {
        !matches!(self, Self::Login { .. } | Self::Register { .. } | Self::Logout)
    }
}

/// Catalog fields; all optional so the same set serves add and update.
#[derive(Args, Debug, Default)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub copies: Option<u32>,
    #[arg(long)]
    pub cover: Option<String>,
}
