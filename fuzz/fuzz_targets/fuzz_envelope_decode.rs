//! Fuzz target: envelope decoding of backend replies.
//!
//! Arbitrary bytes are decoded as each payload shape the client expects.
//! Decoding may fail; it must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use libris_core::{ApiResponse, BooksPage, BorrowedBook, LoginResponse};

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<ApiResponse<BooksPage>>(data);
    let _ = serde_json::from_slice::<ApiResponse<LoginResponse>>(data);
    if let Ok(resp) = serde_json::from_slice::<ApiResponse<Vec<BorrowedBook>>>(data) {
        let now = chrono::Utc::now();
        for loan in resp.into_data().unwrap_or_default() {
            let _ = loan.classify_at(now).label.to_string();
        }
    }
});
