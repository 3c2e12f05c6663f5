/// Errors produced by the `libris-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A catalog page size of zero was requested.
    #[error("invalid page size {size}: must be at least 1")]
    InvalidPageSize { size: u32 },

    /// A borrow was requested for zero days.
    #[error("invalid loan length {days}: must be at least 1 day")]
    InvalidLoanLength { days: u32 },

    /// A borrowing status string did not match any known status.
    #[error("unknown borrowing status '{value}': expected ACTIVE, RETURNED or OVERDUE")]
    UnknownStatus { value: String },
}
