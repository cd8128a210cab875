//! Retry eligibility for upstream calls.

use reqwest::StatusCode;

/// Why an attempt is being retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Status,
    Connection,
}

impl RetryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::Status => "status",
            RetryReason::Connection => "connection",
        }
    }
}

/// Decide whether an attempt outcome warrants another attempt.
///
/// Connection errors are always retryable; statuses only when listed.
pub fn is_retryable(
    status: Option<StatusCode>,
    connection_error: bool,
    forcelist: &[u16],
) -> Option<RetryReason> {
    if connection_error {
        return Some(RetryReason::Connection);
    }
    match status {
        Some(status) if forcelist.contains(&status.as_u16()) => Some(RetryReason::Status),
        _ => None,
    }
}
