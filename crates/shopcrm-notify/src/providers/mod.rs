//! HTTP notification providers.

pub mod sendgrid;
pub mod twilio;

pub use sendgrid::SendGridNotifier;
pub use twilio::TwilioNotifier;

/// Longest response-body excerpt kept in a rejection error.
const MAX_ERROR_BODY: usize = 512;

/// Trim a provider error body for logs and reports.
pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
