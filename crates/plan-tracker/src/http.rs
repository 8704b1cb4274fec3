//! Shared HTTP response helpers for the GitHub client.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, 422 `already_exists` → [`TrackerError::AlreadyExists`],
//! non-success → [`TrackerError::Api`]) so request code stays focused on
//! request construction and response mapping.

use crate::error::TrackerError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = resp.status();
    if status == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(TrackerError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        if status == 422 && message.contains("already_exists") {
            return Err(TrackerError::AlreadyExists(message));
        }
        return Err(TrackerError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
