//! HTTP client shared by the Claude and OpenAI backends.

use std::time::Duration;

use crate::error::LlmError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the client used for model calls.
///
/// `request_timeout` bounds a whole round trip, including generation time, so
/// it should be generous. A call that exceeds it fails with [`LlmError::Http`];
/// nothing is retried.
///
/// # Errors
///
/// Returns [`LlmError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(request_timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .user_agent(concat!("arcsum/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
