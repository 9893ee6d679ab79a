//! Exponential backoff for transport failures and corrective re-prompting
//! for malformed responses.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::{debug, warn};

use crate::commit::validate_commit_message;
use crate::error::LlmError;

use super::{LlmClient, LlmResponse};

/// Configuration: 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Extra prompts sent after a response fails validation.
pub const MAX_CORRECTIONS: u32 = 2;

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `MAX_ATTEMPTS` times. Errors for which
/// `is_retryable` returns false are returned immediately. Otherwise the task
/// sleeps for an exponentially increasing duration before the next attempt.
///
/// `wrap_exhausted` converts the last error into the appropriate
/// `RetriesExhausted` variant for the caller's error type.
pub async fn retry_with_backoff<T, E, Fut, F, R, W>(
    mut attempt: F,
    is_retryable: R,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    W: FnOnce(E) -> E,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) if attempts >= MAX_ATTEMPTS => return Err(wrap_exhausted(e)),
            Err(_) => {
                if let Some(wait_duration) = backoff.next_backoff() {
                    debug!("Attempt {attempts} failed, retrying in {wait_duration:?}");
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}

/// Generate a commit message, re-prompting when the response is malformed.
///
/// With `validate` set, a response that fails [`validate_commit_message`] is
/// followed by up to [`MAX_CORRECTIONS`] corrective prompts. The last response
/// is returned even if it never validates.
pub async fn generate_commit_message<C: LlmClient + ?Sized>(
    client: &C,
    prompt: &str,
    validate: bool,
) -> Result<LlmResponse, LlmError> {
    let mut current_prompt = prompt.to_string();
    let mut corrections = 0;

    loop {
        let response = retry_with_backoff(
            || client.generate(&current_prompt),
            LlmError::is_transient,
            |e| LlmError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        if !validate {
            return Ok(response);
        }

        match validate_commit_message(&response.content) {
            Ok(()) => return Ok(response),
            Err(reason) if corrections >= MAX_CORRECTIONS => {
                warn!("Returning unvalidated response: {reason}");
                return Ok(response);
            }
            Err(reason) => {
                corrections += 1;
                debug!("Invalid response ({reason}), re-prompting ({corrections}/{MAX_CORRECTIONS})");
                current_prompt = corrective_prompt(prompt, &reason);
            }
        }
    }
}

fn corrective_prompt(prompt: &str, reason: &str) -> String {
    format!(
        "{prompt}\n\nIMPORTANT: Your previous response was invalid ({reason}). \
         Start directly with the commit type, e.g., 'feat(scope):'"
    )
}
