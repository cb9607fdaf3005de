//! Retry logic with exponential backoff for network operations.

use tokio::time::Duration;

use crate::cli::RuntimeConfig;
use crate::error::Result;

/// Maximum backoff between attempts in seconds
const MAX_BACKOFF_SECONDS: u64 = 60;

/// Retry an async operation with exponential backoff
///
/// Recoverable errors (network failures, 5xx responses) are retried with
/// 1s, 2s, 4s, ... waits. Anything else returns immediately.
///
/// # Arguments
/// * `operation` - Async closure that returns Result<T>
/// * `max_retries` - Maximum number of retry attempts (0 = try once, no retries)
/// * `operation_name` - Human-readable name for logging
/// * `config` - Runtime config for user messaging
pub async fn retry_with_backoff<F, T, Fut>(
    mut operation: F,
    max_retries: u32,
    operation_name: &str,
    config: &RuntimeConfig,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempts > 0 {
                    config.success_println(&format!(
                        "{} succeeded after {} retry(ies)",
                        operation_name, attempts
                    ));
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_recoverable() || attempts >= max_retries {
                    log::error!(
                        "{} failed after {} attempt(s): {}",
                        operation_name,
                        attempts + 1,
                        e
                    );
                    return Err(e);
                }

                attempts += 1;
                let wait = Duration::from_secs(
                    2u64.saturating_pow(attempts - 1).min(MAX_BACKOFF_SECONDS),
                );

                config.warning_println(&format!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name,
                    attempts,
                    max_retries + 1,
                    e
                ));
                config.indent(&format!("Retrying in {:.1}s...", wait.as_secs_f64()));

                tokio::time::sleep(wait).await;
            }
        }
    }
}
