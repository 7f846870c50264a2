//! Retry wrapper that reconnects and retries failed writes with exponential
//! backoff.

use std::time::{Duration, SystemTime};

use tracing::warn;

use crate::config::RetryConfig;
use crate::{PrintError, Printer, Reconnectable};

/// Wraps a [`Printer`] so that retryable failures are retried on a fresh
/// connection.
///
/// Between attempts the wrapper sleeps for the backoff delay and then calls
/// [`Reconnectable::reconnect()`]. A failed reconnect is not fatal: the next
/// attempt either succeeds or reports a more specific error.
///
/// # Example
///
/// ```rust,no_run
/// use openlabel_print_client::{Printer, PrinterConfig, RetryConfig, RetryPrinter, TcpPrinter};
///
/// let tcp = TcpPrinter::connect("192.168.1.100:9100", PrinterConfig::default()).unwrap();
/// let mut printer = RetryPrinter::new(tcp, RetryConfig::default());
/// printer.send_zpl("^XA^FDHello^FS^XZ").unwrap();
/// ```
pub struct RetryPrinter<P> {
    inner: P,
    retry_config: RetryConfig,
}

impl<P> RetryPrinter<P> {
    /// Wrap `inner` with the given retry configuration.
    pub fn new(inner: P, retry_config: RetryConfig) -> Self {
        Self {
            inner,
            retry_config,
        }
    }

    /// Unwrap the `RetryPrinter`, returning the inner printer.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Printer + Reconnectable> Printer for RetryPrinter<P> {
    fn send_raw(&mut self, data: &[u8]) -> Result<(), PrintError> {
        retry_with_reconnect(&self.retry_config, &mut self.inner, |p| p.send_raw(data))
    }
}

impl<P: Reconnectable> Reconnectable for RetryPrinter<P> {
    fn reconnect(&mut self) -> Result<(), PrintError> {
        self.inner.reconnect()
    }
}

/// Run `op`, reconnecting and retrying on retryable errors.
///
/// Non-retryable errors are returned immediately. When every attempt fails the
/// last error is wrapped in [`PrintError::RetriesExhausted`].
fn retry_with_reconnect<T, P, F>(
    config: &RetryConfig,
    inner: &mut P,
    mut op: F,
) -> Result<T, PrintError>
where
    P: Reconnectable,
    F: FnMut(&mut P) -> Result<T, PrintError>,
{
    with_backoff(config, "print", |attempt| {
        if attempt > 1
            && let Err(e) = inner.reconnect()
        {
            warn!(error = %e, "reconnect failed");
        }
        op(&mut *inner)
    })
}

/// Run `op` until it succeeds, fails permanently, or `config.max_attempts`
/// is reached, sleeping [`compute_delay`] between attempts.
///
/// `op` receives the 1-based attempt number. `action` names the operation in
/// log events.
pub(crate) fn with_backoff<T, F>(
    config: &RetryConfig,
    action: &str,
    mut op: F,
) -> Result<T, PrintError>
where
    F: FnMut(u32) -> Result<T, PrintError>,
{
    if config.max_attempts == 0 {
        return Err(PrintError::InvalidConfig(
            "max_attempts must be >= 1".into(),
        ));
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match op(attempt) {
            Ok(val) => return Ok(val),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        if attempt >= config.max_attempts {
            return Err(PrintError::RetriesExhausted {
                attempts: config.max_attempts,
                last_error: Box::new(err),
            });
        }

        let delay = compute_delay(config, attempt - 1);
        warn!(
            action,
            attempt,
            max_attempts = config.max_attempts,
            ?delay,
            error = %err,
            "attempt failed, retrying"
        );
        std::thread::sleep(delay);
    }
}

/// Backoff delay for the given `attempt` (0-indexed):
/// `min(initial_delay * 2^attempt, max_delay)`, optionally jittered into
/// `[delay/2, delay]`.
fn compute_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let capped = config
        .initial_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(config.max_delay);

    if !config.jitter {
        return capped;
    }

    // System-time nanoseconds are enough entropy to spread reconnect storms.
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let half = capped / 2;
    let range = capped.as_nanos().saturating_sub(half.as_nanos());
    if range == 0 {
        return capped;
    }
    half + Duration::from_nanos((u128::from(nanos) % range) as u64)
}
