//! OpenLabel print client: send finished ZPL command streams to network
//! label printers.
//!
//! Printers are reached over raw TCP on port 9100. The API is synchronous
//! (`std::net`) and needs no async runtime.
mod addr;
mod config;
mod error;
mod retry;
#[cfg(feature = "tcp")]
mod tcp;

pub use addr::{DEFAULT_PORT, resolve_printer_addr, share_path_host};
pub use config::{PrinterConfig, PrinterTimeouts, RetryConfig};
pub use error::PrintError;
pub use retry::RetryPrinter;
#[cfg(feature = "tcp")]
pub use tcp::TcpPrinter;

use std::ops::ControlFlow;

use tracing::debug;

// ── Traits ──────────────────────────────────────────────────────────────

/// Send data to a printer. All transports implement this.
pub trait Printer: Send {
    /// Send raw bytes to the printer.
    fn send_raw(&mut self, data: &[u8]) -> Result<(), PrintError>;

    /// Send a ZPL string to the printer (convenience wrapper over `send_raw`).
    fn send_zpl(&mut self, zpl: &str) -> Result<(), PrintError> {
        self.send_raw(zpl.as_bytes())
    }
}

/// A printer that can re-establish its connection after a failure.
///
/// [`RetryPrinter`] calls this between attempts so that a retry goes out on a
/// fresh connection rather than a dead one.
pub trait Reconnectable {
    /// Close the old connection (if any) and open a fresh one.
    fn reconnect(&mut self) -> Result<(), PrintError>;
}

// ── Copies ──────────────────────────────────────────────────────────────

/// Outcome of a multi-copy print.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrintSummary {
    /// Number of copies written to the printer.
    pub sent: u32,
    /// Number of copies requested.
    pub total: u32,
}

/// Write `zpl` to the printer `copies` times, flushing after each copy.
///
/// Zero copies writes nothing and succeeds.
pub fn print_copies<P: Printer>(
    printer: &mut P,
    zpl: &str,
    copies: u32,
) -> Result<PrintSummary, PrintError> {
    print_copies_with_progress(printer, zpl, copies, |_| ControlFlow::Continue(()))
}

/// Like [`print_copies`], reporting progress after every copy.
///
/// `on_progress` receives the running [`PrintSummary`] and can return
/// `ControlFlow::Break(())` to stop early; the returned summary then reports
/// how many copies actually went out.
pub fn print_copies_with_progress<P, F>(
    printer: &mut P,
    zpl: &str,
    copies: u32,
    mut on_progress: F,
) -> Result<PrintSummary, PrintError>
where
    P: Printer,
    F: FnMut(PrintSummary) -> ControlFlow<(), ()>,
{
    for i in 1..=copies {
        printer.send_zpl(zpl)?;
        debug!(copy = i, total = copies, "label sent");

        let progress = PrintSummary {
            sent: i,
            total: copies,
        };
        if on_progress(progress).is_break() {
            return Ok(progress);
        }
    }

    Ok(PrintSummary {
        sent: copies,
        total: copies,
    })
}

/// Resolve `address`, connect, and write `zpl` `copies` times.
///
/// Retryable failures (connect timeouts, broken writes) are retried with
/// backoff according to `config.retry`; writes go out on a new connection.
#[cfg(feature = "tcp")]
pub fn print_label(
    address: &str,
    copies: u32,
    zpl: &str,
    config: PrinterConfig,
) -> Result<PrintSummary, PrintError> {
    print_label_with_progress(address, copies, zpl, config, |_| ControlFlow::Continue(()))
}

/// Like [`print_label`], reporting progress after every copy as
/// [`print_copies_with_progress`] does.
#[cfg(feature = "tcp")]
pub fn print_label_with_progress<F>(
    address: &str,
    copies: u32,
    zpl: &str,
    config: PrinterConfig,
    on_progress: F,
) -> Result<PrintSummary, PrintError>
where
    F: FnMut(PrintSummary) -> ControlFlow<(), ()>,
{
    let retry = config.retry.clone();
    let tcp = connect_with_retry(&retry, || TcpPrinter::connect(address, config.clone()))?;
    let mut printer = RetryPrinter::new(tcp, retry);
    print_copies_with_progress(&mut printer, zpl, copies, on_progress)
}

/// Open a connection, retrying transient failures with the same backoff as
/// writes.
#[cfg(any(feature = "tcp", test))]
fn connect_with_retry<P, F>(config: &RetryConfig, mut connect: F) -> Result<P, PrintError>
where
    F: FnMut() -> Result<P, PrintError>,
{
    retry::with_backoff(config, "connect", |_| connect())
}
