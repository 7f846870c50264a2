//! TCP transport for ZPL printers (port 9100 / JetDirect / RAW).

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tracing::{debug, info};

use crate::addr::resolve_printer_addr;
use crate::{PrintError, Printer, PrinterConfig, Reconnectable};

/// A synchronous TCP connection to a ZPL printer.
///
/// Connects to the printer's RAW port (typically 9100) and writes command
/// streams as raw bytes.
pub struct TcpPrinter {
    stream: TcpStream,
    config: PrinterConfig,
    addr: SocketAddr,
}

impl TcpPrinter {
    /// Connect to a printer at the given address.
    ///
    /// The address can be any format accepted by [`resolve_printer_addr`].
    /// A printer that does not accept the connection within
    /// `config.timeouts.connect` is reported as
    /// [`PrintError::ConnectionTimeout`].
    pub fn connect(addr: &str, config: PrinterConfig) -> Result<Self, PrintError> {
        let socket_addr = resolve_printer_addr(addr)?;
        let stream = open_stream(&socket_addr, &config)?;
        info!(printer = addr, %socket_addr, "connected to printer");

        Ok(Self {
            stream,
            config,
            addr: socket_addr,
        })
    }

    /// Return the resolved socket address this printer is connected to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Printer for TcpPrinter {
    fn send_raw(&mut self, data: &[u8]) -> Result<(), PrintError> {
        self.stream
            .write_all(data)
            .map_err(PrintError::WriteFailed)?;
        self.stream.flush().map_err(PrintError::WriteFailed)?;
        debug!(bytes = data.len(), addr = %self.addr, "wrote to printer");
        Ok(())
    }
}

impl Reconnectable for TcpPrinter {
    /// Shut down the old stream (ignoring errors) and open a fresh one to the
    /// same address.
    fn reconnect(&mut self) -> Result<(), PrintError> {
        let _ = self.stream.shutdown(Shutdown::Both);
        self.stream = open_stream(&self.addr, &self.config)?;
        info!(addr = %self.addr, "reconnected to printer");
        Ok(())
    }
}

impl Drop for TcpPrinter {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

/// Open a TCP connection and configure it (nodelay, keepalive, write timeout).
fn open_stream(addr: &SocketAddr, config: &PrinterConfig) -> Result<TcpStream, PrintError> {
    let stream = TcpStream::connect_timeout(addr, config.timeouts.connect).map_err(|e| {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => PrintError::ConnectionRefused {
                addr: addr.to_string(),
                source: e,
            },
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                PrintError::ConnectionTimeout {
                    addr: addr.to_string(),
                    timeout: config.timeouts.connect,
                    source: e,
                }
            }
            _ => PrintError::ConnectionFailed {
                addr: addr.to_string(),
                source: e,
            },
        }
    })?;

    configure_stream(&stream, config).map_err(|e| PrintError::ConnectionFailed {
        addr: addr.to_string(),
        source: e,
    })?;
    Ok(stream)
}

fn configure_stream(stream: &TcpStream, config: &PrinterConfig) -> io::Result<()> {
    stream.set_nodelay(true)?;
    configure_keepalive(stream, Duration::from_secs(60))?;
    stream.set_write_timeout(Some(config.timeouts.write))?;
    Ok(())
}

/// Configure TCP keepalive on a `TcpStream` via `socket2`.
fn configure_keepalive(stream: &TcpStream, interval: Duration) -> io::Result<()> {
    let keepalive = TcpKeepalive::new().with_time(interval);

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    let keepalive = keepalive.with_interval(interval);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}
