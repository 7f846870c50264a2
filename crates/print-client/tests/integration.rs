//! Integration tests for the print client against a mock TCP printer.

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::Duration;

use openlabel_print_client::{
    PrintError, Printer, PrinterConfig, RetryConfig, TcpPrinter, print_copies, print_label,
};

// ── Mock printer server ─────────────────────────────────────────────────

/// A mock printer on a background thread: accepts one connection and
/// collects everything written to it until the client disconnects.
struct MockPrinterServer {
    addr: SocketAddr,
    handle: Option<thread::JoinHandle<Vec<u8>>>,
}

impl MockPrinterServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();

            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => received.extend_from_slice(&buf[..n]),
                }
            }
            received
        });

        Self {
            addr,
            handle: Some(handle),
        }
    }

    fn address(&self) -> String {
        format!("127.0.0.1:{}", self.addr.port())
    }

    /// Wait for the client to disconnect and return what it wrote.
    fn received_data(mut self) -> Vec<u8> {
        self.handle.take().unwrap().join().unwrap()
    }
}

fn fast_config() -> PrinterConfig {
    let mut cfg = PrinterConfig::default();
    cfg.timeouts.connect = Duration::from_secs(2);
    cfg.timeouts.write = Duration::from_secs(2);
    cfg.retry = RetryConfig::no_retry();
    cfg
}

// ── Tests ────────────────────────────────────────────────────────────────

#[test]
fn connect_and_send_zpl() {
    let server = MockPrinterServer::start();

    let mut printer = TcpPrinter::connect(&server.address(), fast_config()).unwrap();
    assert_eq!(printer.remote_addr(), server.addr);
    printer.send_zpl("^XA^FDHello^FS^XZ").unwrap();
    drop(printer);

    assert_eq!(server.received_data(), b"^XA^FDHello^FS^XZ");
}

#[test]
fn copies_arrive_back_to_back() {
    let server = MockPrinterServer::start();

    let mut printer = TcpPrinter::connect(&server.address(), fast_config()).unwrap();
    let summary = print_copies(&mut printer, "^XA^FO15,30^XZ", 3).unwrap();
    assert_eq!(summary.sent, 3);
    drop(printer);

    assert_eq!(
        server.received_data(),
        b"^XA^FO15,30^XZ^XA^FO15,30^XZ^XA^FO15,30^XZ"
    );
}

#[test]
fn print_label_resolves_connects_and_repeats() {
    let server = MockPrinterServer::start();

    let summary = print_label(&server.address(), 2, "^XA^XZ", fast_config()).unwrap();
    assert_eq!((summary.sent, summary.total), (2, 2));

    assert_eq!(server.received_data(), b"^XA^XZ^XA^XZ");
}

#[test]
fn large_payload_is_written_whole() {
    let server = MockPrinterServer::start();

    let zpl = format!("^XA^GFA,{0},{0},100,{1}^FS^XZ", 100_000, "F".repeat(100_000));
    let mut printer = TcpPrinter::connect(&server.address(), fast_config()).unwrap();
    printer.send_zpl(&zpl).unwrap();
    drop(printer);

    assert_eq!(server.received_data().len(), zpl.len());
}

#[test]
fn connect_to_closed_port_fails() {
    // Bind then drop to obtain a port that is very likely closed.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    match TcpPrinter::connect(&format!("127.0.0.1:{port}"), fast_config()) {
        Err(PrintError::ConnectionRefused { .. } | PrintError::ConnectionFailed { .. }) => {}
        Err(other) => panic!("expected connection error, got: {other:?}"),
        Ok(_) => panic!("expected connection error, but connect succeeded"),
    }
}

#[test]
fn unresolvable_printer_is_reported_by_name() {
    let err = print_label("no-such-printer.invalid", 1, "^XA^XZ", fast_config()).unwrap_err();
    match err {
        PrintError::NoAddressFound(name) => assert_eq!(name, "no-such-printer.invalid"),
        other => panic!("expected NoAddressFound, got: {other:?}"),
    }
}
