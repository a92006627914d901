//! OSC transport to the lighting console.
//!
//! The console is a stateless receiver: every command is one UDP datagram
//! carrying an address and a single string argument. Nothing is read back.
//!
//! `ConsoleBackend` separates what the engine wants to say from how it gets
//! there, so the playback monitor can be driven against a recording backend
//! in tests.

use std::fmt;
use std::net::UdpSocket;
use std::sync::Mutex;

use rosc::{OscMessage, OscPacket, OscType};

/// Result type for console operations.
pub type ConsoleResult<T = ()> = Result<T, ConsoleError>;

/// A failed encode or transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleError(pub String);

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConsoleError {}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError(e.to_string())
    }
}

/// Prefix `address` with `/` unless it already has one.
pub fn normalize_address(address: &str) -> String {
    if address.starts_with('/') {
        address.to_string()
    } else {
        format!("/{}", address)
    }
}

/// Encode `address ,s argument` as a single OSC message.
///
/// Each of the three fields is null-terminated and padded to a 4-byte
/// boundary, so the datagram length is always a multiple of four.
pub fn encode_string_message(address: &str, argument: &str) -> ConsoleResult<Vec<u8>> {
    let msg = OscPacket::Message(OscMessage {
        addr: normalize_address(address),
        args: vec![OscType::String(argument.to_string())],
    });
    rosc::encoder::encode(&msg).map_err(|e| ConsoleError(e.to_string()))
}

/// Encode and send one command as a UDP datagram to `(host, port)`.
pub fn send_osc_string(
    socket: &UdpSocket,
    address: &str,
    host: &str,
    port: u16,
    argument: &str,
) -> ConsoleResult {
    let buf = encode_string_message(address, argument)?;
    socket.send_to(&buf, (host, port))?;
    log::trace!(target: "osc", "{} bytes to {}:{}", buf.len(), host, port);
    Ok(())
}

/// Something that can deliver `(address, argument)` commands to a console.
pub trait ConsoleBackend {
    fn send_string(&self, address: &str, argument: &str) -> ConsoleResult;
}

/// UDP backend. The socket is bound once and reused for every send.
pub struct OscConsole {
    socket: UdpSocket,
    host: String,
    port: u16,
}

impl OscConsole {
    pub fn new(host: &str, port: u16) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            host: host.to_string(),
            port,
        })
    }

    pub fn from_settings(settings: &alva_types::ConsoleSettings) -> std::io::Result<Self> {
        Self::new(&settings.ip_address, settings.port)
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConsoleBackend for OscConsole {
    fn send_string(&self, address: &str, argument: &str) -> ConsoleResult {
        send_osc_string(&self.socket, address, &self.host, self.port, argument)
    }
}

/// Backend that accepts and discards everything.
pub struct NullConsole;

impl ConsoleBackend for NullConsole {
    fn send_string(&self, _: &str, _: &str) -> ConsoleResult {
        Ok(())
    }
}

/// One command recorded by `TestConsole`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub address: String,
    pub argument: String,
}

impl SentCommand {
    pub fn new(address: &str, argument: &str) -> Self {
        Self {
            address: normalize_address(address),
            argument: argument.to_string(),
        }
    }
}

/// Backend that records every command for assertions.
///
/// Sends whose argument is registered with `fail_on` return an error and
/// are not recorded.
pub struct TestConsole {
    sent: Mutex<Vec<SentCommand>>,
    failing: Mutex<Vec<String>>,
}

impl TestConsole {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
        }
    }

    /// Make every send carrying `argument` fail.
    pub fn fail_on(&self, argument: &str) {
        self.failing.lock().unwrap().push(argument.to_string());
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().unwrap().clone()
    }

    pub fn arguments(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.argument.clone())
            .collect()
    }

    pub fn count<F: Fn(&SentCommand) -> bool>(&self, f: F) -> usize {
        self.sent.lock().unwrap().iter().filter(|c| f(c)).count()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Default for TestConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleBackend for TestConsole {
    fn send_string(&self, address: &str, argument: &str) -> ConsoleResult {
        if self.failing.lock().unwrap().iter().any(|a| a == argument) {
            return Err(ConsoleError(format!("refused {}", argument)));
        }
        self.sent
            .lock()
            .unwrap()
            .push(SentCommand::new(address, argument));
        Ok(())
    }
}
