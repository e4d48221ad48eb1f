//! Sends press/release actions to an external process as OSC messages.
//!
//! An `OscPress` owns one UDP socket and posts `<address> ,i 1` for a press
//! and `<address> ,i 0` for a release. Delivery is fire-and-forget: UDP gives
//! no acknowledgement and send failures are logged, counted, and dropped.
#![warn(missing_docs)]
use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// Result alias for fallible OSC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from socket setup or sending.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The target could not be resolved to a socket address.
    #[error("cannot resolve {0}")]
    Resolve(String),
    /// Binding the local socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] io::Error),
    /// The datagram was not sent.
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    /// The OSC address is not a valid path.
    #[error("invalid OSC address {0:?}")]
    Address(String),
}

/// Round `n` up to the next multiple of four.
fn pad4(n: usize) -> usize {
    (n + 3) & !3
}

/// Encode a message with a single 32-bit integer argument.
pub fn encode_int_message(address: &str, value: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(pad4(address.len() + 1) + 8);
    out.extend_from_slice(address.as_bytes());
    out.resize(pad4(address.len() + 1), 0);
    out.extend_from_slice(b",i\0\0");
    out.extend_from_slice(&value.to_be_bytes());
    out
}

/// UDP sender bound to one destination and address.
pub struct OscPress {
    /// Local socket.
    socket: UdpSocket,
    /// Destination.
    target: SocketAddr,
    /// OSC address path.
    address: String,
    /// Last value sent, for trace de-duplication.
    last: Mutex<Option<i32>>,
    /// Count of failed sends.
    failures: AtomicU64,
}

impl OscPress {
    /// Bind an ephemeral local socket and resolve `host:port`.
    pub fn connect(host: &str, port: u16, address: &str) -> Result<Self> {
        if !address.starts_with('/') {
            return Err(Error::Address(address.to_string()));
        }
        let target = (host, port)
            .to_socket_addrs()
            .map_err(|_| Error::Resolve(format!("{host}:{port}")))?
            .next()
            .ok_or_else(|| Error::Resolve(format!("{host}:{port}")))?;
        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind).map_err(Error::Bind)?;
        debug!(%target, address, "osc_connected");
        Ok(Self {
            socket,
            target,
            address: address.to_string(),
            last: Mutex::new(None),
            failures: AtomicU64::new(0),
        })
    }

    /// Send one integer value.
    pub fn send(&self, value: i32) -> Result<()> {
        let msg = encode_int_message(&self.address, value);
        self.socket
            .send_to(&msg, self.target)
            .map_err(Error::Send)?;
        let mut last = self.last.lock();
        if *last != Some(value) {
            trace!(value, "osc_sent");
            *last = Some(value);
        }
        Ok(())
    }

    /// Best-effort send: failures are logged (throttled) and dropped.
    fn send_lossy(&self, value: i32) {
        if let Err(e) = self.send(value) {
            let n = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
            if n == 1 || n % 100 == 0 {
                warn!(count = n, error = %e, "osc_send_failed");
            }
        }
    }

    /// Post a press (1).
    pub fn press(&self) {
        self.send_lossy(1);
    }

    /// Post a release (0).
    pub fn release(&self) {
        self.send_lossy(0);
    }

    /// Number of sends that failed so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
