//! Inter-core socket adapter.
//!
//! The real-time partner application is reached through a Unix datagram
//! socket pair on the local file system:
//!
//! ```text
//!   <socket_dir>/hl-<component>.sock  (bound here)
//!                 │
//!                 ▼
//!   <socket_dir>/<component>.sock     (real-time core)
//! ```
//!
//! The link splits into an [`InterCoreSender`] (the [`InterCorePort`]
//! used by the application service) and an async receive half polled by
//! the event loop.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use async_io_mini::Async;
use log::{info, warn};

use crate::app::ports::InterCorePort;
use crate::error::InterCoreError;

/// Send half of the link.
pub struct InterCoreSender {
    socket: UnixDatagram,
}

impl InterCoreSender {
    pub fn new(socket: UnixDatagram) -> Self {
        Self { socket }
    }
}

impl InterCorePort for InterCoreSender {
    fn send(&mut self, message: &[u8]) -> Result<(), InterCoreError> {
        match self.socket.send(message) {
            Ok(n) if n == message.len() => Ok(()),
            Ok(n) => {
                warn!("Inter-core: sent {} of {} bytes", n, message.len());
                Err(InterCoreError::SendFailed)
            }
            Err(e) => {
                warn!("Inter-core: unable to send message: {}", e);
                Err(InterCoreError::SendFailed)
            }
        }
    }
}

/// Both halves of an open link.
pub struct InterCoreLink {
    pub sender: InterCoreSender,
    pub receiver: Async<UnixDatagram>,
}

impl InterCoreLink {
    /// Bind our endpoint and connect it to the partner `component`.
    pub fn open(socket_dir: &Path, component: &str) -> Result<Self, InterCoreError> {
        let (local, remote) = endpoints(socket_dir, component);
        let socket = bind_and_connect(&local, &remote).map_err(|e| {
            warn!("Inter-core: unable to create socket {}: {}", local.display(), e);
            InterCoreError::SocketFailed
        })?;
        info!("Inter-core: {} -> {}", local.display(), remote.display());
        Self::from_socket(socket)
    }

    /// Wrap an already connected socket.
    pub fn from_socket(socket: UnixDatagram) -> Result<Self, InterCoreError> {
        let tx = socket.try_clone().map_err(|_| InterCoreError::SocketFailed)?;
        let receiver = Async::new(socket).map_err(|_| InterCoreError::SocketFailed)?;
        Ok(Self {
            sender: InterCoreSender::new(tx),
            receiver,
        })
    }
}

/// `(local, remote)` socket paths for `component`.
pub fn endpoints(socket_dir: &Path, component: &str) -> (PathBuf, PathBuf) {
    (
        socket_dir.join(format!("hl-{component}.sock")),
        socket_dir.join(format!("{component}.sock")),
    )
}

fn bind_and_connect(local: &Path, remote: &Path) -> io::Result<UnixDatagram> {
    if local.exists() {
        std::fs::remove_file(local)?;
    }
    let socket = UnixDatagram::bind(local)?;
    socket.connect(remote)?;
    Ok(socket)
}
