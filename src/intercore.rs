//! Inter-core message formats.
//!
//! The application core and the real-time core exchange short ASCII
//! datagrams.  Outbound: a one-off `HeartBeat` at start, then
//! `HeartBeat-<n>` on every heartbeat tick.  Inbound content is not
//! interpreted; it is only made printable for the log.

use core::fmt::Write;

/// Largest inbound datagram that is kept; longer ones are truncated.
pub const RX_BUFFER_BYTES: usize = 32;

/// Sent once when the link comes up.
pub const PRIME_MESSAGE: &str = "HeartBeat";

/// An inbound datagram.
pub type Datagram = heapless::Vec<u8, RX_BUFFER_BYTES>;

/// `HeartBeat-<n>`
pub fn heartbeat(n: u32) -> heapless::String<24> {
    let mut msg = heapless::String::new();
    // "HeartBeat-" + at most 10 digits always fits.
    let _ = write!(msg, "{}-{}", PRIME_MESSAGE, n);
    msg
}

/// Copy of `bytes` with every non-printable byte replaced by `.`.
pub fn sanitize(bytes: &[u8]) -> heapless::String<RX_BUFFER_BYTES> {
    bytes
        .iter()
        .take(RX_BUFFER_BYTES)
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}
