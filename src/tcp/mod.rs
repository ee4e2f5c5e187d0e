//! Raw TCP transport.
//!
//! Framing is newline-delimited JSON: each request is one command envelope
//! on its own line and each response is one response envelope on its own
//! line. `\r\n` line endings are accepted and blank lines are ignored. A
//! line over [`MAX_LINE_LENGTH`] is answered with `Request too large` and
//! skipped.

pub mod codec;
pub mod connection;
pub mod listener;

/// Longest accepted request line, in bytes.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;
