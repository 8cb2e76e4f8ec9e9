//! Error types for this crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while framing, sending, or receiving OMT traffic.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O failure propagated from the underlying socket.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The framing codec could not make sense of a base or extended header
    /// after attempting to resynchronize (§4.1).
    #[error("invalid frame: {detail}")]
    FramingInvalid { detail: String },

    /// The peer closed the connection, or a write raised a disconnection-class
    /// I/O error (broken pipe, connection reset, or a closed socket).
    #[error("peer disconnected")]
    Disconnected,

    /// A metadata payload was not valid UTF-8.
    #[error("metadata payload was not valid utf-8")]
    InvalidUtf8,

    /// The external VMX codec library is required for this operation but no
    /// codec backend is loaded.
    #[error("codec unavailable")]
    CodecUnavailable,

    /// A video extended header carried dimensions outside `1..=7680 x 1..=4320`.
    #[error("invalid video dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// An audio extended header carried a value outside its recognized range,
    /// or the legacy/vMix disambiguation could not be resolved validly.
    #[error("invalid audio header: {detail}")]
    InvalidAudioHeader { detail: String },
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an I/O error as a disconnection the caller should treat as a
/// silent session eviction (§7, `Send-disconnect` / `Short read`) rather than
/// something to surface through an error sink.
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::NotConnected
    )
}
