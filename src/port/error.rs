//! Error types for the port abstraction layer.
//!
//! Construction failures (open, configuration) abort port creation outright;
//! per-attempt transfer failures are surfaced as `Io` and handled by the
//! framed layer's retry budget.

use thiserror::Error;

/// Errors that can occur while opening or operating a serial port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The device could not be opened (bad path, permissions, device busy).
    #[error("could not open serial port: {0}")]
    Open(String),

    /// The device rejected a line parameter or timeout value.
    #[error("configuration rejected: {0}")]
    Config(String),

    /// A low-level transfer attempt failed. Inside the framed read/write
    /// loops this is logged and retried rather than aborting the call.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The retry budget for a single read or write call ran out before its
    /// stop condition was met.
    #[error("transfer gave up after {attempts} failed attempts ({bytes_transferred} bytes transferred)")]
    AttemptsExhausted {
        attempts: u32,
        bytes_transferred: usize,
    },

    /// A terminated write transmitted its whole buffer but the final byte
    /// was not the termination byte.
    #[error("write buffer does not end with the termination byte")]
    TerminatorMissing,

    /// The operation was invoked after `close`.
    #[error("port is closed")]
    Closed,

    /// An error reported by the underlying serialport backend.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create an `Open` error from a message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open(message.into())
    }

    /// Create a `Config` error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error is a bounded-wait expiry rather than a device
    /// fault. Timeouts end an attempt without data; they are not fatal.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        )
    }
}
