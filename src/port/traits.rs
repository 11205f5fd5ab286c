//! The platform-backend boundary for framed serial I/O.
//!
//! `PortBackend` is the full contract a target platform must satisfy: one
//! bounded write attempt, one bounded read attempt, timeout and purge
//! control, a queued-byte count, and a bounded wait for incoming data.
//! `SyncSerialPort` implements it over real hardware and `MockSerialPort`
//! over a scripted queue, so the framed layer never sees backend types.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default baud rate (bits per second).
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default per-attempt read timeout, in whole seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1;
/// Default capacity for owned-buffer frame reads.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;
/// Default budget of consecutive failed transfer attempts per call.
pub const DEFAULT_MAX_TRANSFER_ATTEMPTS: u32 = 16;

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_max_transfer_attempts() -> u32 {
    DEFAULT_MAX_TRANSFER_ATTEMPTS
}

/// Configuration applied when a port is opened.
///
/// The line is always 8 data bits, one stop bit, no parity; only the baud
/// rate is caller-chosen. `timeout_secs` bounds how long a single low-level
/// read attempt may wait for its first byte. `terminator` is `None` by
/// default: framing must be enabled explicitly so a payload byte can never
/// match an unset terminator by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate in bits per second.
    #[serde(default = "default_baud")]
    pub baud_rate: u32,

    /// Per-attempt read timeout in whole seconds. Converted to a
    /// [`Duration`] at the API boundary; backends never see the raw count.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Capacity used by owned-buffer frame reads.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Termination byte, if terminator framing is enabled.
    #[serde(default)]
    pub terminator: Option<u8>,

    /// How many consecutive failed low-level attempts a single read or
    /// write call tolerates before giving up.
    #[serde(default = "default_max_transfer_attempts")]
    pub max_transfer_attempts: u32,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            terminator: None,
            max_transfer_attempts: DEFAULT_MAX_TRANSFER_ATTEMPTS,
        }
    }
}

/// One concrete platform backend owning an open device handle.
///
/// Every method is a single bounded operation; looping, accumulation and
/// terminator detection live in the framed layer. Implementations must
/// configure the line for 8 data bits, one stop bit, no parity, and must
/// release any per-wait OS resource on every exit path of a call.
pub trait PortBackend: Send + std::fmt::Debug {
    /// One write attempt. Returns the number of bytes the device accepted,
    /// which may be less than `data.len()`.
    fn write_some(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// One read attempt. Blocks at most the configured timeout for the
    /// first byte; an expired wait is an `Io` error with a timeout kind.
    fn read_some(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// The device path or name this backend was opened with.
    fn name(&self) -> &str;

    /// Set the per-attempt timeout for subsequent reads.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Discard everything queued by the OS for this device, both inbound
    /// and outbound.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Bytes currently queued inbound and readable without blocking.
    fn bytes_to_read(&self) -> Result<usize, PortError>;

    /// Block until at least one byte is queued inbound or `wait` elapses.
    /// Returns whether data was available when the call returned.
    fn data_ready(&mut self, wait: Duration) -> Result<bool, PortError>;
}
