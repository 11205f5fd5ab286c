//! Framed blocking I/O over a platform backend.
//!
//! [`FramedPort`] turns the bounded single-attempt primitives of a
//! [`PortBackend`] into synchronous frame-oriented calls: writes that flush
//! through to a termination byte, reads that accumulate until a terminator
//! or capacity, and an advisory bounded wait for incoming data. Frames are
//! not length-prefixed; framing is purely terminator- or capacity-based.
//!
//! A port is single-owner and single-turn: one logical reader/writer issues
//! one operation at a time. `&mut self` on every I/O call makes that a
//! compile-time property.

use crate::port::{PortBackend, PortConfiguration, PortError, SyncSerialPort};
use std::time::Duration;
use tracing::{debug, warn};

/// How long [`FramedPort::wait_for_data`] blocks for the first queued byte.
pub const DATA_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a framed read.
///
/// "The timeout elapsed with nothing on the wire" is an ordinary outcome in
/// a request/response loop, distinct from any frame, so it is modeled as a
/// variant rather than an error or a zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// At least one byte arrived; this many bytes were stored at the start
    /// of the caller's buffer.
    Received(usize),
    /// The timeout elapsed before a single byte was available.
    NothingReceived,
}

impl ReadOutcome {
    /// Number of bytes stored in the caller's buffer.
    pub fn len(&self) -> usize {
        match self {
            Self::Received(n) => *n,
            Self::NothingReceived => 0,
        }
    }

    /// Whether no bytes were stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A serial port with framed blocking reads and writes.
///
/// Construction opens and configures the device; a failed open never yields
/// a partially-usable port. After [`close`](Self::close) the handle is gone
/// and every other operation returns [`PortError::Closed`]; `close` itself
/// may be called again freely.
///
/// # Example
/// ```no_run
/// use serialframe::{FramedPort, PortConfiguration};
///
/// let mut config = PortConfiguration::default();
/// config.baud_rate = 115200;
/// let mut port = FramedPort::open("/dev/ttyUSB0", config)?;
/// port.enable_termination(b'\n')?;
///
/// port.write(b"*IDN?\n")?;
/// let mut response = [0u8; 256];
/// let outcome = port.read(&mut response)?;
/// println!("{}", String::from_utf8_lossy(&response[..outcome.len()]));
/// # Ok::<(), serialframe::PortError>(())
/// ```
pub struct FramedPort {
    /// `None` once closed.
    backend: Option<Box<dyn PortBackend>>,
    name: String,
    read_buffer_size: usize,
    timeout_secs: u64,
    terminator: Option<u8>,
    max_transfer_attempts: u32,
}

impl FramedPort {
    /// Open the device at `path` for exclusive read/write access.
    ///
    /// Anything already queued by the OS for this device is purged before
    /// the timeout is applied, so stale bytes from a previous session never
    /// reach the first read.
    pub fn open(path: &str, config: PortConfiguration) -> Result<Self, PortError> {
        let backend = SyncSerialPort::open(path, &config)?;
        Self::with_backend(Box::new(backend), config)
    }

    /// Wrap an already-open backend. This is how tests and demos inject a
    /// [`MockSerialPort`](crate::port::MockSerialPort).
    pub fn with_backend(
        mut backend: Box<dyn PortBackend>,
        config: PortConfiguration,
    ) -> Result<Self, PortError> {
        backend.clear_buffers()?;
        backend.set_timeout(Duration::from_secs(config.timeout_secs))?;

        let name = backend.name().to_string();
        debug!(port = %name, baud = config.baud_rate, "port opened");

        Ok(Self {
            backend: Some(backend),
            name,
            read_buffer_size: config.read_buffer_size,
            timeout_secs: config.timeout_secs,
            terminator: config.terminator,
            max_transfer_attempts: config.max_transfer_attempts,
        })
    }

    /// The device path or name this port was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record the capacity used by [`read_frame`](Self::read_frame).
    /// Nothing is allocated here and no hardware limit is checked.
    pub fn set_read_buffer_size(&mut self, size: usize) -> Result<(), PortError> {
        self.ensure_open()?;
        if size == 0 {
            return Err(PortError::config("read buffer size must be positive"));
        }
        self.read_buffer_size = size;
        Ok(())
    }

    /// Set how long a single low-level read attempt waits for its first
    /// byte, in whole seconds. The value is converted to a [`Duration`]
    /// here; backends never see the raw second count. Zero keeps every
    /// wait bounded (attempts give up immediately), it never means
    /// "wait forever".
    pub fn set_timeout(&mut self, secs: u64) -> Result<(), PortError> {
        self.backend_mut()?.set_timeout(Duration::from_secs(secs))?;
        self.timeout_secs = secs;
        Ok(())
    }

    /// Enable terminator framing with `byte` for subsequent writes and
    /// reads. Framing stays off until this is called, so a payload byte
    /// can never match an unset terminator.
    pub fn enable_termination(&mut self, byte: u8) -> Result<(), PortError> {
        self.ensure_open()?;
        self.terminator = Some(byte);
        Ok(())
    }

    /// Discard everything the OS has queued for this device, inbound and
    /// outbound.
    pub fn flush(&mut self) -> Result<(), PortError> {
        self.backend_mut()?.clear_buffers()
    }

    /// Same operation as [`flush`](Self::flush): both purge the inbound and
    /// outbound queues.
    pub fn reset(&mut self) -> Result<(), PortError> {
        self.flush()
    }

    /// Transmit `data`.
    ///
    /// Without termination framing this is a single backend attempt
    /// covering the whole buffer; a short write is logged and not retried.
    ///
    /// With termination framing the call keeps writing the unsent tail
    /// until the last byte the device accepted is the termination byte.
    /// Each byte is transmitted exactly once, in order, across retried
    /// partial segments. Failed attempts are logged and retried up to
    /// `max_transfer_attempts` consecutive failures; a buffer that does not
    /// end with the terminator fails with [`PortError::TerminatorMissing`]
    /// once fully transmitted, since no retry can change the last byte on
    /// the wire.
    pub fn write(&mut self, data: &[u8]) -> Result<(), PortError> {
        if data.is_empty() {
            return Err(PortError::config("write requires a non-empty buffer"));
        }
        let terminator = self.terminator;
        let max_attempts = self.max_transfer_attempts;
        let backend = self.backend_mut()?;

        let Some(terminator) = terminator else {
            let n = backend.write_some(data)?;
            if n < data.len() {
                warn!(
                    port = backend.name(),
                    written = n,
                    length = data.len(),
                    "short write"
                );
            }
            return Ok(());
        };

        let mut spot = 0;
        let mut failures = 0u32;
        loop {
            if spot == data.len() {
                // Everything is on the wire; the stop condition is the
                // value of the last accepted byte.
                if data[spot - 1] == terminator {
                    return Ok(());
                }
                return Err(PortError::TerminatorMissing);
            }

            match backend.write_some(&data[spot..]) {
                Ok(n) if n > 0 => {
                    spot += n;
                    failures = 0;
                }
                Ok(_) => {
                    failures += 1;
                    warn!(port = backend.name(), "write attempt accepted no bytes");
                }
                Err(e) => {
                    failures += 1;
                    warn!(port = backend.name(), error = %e, "write attempt failed");
                }
            }

            if failures >= max_attempts {
                return Err(PortError::AttemptsExhausted {
                    attempts: failures,
                    bytes_transferred: spot,
                });
            }
        }
    }

    /// Bytes currently queued inbound and readable without blocking, as
    /// reported by the OS.
    pub fn bytes_received(&self) -> Result<usize, PortError> {
        self.backend.as_deref().ok_or(PortError::Closed)?.bytes_to_read()
    }

    /// Read a frame into `buf`, which is zero-filled first.
    ///
    /// Bytes accumulate one backend attempt at a time and the call stops as
    /// soon as a byte equals the enabled terminator or `buf` is full,
    /// whichever comes first. One byte per attempt keeps the OS queue
    /// intact past the terminator; the next frame starts exactly where
    /// this one ended.
    ///
    /// A timeout while zero bytes have accumulated returns
    /// [`ReadOutcome::NothingReceived`]. Once at least one byte is in,
    /// failed attempts and timeouts are logged and retried under the same
    /// stop conditions, up to `max_transfer_attempts` consecutive failures.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, PortError> {
        if buf.is_empty() {
            return Err(PortError::config("read requires a non-empty buffer"));
        }
        buf.fill(0);

        let terminator = self.terminator;
        let max_attempts = self.max_transfer_attempts;
        let backend = self.backend_mut()?;

        let mut spot = 0;
        let mut failures = 0u32;
        loop {
            let mut byte = [0u8; 1];
            match backend.read_some(&mut byte) {
                Ok(n) if n > 0 => {
                    buf[spot] = byte[0];
                    spot += 1;
                    failures = 0;
                    if terminator == Some(byte[0]) || spot == buf.len() {
                        return Ok(ReadOutcome::Received(spot));
                    }
                }
                Ok(_) => {
                    if spot == 0 {
                        return Ok(ReadOutcome::NothingReceived);
                    }
                    failures += 1;
                }
                Err(e) if e.is_timeout() => {
                    if spot == 0 {
                        return Ok(ReadOutcome::NothingReceived);
                    }
                    failures += 1;
                    debug!(port = backend.name(), received = spot, "read attempt timed out mid-frame");
                }
                Err(e) => {
                    failures += 1;
                    warn!(port = backend.name(), error = %e, "read attempt failed");
                }
            }

            if failures >= max_attempts {
                return Err(PortError::AttemptsExhausted {
                    attempts: failures,
                    bytes_transferred: spot,
                });
            }
        }
    }

    /// Read a frame into an owned buffer sized by the recorded read buffer
    /// size. Returns `None` when the timeout elapsed with nothing on the
    /// wire; a returned frame always holds at least one byte.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, PortError> {
        let mut buf = vec![0u8; self.read_buffer_size];
        match self.read(&mut buf)? {
            ReadOutcome::Received(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            ReadOutcome::NothingReceived => Ok(None),
        }
    }

    /// Block until at least one byte is queued inbound or a fixed 100 ms
    /// interval elapses.
    ///
    /// Advisory only: a latency hint before [`read`](Self::read), never a
    /// correctness primitive. Backend failures during the wait are logged
    /// and swallowed; the only error this returns is [`PortError::Closed`].
    pub fn wait_for_data(&mut self) -> Result<(), PortError> {
        let backend = self.backend_mut()?;
        if let Err(e) = backend.data_ready(DATA_WAIT_INTERVAL) {
            debug!(port = backend.name(), error = %e, "data wait failed");
        }
        Ok(())
    }

    /// Release the device handle. Idempotent: closing an already-closed
    /// port is a no-op. Every other operation on a closed port returns
    /// [`PortError::Closed`].
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            debug!(port = %self.name, "port closed");
        }
    }

    /// Whether the port still holds its device handle.
    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    fn ensure_open(&self) -> Result<(), PortError> {
        if self.backend.is_some() {
            Ok(())
        } else {
            Err(PortError::Closed)
        }
    }

    fn backend_mut(&mut self) -> Result<&mut (dyn PortBackend + 'static), PortError> {
        self.backend.as_deref_mut().ok_or(PortError::Closed)
    }
}

impl std::fmt::Debug for FramedPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedPort")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .field("timeout_secs", &self.timeout_secs)
            .field("terminator", &self.terminator)
            .finish()
    }
}
