//! Framed blocking I/O over serial ports.
//!
//! This crate wraps a physical or virtual serial (COM) port in a
//! synchronous, frame-oriented API: open and configure a port, write bytes
//! with terminator-driven flushing, read bytes until a terminator or a
//! buffer limit, and block-wait for incoming data with a bounded timeout.
//! Every wait is bounded; a persistently failing device surfaces a terminal
//! error instead of hanging the caller.
//!
//! # Modules
//!
//! - `framed`: the caller-facing [`FramedPort`] with terminator framing,
//!   partial-transfer accumulation, and bounded retries
//! - `port`: the platform-backend boundary, the real-hardware backend over
//!   the `serialport` crate, a scriptable mock, and the error taxonomy
//!
//! # Example
//! ```
//! use serialframe::{FramedPort, PortConfiguration};
//! use serialframe::port::MockSerialPort;
//!
//! let mut mock = MockSerialPort::new("MOCK0");
//! let mut port = FramedPort::with_backend(Box::new(mock.clone()), PortConfiguration::default())?;
//! port.enable_termination(b'\n')?;
//!
//! // Opening purges anything stale, so feed the device afterwards.
//! mock.enqueue_read(b"READY\n");
//!
//! let mut buf = [0u8; 32];
//! let outcome = port.read(&mut buf)?;
//! assert_eq!(&buf[..outcome.len()], b"READY\n");
//! # Ok::<(), serialframe::PortError>(())
//! ```

pub mod framed;
pub mod port;

pub use framed::{FramedPort, ReadOutcome, DATA_WAIT_INTERVAL};
pub use port::{MockSerialPort, PortBackend, PortConfiguration, PortError, SyncSerialPort};
