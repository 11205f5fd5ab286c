//! Real-hardware backend over the `serialport` crate.
//!
//! Opens the device for exclusive read/write access with the line fixed at
//! 8 data bits, one stop bit, no parity. The bounded data wait is realized
//! by polling the OS queued-byte count in short steps, which gives the same
//! observable contract as an event wait with a timeout.

use super::error::PortError;
use super::traits::{PortBackend, PortConfiguration};
use std::io::{Read, Write};
use std::time::{Duration, Instant};

/// Poll step used while waiting for inbound data.
const DATA_POLL_STEP: Duration = Duration::from_millis(5);

/// Platform backend for a physical or virtual serial device.
pub struct SyncSerialPort {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SyncSerialPort {
    /// Open and configure the device at `path`.
    ///
    /// The per-attempt timeout from `config` is applied at open so the very
    /// first read attempt is already bounded.
    pub fn open(path: &str, config: &PortConfiguration) -> Result<Self, PortError> {
        let port = serialport::new(path, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_secs(config.timeout_secs))
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice
                | serialport::ErrorKind::Io(std::io::ErrorKind::NotFound)
                | serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                    PortError::open(format!("{path}: {e}"))
                }
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: path.to_string(),
        })
    }
}

impl PortBackend for SyncSerialPort {
    fn write_some(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write(data).map_err(PortError::Io)
    }

    fn read_some(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.port.read(buffer).map_err(PortError::Io)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.port.set_timeout(timeout).map_err(PortError::Serial)
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(PortError::Serial)
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(PortError::Serial)
    }

    fn data_ready(&mut self, wait: Duration) -> Result<bool, PortError> {
        let deadline = Instant::now() + wait;
        loop {
            if self.bytes_to_read()? > 0 {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(DATA_POLL_STEP.min(deadline - now));
        }
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}
