//! Scriptable in-memory backend for testing without hardware.
//!
//! A `MockSerialPort` answers reads from an enqueued byte queue, records
//! every write attempt, and can inject attempt failures, cap write chunk
//! sizes to force partial transfers, or loop written bytes back into the
//! read queue. An empty read queue behaves like an expired bounded wait.

use super::error::PortError;
use super::traits::PortBackend;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes handed out by read attempts, in order.
    read_queue: VecDeque<u8>,
    /// Every write attempt's accepted chunk, in order.
    write_log: Vec<Vec<u8>>,
    /// Upper bound on bytes accepted per write attempt, to force the
    /// framed layer through its partial-write path.
    max_write_chunk: Option<usize>,
    /// Remaining read attempts that fail with an injected device fault.
    read_faults: u32,
    /// Remaining write attempts that fail with an injected device fault.
    write_faults: u32,
    /// Feed written bytes straight back into the read queue.
    loopback: bool,
    /// Set once `clear_buffers` has run.
    cleared: bool,
    timeout: Duration,
}

/// Mock serial port backend.
///
/// Clones share state, so a test can keep a handle for inspection after
/// boxing another into a [`FramedPort`](crate::FramedPort).
///
/// # Example
/// ```
/// use serialframe::port::{MockSerialPort, PortBackend};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"READY\n");
///
/// let mut buffer = [0u8; 6];
/// let n = port.read_some(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"READY\n");
///
/// port.write_some(b"ACK\n").unwrap();
/// assert_eq!(port.written(), b"ACK\n");
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// Append bytes for subsequent read attempts to hand out.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().unwrap().read_queue.extend(data);
    }

    /// Cap how many bytes a single write attempt accepts.
    pub fn set_max_write_chunk(&mut self, max: usize) {
        self.state.lock().unwrap().max_write_chunk = Some(max);
    }

    /// Make the next `count` read attempts fail with a device fault.
    pub fn inject_read_faults(&mut self, count: u32) {
        self.state.lock().unwrap().read_faults = count;
    }

    /// Make the next `count` write attempts fail with a device fault.
    pub fn inject_write_faults(&mut self, count: u32) {
        self.state.lock().unwrap().write_faults = count;
    }

    /// Feed accepted write bytes back into the read queue.
    pub fn set_loopback(&mut self, enabled: bool) {
        self.state.lock().unwrap().loopback = enabled;
    }

    /// All bytes accepted across write attempts, flattened in order.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().write_log.concat()
    }

    /// The individual chunks accepted per write attempt.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().write_log.clone()
    }

    /// Whether `clear_buffers` has run since construction.
    pub fn was_cleared(&self) -> bool {
        self.state.lock().unwrap().cleared
    }

    /// Bytes still queued for reading.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().unwrap().read_queue.len()
    }

    /// The most recently applied per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.state.lock().unwrap().timeout
    }
}

impl PortBackend for MockSerialPort {
    fn write_some(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        if state.write_faults > 0 {
            state.write_faults -= 1;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected write fault",
            )));
        }

        let n = match state.max_write_chunk {
            Some(max) => data.len().min(max),
            None => data.len(),
        };
        let chunk = &data[..n];
        state.write_log.push(chunk.to_vec());
        if state.loopback {
            state.read_queue.extend(chunk.iter().copied());
        }
        Ok(n)
    }

    fn read_some(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        if state.read_faults > 0 {
            state.read_faults -= 1;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected read fault",
            )));
        }

        let mut bytes_read = 0;
        for slot in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            // An empty queue models the bounded wait expiring with no data.
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "no data available within timeout",
            )));
        }
        Ok(bytes_read)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state.lock().unwrap().timeout = timeout;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.read_queue.clear();
        state.cleared = true;
        Ok(())
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        Ok(self.state.lock().unwrap().read_queue.len())
    }

    fn data_ready(&mut self, _wait: Duration) -> Result<bool, PortError> {
        Ok(!self.state.lock().unwrap().read_queue.is_empty())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
