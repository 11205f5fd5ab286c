//! Port abstraction layer.
//!
//! Defines the platform-backend boundary (`PortBackend`), the real-hardware
//! backend, a scriptable mock for tests, and the shared error taxonomy.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::SyncSerialPort;
pub use traits::{PortBackend, PortConfiguration};
