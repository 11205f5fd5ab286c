//! Walkthrough of the framed port API over the mock backend.
//!
//! Runs without hardware: a cloned mock handle plays the device side while
//! a `FramedPort` drives the caller side of a request/response exchange.
//!
//! ```bash
//! cargo run --example port_usage
//! ```

use serialframe::port::MockSerialPort;
use serialframe::{FramedPort, PortConfiguration, ReadOutcome};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let mut device = MockSerialPort::new("MOCK0");
    let config = PortConfiguration {
        terminator: Some(b'\n'),
        ..Default::default()
    };
    let mut port = FramedPort::with_backend(Box::new(device.clone()), config)?;

    // Request/response turn: send a command, then read the scripted reply.
    port.write(b"*IDN?\n")?;
    println!("sent: {:?}", String::from_utf8_lossy(&device.written()));

    device.enqueue_read(b"MOCK-INSTRUMENT,0.1\n");
    port.wait_for_data()?;

    let mut buf = [0u8; 64];
    match port.read(&mut buf)? {
        ReadOutcome::Received(n) => {
            println!("received {n} bytes: {:?}", String::from_utf8_lossy(&buf[..n]));
        }
        ReadOutcome::NothingReceived => println!("no response before the timeout"),
    }

    // A silent device is an outcome, not an error.
    match port.read(&mut buf)? {
        ReadOutcome::NothingReceived => println!("silent device: nothing received"),
        ReadOutcome::Received(n) => println!("unexpected {n} bytes"),
    }

    port.close();
    println!("closed; further operations now fail: {:?}", port.flush().unwrap_err());

    // To talk to real hardware instead:
    //   let mut config = PortConfiguration::default();
    //   config.baud_rate = 115200;
    //   let port = FramedPort::open("/dev/ttyUSB0", config)?;
    Ok(())
}
