//! List the serial ports visible on this system.
//!
//! Useful before pointing `FramedPort::open` at a device path.
//!
//! ```bash
//! cargo run --example check_ports
//! ```

use serialport::{available_ports, SerialPortType};

fn main() {
    match available_ports() {
        Ok(ports) if ports.is_empty() => {
            println!("no serial ports detected");
            println!("(no devices connected, missing drivers, or insufficient permissions)");
        }
        Ok(ports) => {
            println!("found {} serial port(s):", ports.len());
            for port in &ports {
                match &port.port_type {
                    SerialPortType::UsbPort(usb) => {
                        print!(
                            "  {}  usb {:04x}:{:04x}",
                            port.port_name, usb.vid, usb.pid
                        );
                        if let Some(product) = &usb.product {
                            print!("  {product}");
                        }
                        println!();
                    }
                    SerialPortType::BluetoothPort => {
                        println!("  {}  bluetooth", port.port_name);
                    }
                    SerialPortType::PciPort => {
                        println!("  {}  pci", port.port_name);
                    }
                    SerialPortType::Unknown => {
                        println!("  {}", port.port_name);
                    }
                }
            }
        }
        Err(e) => eprintln!("could not enumerate serial ports: {e}"),
    }
}
