//! Simple compute example
//!
//! Frames a short message, sends it to the coprocessor, and prints the
//! response as hex.
//!
//! Usage:
//!   cargo run --example simple_compute -- /dev/ttyUSB0 [baud] [message]

use blocklink_core::{compute, SerialChannel, SerialSettings};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let (port, baud_rate, message) = match args.len() {
        4 => (args[1].clone(), args[2].parse().unwrap_or(9600), args[3].clone()),
        3 => (args[1].clone(), args[2].parse().unwrap_or(9600), "abc".to_string()),
        2 => (args[1].clone(), 9600, "abc".to_string()),
        _ => {
            // List available ports
            println!("Usage: simple_compute <port> [baud_rate] [message]");
            println!("\nAvailable ports:");
            for port in serialport::available_ports()? {
                println!("  {}", port.port_name);
            }
            return Ok(());
        }
    };

    println!("Connecting to {} at {} baud...", port, baud_rate);

    let settings = SerialSettings::new(&port, baud_rate);
    let timeout = settings.response_timeout();
    let mut channel = SerialChannel::open(settings)?;

    println!("Sending {:?} ({} bytes)...", message, message.len());
    let response = compute(&mut channel, message.as_bytes(), timeout)?;

    println!("{}", hex::encode(&response));
    Ok(())
}
