//! Serial port channel implementation

use super::{Channel, TransportError};
use serde::{Deserialize, Serialize};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// How long one [`Channel::read_chunk`] poll blocks waiting for data. The
/// transaction deadline is owned by the caller, so this only bounds the
/// granularity of timeout checks.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial port flow control type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerialFlowControl {
    /// No flow control
    #[default]
    None,
    /// Hardware flow control (RTS/CTS)
    Hardware,
    /// Software flow control (XON/XOFF)
    Software,
}

/// Serial port parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerialParity {
    /// No parity
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl std::str::FromStr for SerialParity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "odd" | "o" => Ok(Self::Odd),
            "even" | "e" => Ok(Self::Even),
            _ => Ok(Self::None),
        }
    }
}

/// Serial channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Port name (e.g., COM3, /dev/ttyUSB0)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5, 6, 7, 8)
    pub data_bits: u8,
    /// Stop bits (1, 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Flow control
    pub flow_control: SerialFlowControl,
    /// Response deadline for one transaction, in milliseconds
    pub response_timeout_ms: u64,
}

impl SerialSettings {
    /// Create serial settings with default framing parameters (8N1, no flow
    /// control, 1 second response deadline)
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: SerialFlowControl::None,
            response_timeout_ms: 1000,
        }
    }

    /// Set data bits
    #[must_use]
    pub fn data_bits(mut self, bits: u8) -> Self {
        self.data_bits = bits;
        self
    }

    /// Set stop bits
    #[must_use]
    pub fn stop_bits(mut self, bits: u8) -> Self {
        self.stop_bits = bits;
        self
    }

    /// Set parity
    #[must_use]
    pub fn parity(mut self, parity: SerialParity) -> Self {
        self.parity = parity;
        self
    }

    /// Set flow control
    #[must_use]
    pub fn flow_control(mut self, flow: SerialFlowControl) -> Self {
        self.flow_control = flow;
        self
    }

    /// Set the response deadline in milliseconds
    #[must_use]
    pub fn response_timeout_ms(mut self, ms: u64) -> Self {
        self.response_timeout_ms = ms;
        self
    }

    /// Response deadline as a [`Duration`]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        // Reference peer configuration.
        Self::new("/dev/ttyUSB0", 9600)
    }
}

/// Serial port channel
///
/// Owns the open port exclusively; the handle closes when the channel is
/// dropped, on every exit path.
pub struct SerialChannel {
    settings: SerialSettings,
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Open and configure the port described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::PortNotFound`],
    /// [`TransportError::PermissionDenied`], or
    /// [`TransportError::OpenFailed`] depending on why the port could not be
    /// opened.
    pub fn open(settings: SerialSettings) -> Result<Self, TransportError> {
        let data_bits = match settings.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };

        let stop_bits = match settings.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        };

        let parity = match settings.parity {
            SerialParity::Odd => Parity::Odd,
            SerialParity::Even => Parity::Even,
            SerialParity::None => Parity::None,
        };

        let flow_control = match settings.flow_control {
            SerialFlowControl::Hardware => FlowControl::Hardware,
            SerialFlowControl::Software => FlowControl::Software,
            SerialFlowControl::None => FlowControl::None,
        };

        let port = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => {
                    TransportError::PortNotFound(settings.port.clone())
                }
                serialport::ErrorKind::Io(io_kind) => match io_kind {
                    std::io::ErrorKind::PermissionDenied => {
                        TransportError::PermissionDenied(settings.port.clone())
                    }
                    _ => TransportError::OpenFailed(e.to_string()),
                },
                _ => TransportError::OpenFailed(e.to_string()),
            })?;

        tracing::info!(
            port = %settings.port,
            baud = settings.baud_rate,
            "serial channel open"
        );

        Ok(Self { settings, port })
    }

    /// Settings the channel was opened with
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

impl Channel for SerialChannel {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.port.write(data).map_err(TransportError::Io)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.port.flush().map_err(TransportError::Io)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            // No data arrived within the poll window.
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn discard_input(&mut self) -> Result<(), TransportError> {
        tracing::debug!(port = %self.settings.port, "discarding pending input");
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| TransportError::Io(e.into()))
    }

    fn connection_info(&self) -> String {
        format!(
            "{} @ {} baud ({}{}{} {})",
            self.settings.port,
            self.settings.baud_rate,
            self.settings.data_bits,
            match self.settings.parity {
                SerialParity::None => "N",
                SerialParity::Odd => "O",
                SerialParity::Even => "E",
            },
            self.settings.stop_bits,
            match self.settings.flow_control {
                SerialFlowControl::None => "No FC",
                SerialFlowControl::Hardware => "HW FC",
                SerialFlowControl::Software => "SW FC",
            }
        )
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>, TransportError> {
    serialport::available_ports().map_err(|e| TransportError::Io(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_builder() {
        let settings = SerialSettings::new("/dev/ttyACM0", 9600)
            .parity(SerialParity::Even)
            .stop_bits(2)
            .response_timeout_ms(250);
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.parity, SerialParity::Even);
        assert_eq!(settings.stop_bits, 2);
        assert_eq!(settings.response_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_parity_from_str() {
        assert_eq!("even".parse::<SerialParity>(), Ok(SerialParity::Even));
        assert_eq!("O".parse::<SerialParity>(), Ok(SerialParity::Odd));
        assert_eq!("none".parse::<SerialParity>(), Ok(SerialParity::None));
    }
}
