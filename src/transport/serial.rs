use std::io;
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::config::SerialConfig;
use crate::error::AppResult;
use crate::transport::Transport;

/// Serial port handle as returned by the `serialport` crate.
pub type SerialTransport = Box<dyn SerialPort>;

impl Transport for SerialTransport {
    fn discard_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

/// Open the serial line to a Pulsar.
///
/// Line settings are fixed at 8N1 with no flow control; only the baud rate
/// and read timeout come from `config`. Open failures are returned as
/// [`PulsarError::Serial`](crate::error::PulsarError::Serial) unchanged.
pub fn open_serial(config: &SerialConfig) -> AppResult<SerialTransport> {
    let port = serialport::new(&config.address, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(config.timeout_ms))
        .open()?;

    debug!(
        "Serial port '{}' opened at {} baud",
        config.address, config.baud_rate
    );
    Ok(port)
}
