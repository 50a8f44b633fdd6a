//! Serial port channel backed by the `serialport` crate

use std::io::{self, BufRead, BufReader, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use super::channel::SerialChannel;
use super::error::{LinkError, LinkResult};

/// A USB/UART serial port read line by line with a short read timeout.
pub struct SerialPortChannel {
    reader: BufReader<Box<dyn SerialPort>>,
    writer: Box<dyn SerialPort>,
    partial: Vec<u8>,
}

impl SerialPortChannel {
    /// Opens `port` at `baud_rate`; reads give up after `read_timeout`.
    ///
    /// # Errors
    /// [`LinkError::Open`] if the port cannot be opened or cloned.
    pub fn open(port: &str, baud_rate: u32, read_timeout: Duration) -> LinkResult<Self> {
        let open_error = |source| LinkError::Open { port: port.to_string(), source };

        let reader = serialport::new(port, baud_rate).timeout(read_timeout).open().map_err(open_error)?;
        let writer = reader.try_clone().map_err(open_error)?;

        info!(port, baud_rate, read_timeout_ms = read_timeout.as_millis(), "Serial port opened");
        Ok(Self { reader: BufReader::new(reader), writer, partial: Vec::new() })
    }
}

impl SerialChannel for SerialPortChannel {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.reader.read_until(b'\n', &mut self.partial) {
            Ok(0) => Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
            Ok(_) if self.partial.ends_with(b"\n") => {
                let bytes = std::mem::take(&mut self.partial);
                Ok(Some(String::from_utf8_lossy(&bytes).trim_end_matches(['\r', '\n']).to_string()))
            }
            // Partial line; the rest arrives on a later read.
            Ok(_) => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
