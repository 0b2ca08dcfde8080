pub mod error;

use error::LinkError;
use heli_traits::{LinePort, PortOpener};
use std::io::Read;
use std::time::Duration;

/// Serial connection to the rig controller.
///
/// The read timeout is kept short on purpose: the transport's worker polls
/// this port once per loop iteration and must be able to observe its stop
/// flag between reads.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink {
    pub fn open(path: &str, baud: u32, read_timeout: Duration) -> error::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(read_timeout)
            .open()
            .map_err(LinkError::from)?;
        tracing::debug!(path, baud, "serial port opened");
        Ok(SerialLink { port })
    }
}

impl LinePort for SerialLink {
    fn read_available(
        &mut self,
        buf: &mut Vec<u8>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let pending = self.port.bytes_to_read().map_err(LinkError::from)? as usize;
        if pending == 0 {
            return Ok(0);
        }
        let start = buf.len();
        buf.resize(start + pending, 0);
        match self.port.read(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                buf.truncate(start);
                Ok(0)
            }
            Err(e) => {
                buf.truncate(start);
                Err(Box::new(LinkError::Io(e)))
            }
        }
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use std::io::Write;
        self.port
            .write_all(line.as_bytes())
            .and_then(|()| self.port.flush())
            .map_err(|e| Box::new(LinkError::Io(e)) as _)
    }
}

/// Opens a `SerialLink` with fixed parameters on every attempt; the
/// transport calls this once per `start()`.
pub struct SerialOpener {
    path: String,
    baud: u32,
    read_timeout: Duration,
}

impl SerialOpener {
    pub fn new(path: impl Into<String>, baud: u32, read_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            baud,
            read_timeout,
        }
    }
}

impl PortOpener for SerialOpener {
    fn open(&mut self) -> Result<Box<dyn LinePort>, Box<dyn std::error::Error + Send + Sync>> {
        let link = SerialLink::open(&self.path, self.baud, self.read_timeout)?;
        Ok(Box::new(link))
    }
}
