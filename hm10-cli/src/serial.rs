//! Serial port transport

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use hm10_driver::Transport;
use serialport::{ClearBuffer, SerialPort};

/// A UART the module hangs off.
///
/// The module never terminates its answers, so a read ends when the buffer is
/// full, when the line has been quiet for `idle_gap` after the first byte, or
/// at the driver's timeout.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    idle_gap: Duration,
}

impl SerialTransport {
    pub fn open(path: &str, baud_rate: u32, idle_gap: Duration) -> serialport::Result<Self> {
        let port = serialport::new(path, baud_rate).timeout(idle_gap).open()?;
        // stale bytes would be taken for the first answer
        port.clear(ClearBuffer::All)?;
        log::debug!("opened {path} at {baud_rate} baud");
        Ok(Self { port, idle_gap })
    }
}

impl Transport for SerialTransport {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        read_response(&mut self.port, buf, timeout, self.idle_gap)
    }
}

/// A port that can wait a bounded time for bytes
trait TimedRead {
    fn read_within(&mut self, buf: &mut [u8], wait: Duration) -> io::Result<usize>;
}

impl TimedRead for Box<dyn SerialPort> {
    fn read_within(&mut self, buf: &mut [u8], wait: Duration) -> io::Result<usize> {
        self.set_timeout(wait)?;
        Read::read(self, buf)
    }
}

/// Fill `buf` until it is full, `timeout` passes, or the line goes quiet for
/// `idle_gap` after the first byte
fn read_response<P: TimedRead>(
    port: &mut P,
    buf: &mut [u8],
    timeout: Duration,
    idle_gap: Duration,
) -> io::Result<usize> {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;

    while filled < buf.len() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let remaining = deadline - now;
        let wait = if filled == 0 {
            remaining
        } else {
            idle_gap.min(remaining)
        };

        match port.read_within(&mut buf[filled..], wait) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                if filled > 0 {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
