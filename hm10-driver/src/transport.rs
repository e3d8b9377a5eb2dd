//! Transport abstraction traits
//!
//! The driver is handed a byte channel and never opens, configures or closes
//! the device behind it. Whoever owns the serial port implements [`Transport`].

use std::time::Duration;

/// Byte channel to the module
pub trait Transport {
    /// Error type for transport operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a command, returning the number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read at most `buf.len()` bytes, blocking up to `timeout`.
    ///
    /// `Ok(0)` means nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        (**self).read(buf, timeout)
    }
}

/// Negative status returned by a raw transport function
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("transport returned status {0}")]
pub struct StatusError(pub i32);

/// Adapter for a C-style binding: a write function and a
/// read-with-timeout function, both returning a byte count or a negative
/// status.
///
/// ```ignore
/// let transport = FnTransport::new(
///     |data: &[u8]| uart_send(data),
///     |buf: &mut [u8], max_len: u16, timeout_ms: u32| uart_read(buf, max_len, timeout_ms),
/// );
/// ```
pub struct FnTransport<W, R> {
    write: W,
    read: R,
}

impl<W, R> FnTransport<W, R>
where
    W: FnMut(&[u8]) -> i32,
    R: FnMut(&mut [u8], u16, u32) -> i32,
{
    pub fn new(write: W, read: R) -> Self {
        Self { write, read }
    }
}

impl<W, R> Transport for FnTransport<W, R>
where
    W: FnMut(&[u8]) -> i32,
    R: FnMut(&mut [u8], u16, u32) -> i32,
{
    type Error = StatusError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let status = (self.write)(data);
        usize::try_from(status).map_err(|_| StatusError(status))
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        let max_len = u16::try_from(buf.len()).unwrap_or(u16::MAX);
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let status = (self.read)(&mut buf[..usize::from(max_len)], max_len, timeout_ms);
        let count = usize::try_from(status).map_err(|_| StatusError(status))?;
        Ok(count.min(usize::from(max_len)))
    }
}
