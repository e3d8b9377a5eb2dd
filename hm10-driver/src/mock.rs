//! Scripted transport for tests

use std::collections::VecDeque;
use std::time::Duration;

use crate::session::{DriverConfig, Hm10};
use crate::transport::Transport;

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("write failed")]
    Write,
    #[error("read timed out")]
    Timeout,
}

enum Reply {
    Bytes(Vec<u8>),
    Timeout,
}

/// Records every write and answers reads from a queue of canned replies.
///
/// An exhausted queue reads as `Ok(0)`.
#[derive(Default)]
pub struct MockTransport {
    pub writes: Vec<String>,
    pub timeouts: Vec<Duration>,
    replies: VecDeque<Reply>,
    fail_writes: bool,
    short_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, response: &str) -> Self {
        self.replies.push_back(Reply::Bytes(response.as_bytes().to_vec()));
        self
    }

    pub fn reply_bytes(mut self, response: &[u8]) -> Self {
        self.replies.push_back(Reply::Bytes(response.to_vec()));
        self
    }

    /// Put the self-test `OK` ahead of everything already scripted
    pub fn answering_self_test(mut self) -> Self {
        self.replies.push_front(Reply::Bytes(b"OK".to_vec()));
        self
    }

    pub fn timeout(mut self) -> Self {
        self.replies.push_back(Reply::Timeout);
        self
    }

    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn short_writes(mut self) -> Self {
        self.short_writes = true;
        self
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockError::Write);
        }
        self.writes.push(String::from_utf8_lossy(data).into_owned());
        if self.short_writes {
            return Ok(data.len() / 2);
        }
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        self.timeouts.push(timeout);
        match self.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Reply::Timeout) => Err(MockError::Timeout),
            None => Ok(0),
        }
    }
}

/// A session that passed its self-test, with `mock` answering what follows
pub fn bound(mock: MockTransport) -> Hm10<MockTransport> {
    match Hm10::init(mock.answering_self_test(), DriverConfig::default()) {
        Ok(hm10) => hm10,
        Err(e) => panic!("self-test failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_test_answer_is_read_first() {
        let mut mock = MockTransport::new()
            .reply("OK+SET:1")
            .answering_self_test();
        let mut buf = [0u8; 8];
        assert_eq!(mock.read(&mut buf, Duration::ZERO).ok(), Some(2));
        assert_eq!(&buf[..2], b"OK");
        assert_eq!(mock.read(&mut buf, Duration::ZERO).ok(), Some(8));
        assert_eq!(&buf, b"OK+SET:1");
        assert_eq!(mock.read(&mut buf, Duration::ZERO).ok(), Some(0));
    }
}
