//! The input side: how bytes get from a child process (or test harness)
//! into `Terminal::feed`, and how key/mouse encodings get written back.
//! spec.md §9 DESIGN NOTES calls for a tagged variant in place of
//! virtual dispatch across platform pty backends, so `Pty` stays a sum
//! type even though only `Mock` has a body in this crate.

use std::io::{self, Read, Write};

use crate::error::{Result, VtError};

/// The channel a `Terminal` reads from and writes encoded input to.
pub trait PtyChannel {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    fn resize(&mut self, cols: u16, rows: u16) -> Result<()>;
}

/// A host-process pty backend. Only `Mock` is implemented here; the
/// `Posix`/`ConPty` arms are left as the shape a real host fills in
/// (the spawn/IOCTL-heavy platform code is explicitly out of scope per
/// spec.md's Non-goals around deployment/process management).
pub enum Pty {
    Mock(MockPty),
}

impl PtyChannel for Pty {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Pty::Mock(m) => m.read_nonblocking(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Pty::Mock(m) => m.write_all(buf),
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        match self {
            Pty::Mock(m) => m.resize(cols, rows),
        }
    }
}

/// An in-memory pty stand-in: `inbound` is what the "child" sent (fed to
/// the terminal), `outbound` collects whatever the terminal writes back
/// (key reports, DA/DSR responses, ...).
#[derive(Default)]
pub struct MockPty {
    pub inbound: std::collections::VecDeque<u8>,
    pub outbound: Vec<u8>,
    pub size: (u16, u16),
}

impl MockPty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }
}

impl PtyChannel for MockPty {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.outbound.extend_from_slice(buf);
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.size = (cols, rows);
        Ok(())
    }
}

/// Adapt any `Read + Write` (e.g. a real OS pty master opened by the
/// host) into a `PtyChannel`, translating `WouldBlock` into "read 0".
pub struct IoPty<T> {
    inner: T,
}

impl<T: Read + Write> IoPty<T> {
    pub fn new(inner: T) -> Self {
        IoPty { inner }
    }
}

impl<T: Read + Write> PtyChannel for IoPty<T> {
    /// `Ok(0)` covers both "nothing available right now" and end of
    /// stream; per spec the core never distinguishes the two on the
    /// read side, it just keeps running with no input until the host
    /// tears it down.
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(VtError::Spawn(e)),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        match self.inner.write_all(buf) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Err(VtError::ChannelClosed),
            other => other.map_err(VtError::Spawn),
        }
    }

    fn resize(&mut self, _cols: u16, _rows: u16) -> Result<()> {
        Ok(())
    }
}
