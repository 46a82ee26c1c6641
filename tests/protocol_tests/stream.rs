//! Simulated streams
//!
//! Deliver and accept bytes in small chunks, with transient errors injected
//! between calls.

use std::io::{self, ErrorKind, Read, Write};

const TRANSIENT: [ErrorKind; 2] = [ErrorKind::Interrupted, ErrorKind::WouldBlock];

/// Reader handing out at most `chunk` bytes per successful call
pub struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    calls: usize,
}

impl TrickleReader {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk: chunk.max(1),
            calls: 0,
        }
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        // Every odd call fails transiently
        if self.calls % 2 == 1 {
            return Err(io::Error::from(TRANSIENT[(self.calls / 2) % 2]));
        }
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Writer accepting at most `chunk` bytes per successful call
pub struct TrickleWriter {
    pub data: Vec<u8>,
    chunk: usize,
    calls: usize,
    pub flushes: usize,
}

impl TrickleWriter {
    pub fn new(chunk: usize) -> Self {
        Self {
            data: Vec::new(),
            chunk: chunk.max(1),
            calls: 0,
            flushes: 0,
        }
    }
}

impl Write for TrickleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.calls % 3 == 0 {
            return Err(io::Error::from(TRANSIENT[(self.calls / 3) % 2]));
        }
        let n = self.chunk.min(buf.len());
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Reader that fails permanently once its data runs out
pub struct BrokenReader {
    data: Vec<u8>,
    pos: usize,
}

impl BrokenReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.data.len() {
            return Err(io::Error::from(ErrorKind::ConnectionReset));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
