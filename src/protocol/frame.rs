//! Frame transport
//!
//! Length-prefixed frames over a pair of byte streams.
//!
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Len (4, BE)  │     Payload (Len bytes)     │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! Reads and writes resume where they stopped after `Interrupted` or
//! `WouldBlock`; every other failure is returned to the caller.

use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;

use crate::error::{PortError, Result};

/// Size of the length prefix
pub const HEADER_SIZE: usize = 4;

/// One message on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
}

impl Frame {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Read one frame
///
/// Returns `Ok(None)` when the stream ends cleanly before a new frame
/// starts. Ending anywhere inside a frame is an error, as is a length
/// prefix above `max_len`.
pub fn read_frame<R: Read>(reader: &mut R, max_len: u32) -> Result<Option<Frame>> {
    let mut header = [0u8; HEADER_SIZE];
    let got = read_full(reader, &mut header)?;
    if got == 0 {
        return Ok(None);
    }
    if got < HEADER_SIZE {
        return Err(PortError::Transport(format!(
            "EOF after {} of {} length prefix bytes",
            got, HEADER_SIZE
        )));
    }

    let len = u32::from_be_bytes(header);
    if len > max_len {
        return Err(PortError::Transport(format!(
            "frame too large: {} bytes (max {})",
            len, max_len
        )));
    }

    let mut payload = vec![0u8; len as usize];
    let got = read_full(reader, &mut payload)?;
    if got < payload.len() {
        return Err(PortError::Transport(format!(
            "EOF trying to read additional {} bytes of a {} byte frame",
            payload.len() - got,
            len
        )));
    }

    Ok(Some(Frame::new(payload)))
}

/// Write one frame and flush it
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        PortError::Transport(format!(
            "payload of {} bytes does not fit a frame",
            payload.len()
        ))
    })?;

    write_full(writer, &len.to_be_bytes())?;
    write_full(writer, payload)?;

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(e) if is_transient(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Fill `buf`, returning how many bytes arrived before EOF
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if is_transient(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn write_full<W: Write>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err(PortError::Io(std::io::Error::new(
                    ErrorKind::WriteZero,
                    format!("wrote 0 bytes with {} pending", buf.len() - written),
                )))
            }
            Ok(n) => written += n,
            Err(e) if is_transient(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn is_transient(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
