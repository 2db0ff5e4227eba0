//! Connection
//!
//! Owns one transport to memcached plus the carry-over buffer of bytes read
//! past the end of the last frame. Exposes the two framing primitives the
//! protocol needs: a CRLF-terminated line, and an N-byte data block followed
//! by CRLF.
//!
//! Neither primitive cares where the socket splits its reads. A terminator
//! arriving as `\r` at the end of one chunk and `\n` at the start of the next
//! is found because each rescan starts one byte before the previous end of
//! the buffer.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, Bytes, BytesMut};

use super::transport::{Connector, Transport};
use crate::config::Config;
use crate::error::{MemcacheError, Result};
use crate::protocol::CRLF;

/// Bytes requested from the transport per read
pub const RECV_SIZE: usize = 4096;

/// Longest response line accepted before the peer is treated as broken
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// A single, exclusively owned connection to memcached
pub struct Connection {
    /// Underlying stream
    transport: Box<dyn Transport>,

    /// Bytes received but not yet handed out as a frame
    buffer: BytesMut,

    /// Server address for logging
    server: String,
}

impl Connection {
    /// Open a connection and apply the configured socket options
    ///
    /// The connect timeout covers only the handshake; the operation timeout
    /// is installed on the stream afterwards.
    pub fn open(connector: &dyn Connector, config: &Config) -> Result<Self> {
        let transport = connector.connect(&config.server, config.connect_timeout)?;

        transport.set_read_timeout(config.timeout)?;
        transport.set_write_timeout(config.timeout)?;
        if config.no_delay {
            transport.set_nodelay(true)?;
        }

        tracing::debug!("Connected to memcached at {}", config.server);

        Ok(Self::from_transport(transport, &config.server))
    }

    /// Wrap an already-connected transport
    pub fn from_transport(transport: Box<dyn Transport>, server: &str) -> Self {
        Self {
            transport,
            buffer: BytesMut::with_capacity(RECV_SIZE),
            server: server.to_string(),
        }
    }

    /// Write a complete command
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        tracing::trace!(
            "-> {}: {:?}",
            self.server,
            String::from_utf8_lossy(first_line(bytes))
        );
        self.transport.write_all(bytes)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Read one line, without its `\r\n`
    ///
    /// Fails with `UnexpectedClose` if the peer closes before the terminator,
    /// and with `Unknown` if more than [`MAX_LINE_LEN`] bytes arrive without one.
    pub fn read_line(&mut self) -> Result<Bytes> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = find_crlf(&self.buffer[scanned..]) {
                let line = self.buffer.split_to(scanned + pos).freeze();
                self.buffer.advance(CRLF.len());
                tracing::trace!("<- {}: {:?}", self.server, String::from_utf8_lossy(&line));
                return Ok(line);
            }
            if self.buffer.len() > MAX_LINE_LEN {
                return Err(MemcacheError::Unknown(format!(
                    "response line exceeds {} bytes",
                    MAX_LINE_LEN
                )));
            }
            // A trailing '\r' may still pair with a '\n' from the next read
            scanned = self.buffer.len().saturating_sub(1);
            self.fill()?;
        }
    }

    /// Read a data block of exactly `len` bytes plus its trailing `\r\n`
    pub fn read_value(&mut self, len: usize) -> Result<Bytes> {
        let needed = len.checked_add(CRLF.len()).ok_or_else(|| {
            MemcacheError::Unknown(format!("data block length {} out of range", len))
        })?;
        if self.buffer.len() < needed {
            self.buffer.reserve(needed - self.buffer.len());
        }
        while self.buffer.len() < needed {
            self.fill()?;
        }

        if &self.buffer[len..needed] != CRLF {
            return Err(MemcacheError::Unknown(format!(
                "data block of {} bytes not terminated by CRLF",
                len
            )));
        }

        let value = self.buffer.split_to(len).freeze();
        self.buffer.advance(CRLF.len());
        Ok(value)
    }

    /// Bytes read from the socket but not consumed by any frame yet
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Shut the stream down. Errors are irrelevant at this point.
    pub fn close(self) {
        tracing::debug!("Closing connection to {}", self.server);
        let _ = self.transport.shutdown();
    }

    /// Append one read's worth of bytes to the buffer
    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; RECV_SIZE];
        loop {
            match self.transport.read(&mut chunk) {
                Ok(0) => return Err(MemcacheError::UnexpectedClose),
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Position of the first `\r\n`; a lone `\r` is skipped
fn find_crlf(data: &[u8]) -> Option<usize> {
    memchr::memchr_iter(b'\r', data).find(|&pos| data.get(pos + 1) == Some(&b'\n'))
}

fn first_line(bytes: &[u8]) -> &[u8] {
    match find_crlf(bytes) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}
