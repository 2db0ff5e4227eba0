//! Transport abstraction
//!
//! The client talks to memcached through a boxed [`Transport`] produced by a
//! [`Connector`]. The default connector opens a plain `TcpStream`; tests and
//! alternative I/O stacks plug in their own.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// A bidirectional byte stream to one memcached server
pub trait Transport: Read + Write + Send {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Toggle low-latency mode (TCP_NODELAY for sockets)
    fn set_nodelay(&self, enabled: bool) -> io::Result<()>;

    /// Close both directions of the stream
    fn shutdown(&self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn set_nodelay(&self, enabled: bool) -> io::Result<()> {
        TcpStream::set_nodelay(self, enabled)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens transports; the override point for sockets
pub trait Connector: Send + Sync {
    fn connect(&self, server: &str, timeout: Option<Duration>) -> io::Result<Box<dyn Transport>>;
}

/// Connects over TCP using `std::net`
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, server: &str, timeout: Option<Duration>) -> io::Result<Box<dyn Transport>> {
        let mut last_err = None;

        // Try every resolved address, like TcpStream::connect does
        for addr in server.to_socket_addrs()? {
            let attempt = match timeout {
                Some(t) => TcpStream::connect_timeout(&addr, t),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(Box::new(stream)),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("could not resolve server address: {}", server),
            )
        }))
    }
}
