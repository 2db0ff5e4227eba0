//! Network Module
//!
//! Socket ownership and response framing.
//!
//! ## Architecture
//! - One [`Connection`] per client, never shared
//! - Blocking reads and writes, bounded by the configured timeout
//! - Transports are pluggable through [`Connector`]

mod connection;
mod transport;

pub use connection::{Connection, MAX_LINE_LEN, RECV_SIZE};
pub use transport::{Connector, TcpConnector, Transport};
