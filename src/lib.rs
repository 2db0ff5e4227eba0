//! # memwire
//!
//! A blocking client for the memcached text protocol:
//! - One persistent TCP connection per client, opened lazily
//! - Response framing that is indifferent to how reads split the stream
//! - Typed errors mirroring memcached's `ERROR` / `CLIENT_ERROR` / `SERVER_ERROR`
//! - Pluggable value serialization
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                               │
//! │      get / set / cas / delete / incr / touch / stats ...     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    Protocol     │                │   Serializer    │
//!   │ keys / encoding │                │ (bytes, flags)  │
//!   │ response lines  │                └─────────────────┘
//!   └────────┬────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │   Connection    │
//!   │ line / value    │
//!   │ framing, buffer │
//!   └────────┬────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │    Transport    │
//!   │  (TcpStream)    │
//!   └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memwire::{Client, Config};
//!
//! # fn main() -> memwire::Result<()> {
//! let mut client = Client::new(Config::builder().server("127.0.0.1:11211").build());
//! client.set("greeting", b"hello", 0, false)?;
//! assert_eq!(client.get("greeting")?, Some(b"hello".to_vec()));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod serializer;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemcacheError, Result};
pub use config::Config;
pub use client::Client;
pub use protocol::{KeyRef, StatValue};
pub use serializer::{BincodeSerde, Deserializer, RawSerde, Serializer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
