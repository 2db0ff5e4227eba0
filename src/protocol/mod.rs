//! Protocol Module
//!
//! Encoding and parsing for the memcached ASCII protocol (subset).
//!
//! ## Requests
//! ```text
//! <set|add|replace|append|prepend> <key> <flags> <exptime> <bytes> [noreply]\r\n<data>\r\n
//! cas <key> <flags> <exptime> <bytes> <cas_unique> [noreply]\r\n<data>\r\n
//! <get|gets> <key>*\r\n
//! delete <key> [noreply]\r\n
//! <incr|decr> <key> <value> [noreply]\r\n
//! touch <key> <exptime> [noreply]\r\n
//! stats [args]\r\n
//! flush_all [delay] [noreply]\r\n
//! version\r\n
//! quit\r\n
//! ```
//!
//! ## Responses
//! Line-oriented; the only length-prefixed part is the data block following
//! a `VALUE` line. Framing of both lives in [`crate::network::Connection`].

mod command;
mod key;
mod response;
mod stats;

pub use command::{encode_fetch, encode_misc, encode_store, StoreCommand, CRLF};
pub use key::{check_arg, check_key, KeyRef, MAX_KEY_LEN};
pub use response::{
    check_error_line, is_stat_line, is_value_line, parse_numeric_line, parse_stat_line,
    parse_value_header, parse_version_line, StoreOutcome, ValueHeader, DELETED, END, NOT_FOUND,
    OK, TOUCHED,
};
pub use stats::{coerce_stat, coerce_stats, StatValue};
