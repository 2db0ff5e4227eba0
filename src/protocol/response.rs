//! Response line parsing
//!
//! Every line memcached sends back is first run through
//! [`check_error_line`]; only lines that are not errors reach the
//! command-specific parsers below.
//!
//! Response lines:
//! - `STORED` / `NOT_STORED` / `EXISTS` / `NOT_FOUND` - storage outcomes
//! - `VALUE <key> <flags> <bytes> [<cas>]` - header of a retrieved item
//! - `STAT <name> <value>` - one stats entry
//! - `END` - terminates retrieval and stats
//! - `ERROR` / `CLIENT_ERROR <msg>` / `SERVER_ERROR <msg>`

use crate::error::{MemcacheError, Result};

pub const END: &[u8] = b"END";
pub const OK: &[u8] = b"OK";
pub const DELETED: &[u8] = b"DELETED";
pub const TOUCHED: &[u8] = b"TOUCHED";
pub const NOT_FOUND: &[u8] = b"NOT_FOUND";

const VALUE_PREFIX: &[u8] = b"VALUE ";
const STAT_PREFIX: &[u8] = b"STAT ";
const VERSION_PREFIX: &[u8] = b"VERSION ";
const ERROR: &[u8] = b"ERROR";
const CLIENT_ERROR: &[u8] = b"CLIENT_ERROR";
const SERVER_ERROR: &[u8] = b"SERVER_ERROR";

/// Raise the matching error if `line` is an error response.
///
/// Returns `Ok(())` for any other line.
pub fn check_error_line(line: &[u8]) -> Result<()> {
    if line.starts_with(ERROR) {
        return Err(MemcacheError::UnknownCommand);
    }
    if line.starts_with(CLIENT_ERROR) {
        return Err(MemcacheError::Client(error_message(&line[CLIENT_ERROR.len()..])));
    }
    if line.starts_with(SERVER_ERROR) {
        return Err(MemcacheError::Server(error_message(&line[SERVER_ERROR.len()..])));
    }
    Ok(())
}

fn error_message(rest: &[u8]) -> String {
    let rest = rest.strip_prefix(b" ").unwrap_or(rest);
    String::from_utf8_lossy(rest).into_owned()
}

// =============================================================================
// Storage Outcomes
// =============================================================================

/// Result line of a storage command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    NotStored,
    Exists,
    NotFound,
}

impl StoreOutcome {
    /// Parse an outcome token; `None` if the line is not one.
    pub fn parse(line: &[u8]) -> Option<Self> {
        match line {
            b"STORED" => Some(StoreOutcome::Stored),
            b"NOT_STORED" => Some(StoreOutcome::NotStored),
            b"EXISTS" => Some(StoreOutcome::Exists),
            b"NOT_FOUND" => Some(StoreOutcome::NotFound),
            _ => None,
        }
    }
}

// =============================================================================
// Retrieval
// =============================================================================

/// Parsed `VALUE` line; the data block of `len` bytes follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueHeader {
    pub key: Vec<u8>,
    pub flags: u32,
    pub len: usize,
    pub cas: Option<u64>,
}

pub fn is_value_line(line: &[u8]) -> bool {
    line.starts_with(VALUE_PREFIX)
}

/// Parse `VALUE <key> <flags> <bytes> [<cas>]`
pub fn parse_value_header(line: &[u8]) -> Result<ValueHeader> {
    let rest = line
        .strip_prefix(VALUE_PREFIX)
        .ok_or_else(|| MemcacheError::unknown_line(line))?;

    let mut fields = rest.split(|&b| b == b' ').filter(|f| !f.is_empty());
    let key = fields.next().ok_or_else(|| MemcacheError::unknown_line(line))?;
    let flags = fields
        .next()
        .and_then(parse_number::<u32>)
        .ok_or_else(|| MemcacheError::unknown_line(line))?;
    let len = fields
        .next()
        .and_then(parse_number::<usize>)
        .ok_or_else(|| MemcacheError::unknown_line(line))?;
    let cas = match fields.next() {
        Some(field) => {
            Some(parse_number::<u64>(field).ok_or_else(|| MemcacheError::unknown_line(line))?)
        }
        None => None,
    };
    if fields.next().is_some() {
        return Err(MemcacheError::unknown_line(line));
    }

    Ok(ValueHeader {
        key: key.to_vec(),
        flags,
        len,
        cas,
    })
}

// =============================================================================
// Stats / Version / Numeric
// =============================================================================

pub fn is_stat_line(line: &[u8]) -> bool {
    line.starts_with(STAT_PREFIX)
}

/// Parse `STAT <name> <value>`. The value keeps any embedded spaces.
pub fn parse_stat_line(line: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let rest = line
        .strip_prefix(STAT_PREFIX)
        .ok_or_else(|| MemcacheError::unknown_line(line))?;
    let mut parts = rest.splitn(2, |&b| b == b' ');
    match (parts.next(), parts.next()) {
        (Some(name), Some(value)) if !name.is_empty() => Ok((name.to_vec(), value.to_vec())),
        _ => Err(MemcacheError::unknown_line(line)),
    }
}

/// Parse `VERSION <text>`
pub fn parse_version_line(line: &[u8]) -> Result<String> {
    line.strip_prefix(VERSION_PREFIX)
        .map(|v| String::from_utf8_lossy(v).into_owned())
        .ok_or_else(|| MemcacheError::unknown_line(line))
}

/// Parse the bare integer returned by `incr`/`decr`.
///
/// memcached may pad the number with trailing spaces after a `decr`.
pub fn parse_numeric_line(line: &[u8]) -> Result<u64> {
    let trimmed = match line.iter().rposition(|&b| b != b' ') {
        Some(end) => &line[..=end],
        None => line,
    };
    parse_number::<u64>(trimmed).ok_or_else(|| MemcacheError::unknown_line(line))
}

fn parse_number<T: std::str::FromStr>(field: &[u8]) -> Option<T> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}
