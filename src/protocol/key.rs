//! Key validation
//!
//! memcached keys are at most 250 bytes with no whitespace. The configured
//! prefix counts toward both limits.

use crate::error::{MemcacheError, Result};

/// Longest key memcached accepts, prefix included
pub const MAX_KEY_LEN: usize = 250;

/// A user-supplied key, either text or raw bytes.
///
/// Text keys must be pure ASCII; byte keys are taken as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> KeyRef<'a> {
    /// The key's bytes before prefixing
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            KeyRef::Text(s) => s.as_bytes(),
            KeyRef::Bytes(b) => b,
        }
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(key: &'a str) -> Self {
        KeyRef::Text(key)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(key: &'a String) -> Self {
        KeyRef::Text(key.as_str())
    }
}

impl<'a> From<&'a [u8]> for KeyRef<'a> {
    fn from(key: &'a [u8]) -> Self {
        KeyRef::Bytes(key)
    }
}

impl<'a> From<&'a Vec<u8>> for KeyRef<'a> {
    fn from(key: &'a Vec<u8>) -> Self {
        KeyRef::Bytes(key.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for KeyRef<'a> {
    fn from(key: &'a [u8; N]) -> Self {
        KeyRef::Bytes(key.as_slice())
    }
}

/// Validate a key and return `prefix + key` as sent on the wire.
///
/// Fails with `IllegalInput` for non-ASCII text, whitespace anywhere in the
/// prefixed key, or a prefixed key longer than [`MAX_KEY_LEN`].
pub fn check_key(key: KeyRef<'_>, prefix: &[u8]) -> Result<Vec<u8>> {
    if let KeyRef::Text(text) = key {
        if !text.is_ascii() {
            return Err(MemcacheError::IllegalInput(format!(
                "non-ASCII key: {:?}",
                text
            )));
        }
    }

    let raw = key.as_bytes();
    let mut full = Vec::with_capacity(prefix.len() + raw.len());
    full.extend_from_slice(prefix);
    full.extend_from_slice(raw);

    if full.len() > MAX_KEY_LEN {
        return Err(MemcacheError::IllegalInput(format!(
            "key is too long: {} bytes (max {})",
            full.len(),
            MAX_KEY_LEN
        )));
    }

    if full.iter().copied().any(is_whitespace) {
        return Err(MemcacheError::IllegalInput(format!(
            "key contains whitespace: {:?}",
            String::from_utf8_lossy(&full)
        )));
    }

    Ok(full)
}

/// Validate a bare command argument such as a `stats` group name.
///
/// Whitespace would split it into extra arguments or a second command.
pub fn check_arg(arg: &str) -> Result<()> {
    if arg.bytes().any(is_whitespace) {
        return Err(MemcacheError::IllegalInput(format!(
            "argument contains whitespace: {:?}",
            arg
        )));
    }
    Ok(())
}

// u8::is_ascii_whitespace skips vertical tab, which memcached also splits on.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
