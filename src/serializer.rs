//! Value serialization
//!
//! memcached stores opaque bytes plus a 32-bit flags word. A [`Serializer`]
//! turns a caller's value into `(bytes, flags)`; the matching
//! [`Deserializer`] rebuilds the value from what `get` returns. The flags
//! tell the deserializer how the bytes were produced.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MemcacheError, Result};

/// Flags for values stored as raw bytes
pub const FLAG_BYTES: u32 = 0;

/// Flags for values stored with bincode
pub const FLAG_BINCODE: u32 = 1;

/// Converts values into the bytes and flags written to memcached
pub trait Serializer {
    type Input: ?Sized;

    fn serialize(&self, key: &[u8], value: &Self::Input) -> Result<(Vec<u8>, u32)>;
}

/// Rebuilds values from the bytes and flags read back from memcached
pub trait Deserializer {
    type Output;

    fn deserialize(&self, key: &[u8], data: &[u8], flags: u32) -> Result<Self::Output>;
}

// =============================================================================
// Raw bytes
// =============================================================================

/// Stores bytes as-is with zero flags. The client's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSerde;

impl Serializer for RawSerde {
    type Input = [u8];

    fn serialize(&self, _key: &[u8], value: &[u8]) -> Result<(Vec<u8>, u32)> {
        Ok((value.to_vec(), FLAG_BYTES))
    }
}

impl Deserializer for RawSerde {
    type Output = Vec<u8>;

    fn deserialize(&self, _key: &[u8], data: &[u8], _flags: u32) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

// =============================================================================
// Bincode
// =============================================================================

/// Stores any serde type with bincode, tagged with [`FLAG_BINCODE`].
///
/// Values written by other clients as raw bytes ([`FLAG_BYTES`]) are decoded
/// with bincode too, so this pairs best with keys only this serde writes.
pub struct BincodeSerde<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeSerde<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeSerde<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeSerde<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serializer for BincodeSerde<T> {
    type Input = T;

    fn serialize(&self, _key: &[u8], value: &T) -> Result<(Vec<u8>, u32)> {
        let bytes =
            bincode::serialize(value).map_err(|e| MemcacheError::Serialization(e.to_string()))?;
        Ok((bytes, FLAG_BINCODE))
    }
}

impl<T: DeserializeOwned> Deserializer for BincodeSerde<T> {
    type Output = T;

    fn deserialize(&self, key: &[u8], data: &[u8], flags: u32) -> Result<T> {
        match flags {
            FLAG_BINCODE | FLAG_BYTES => {
                bincode::deserialize(data).map_err(|e| MemcacheError::Serialization(e.to_string()))
            }
            other => Err(MemcacheError::Serialization(format!(
                "unknown flags {} for key {:?}",
                other,
                String::from_utf8_lossy(key)
            ))),
        }
    }
}
