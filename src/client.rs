//! Client Module
//!
//! The public memcached client.
//!
//! ## Responsibilities
//! - Own the single connection and (re)open it lazily
//! - Validate keys and serialize values before any I/O
//! - Run one command at a time: send, then consume the whole response
//! - Tear the connection down on any error so a half-read stream is never reused
//!
//! ## Command paths
//! - Storage (`set`, `add`, `replace`, `append`, `prepend`, `cas`): one
//!   outcome line checked against the tokens valid for that command
//! - Retrieval (`get`, `gets`, `stats`): `VALUE`/`STAT` lines until `END`;
//!   errors here become misses when `ignore_exc` is set
//! - Misc (`delete`, `incr`, `decr`, `touch`, `flush_all`, `version`): one
//!   line, command-specific tokens
//!
//! Mutating commands take an explicit `noreply` flag. With `noreply` the
//! command is written and the call returns without reading anything, so the
//! result says nothing about whether memcached applied it.

use std::collections::HashMap;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{MemcacheError, Result};
use crate::network::{Connection, Connector, TcpConnector};
use crate::protocol::{
    check_arg, check_error_line, check_key, coerce_stats, encode_fetch, encode_misc, encode_store,
    is_stat_line, is_value_line, parse_numeric_line, parse_stat_line, parse_value_header,
    parse_version_line, KeyRef, StatValue, StoreCommand, StoreOutcome, ValueHeader, DELETED, END,
    NOT_FOUND, OK, TOUCHED,
};
use crate::serializer::{Deserializer, RawSerde, Serializer};

/// A value fetched by `get`/`gets`, with its CAS token when one was asked for
type Fetched<T> = (T, Option<u64>);

/// Blocking client for a single memcached server.
///
/// One instance owns one socket. It is `Send` but every command takes
/// `&mut self`; give each thread its own client rather than sharing one.
pub struct Client<S = RawSerde> {
    /// Client configuration
    config: Config,

    /// Opens the transport on (re)connect
    connector: Box<dyn Connector>,

    /// Value serializer/deserializer pair
    serde: S,

    /// Live connection, if any
    conn: Option<Connection>,
}

impl Client<RawSerde> {
    /// Create a client that stores raw bytes
    ///
    /// No connection is made until the first command.
    pub fn new(config: Config) -> Self {
        Self::with_serde(config, RawSerde)
    }
}

impl<S> Client<S>
where
    S: Serializer + Deserializer,
{
    /// Create a client with a custom serializer/deserializer pair
    pub fn with_serde(config: Config, serde: S) -> Self {
        Self {
            config,
            connector: Box::new(TcpConnector),
            serde,
            conn: None,
        }
    }

    /// Replace the transport factory (default: plain TCP)
    ///
    /// Any open connection is closed; the next command uses the new connector.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.close();
        self.connector = Box::new(connector);
        self
    }

    /// Client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Open the connection if it is not already open
    pub fn connect(&mut self) -> Result<()> {
        self.connection().map(|_| ())
    }

    /// Close the connection and drop any buffered bytes
    ///
    /// Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
        }
    }

    /// Send `quit` (when connected), then close
    pub fn quit(&mut self) -> Result<()> {
        let result = match self.conn.as_mut() {
            Some(conn) => conn.send(&encode_misc(&[b"quit".as_slice()], false)),
            None => Ok(()),
        };
        self.close();
        result
    }

    fn connection(&mut self) -> Result<&mut Connection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => Connection::open(self.connector.as_ref(), &self.config)?,
        };
        Ok(self.conn.insert(conn))
    }

    /// Send one command and read its response with `read`.
    ///
    /// Any error closes the connection before it is returned.
    fn execute<T>(
        &mut self,
        message: &[u8],
        read: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let result = self
            .connection()
            .and_then(|conn| conn.send(message).and_then(|()| read(conn)));

        if let Err(ref e) = result {
            if self.conn.is_some() {
                tracing::warn!(
                    "Closing connection to {} after error: {}",
                    self.config.server,
                    e
                );
            }
            self.close();
        }
        result
    }

    /// Report a read-path error as a miss when `ignore_exc` is set
    fn or_miss<T: Default>(&self, result: Result<T>, command: &str) -> Result<T> {
        match result {
            Err(e) if self.config.ignore_exc => {
                tracing::debug!("Ignoring error during {}: {}", command, e);
                Ok(T::default())
            }
            other => other,
        }
    }

    fn check_key<'k>(&self, key: impl Into<KeyRef<'k>>) -> Result<Vec<u8>> {
        check_key(key.into(), &self.config.key_prefix)
    }

    // =========================================================================
    // Storage Commands
    // =========================================================================

    /// Store a value unconditionally. Returns true if stored.
    pub fn set<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let outcome = self.store(StoreCommand::Set, key, value, expire, None, noreply)?;
        Ok(outcome == StoreOutcome::Stored)
    }

    /// Store several values, one `set` each
    ///
    /// Every key is validated before anything is sent. Returns the original
    /// keys that were not stored (always empty with `noreply`).
    pub fn set_many<'k, 'v, I, K>(
        &mut self,
        items: I,
        expire: u32,
        noreply: bool,
    ) -> Result<Vec<Vec<u8>>>
    where
        I: IntoIterator<Item = (K, &'v S::Input)>,
        K: Into<KeyRef<'k>>,
        S::Input: 'v,
    {
        let items: Vec<(KeyRef<'k>, &'v S::Input)> =
            items.into_iter().map(|(k, v)| (k.into(), v)).collect();
        for (key, _) in &items {
            self.check_key(*key)?;
        }

        let mut failed = Vec::new();
        for (key, value) in items {
            if !self.set(key, value, expire, noreply)? {
                failed.push(key.as_bytes().to_vec());
            }
        }
        Ok(failed)
    }

    /// Store only if the key does not exist. Returns false if it did.
    pub fn add<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let outcome = self.store(StoreCommand::Add, key, value, expire, None, noreply)?;
        Ok(outcome == StoreOutcome::Stored)
    }

    /// Store only if the key already exists. Returns false if it did not.
    pub fn replace<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let outcome = self.store(StoreCommand::Replace, key, value, expire, None, noreply)?;
        Ok(outcome == StoreOutcome::Stored)
    }

    /// Append to an existing value
    pub fn append<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let outcome = self.store(StoreCommand::Append, key, value, expire, None, noreply)?;
        Ok(outcome == StoreOutcome::Stored)
    }

    /// Prepend to an existing value
    pub fn prepend<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let outcome = self.store(StoreCommand::Prepend, key, value, expire, None, noreply)?;
        Ok(outcome == StoreOutcome::Stored)
    }

    /// Check-and-set against a token from `gets`.
    ///
    /// `Some(true)` if stored, `Some(false)` if the item changed since the
    /// token was issued, `None` if the key does not exist. With `noreply`
    /// the result is always `Some(true)`.
    pub fn cas<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        cas: u64,
        expire: u32,
        noreply: bool,
    ) -> Result<Option<bool>> {
        match self.store(StoreCommand::Cas, key, value, expire, Some(cas), noreply)? {
            StoreOutcome::Stored => Ok(Some(true)),
            StoreOutcome::Exists | StoreOutcome::NotStored => Ok(Some(false)),
            StoreOutcome::NotFound => Ok(None),
        }
    }

    fn store<'k>(
        &mut self,
        command: StoreCommand,
        key: impl Into<KeyRef<'k>>,
        value: &S::Input,
        expire: u32,
        cas: Option<u64>,
        noreply: bool,
    ) -> Result<StoreOutcome> {
        let key = self.check_key(key)?;
        let (data, flags) = self.serde.serialize(&key, value)?;
        let message = encode_store(command, &key, flags, expire, &data, cas, noreply);

        self.execute(&message, |conn| {
            if noreply {
                return Ok(StoreOutcome::Stored);
            }
            let line = conn.read_line()?;
            check_error_line(&line)?;
            match StoreOutcome::parse(&line) {
                Some(outcome) if command.accepts(outcome) => Ok(outcome),
                _ => Err(MemcacheError::unknown_line(&line)),
            }
        })
    }

    // =========================================================================
    // Retrieval Commands
    // =========================================================================

    /// Fetch one value. `None` on a miss.
    pub fn get<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Result<Option<S::Output>> {
        let key = key.into();
        let mut found = self.fetch("get", [key], false)?;
        Ok(found.remove(key.as_bytes()).map(|(value, _)| value))
    }

    /// Fetch several values, keyed by the keys as given (without prefix).
    /// Misses are absent from the map.
    pub fn get_many<'k, I, K>(&mut self, keys: I) -> Result<HashMap<Vec<u8>, S::Output>>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyRef<'k>>,
    {
        let found = self.fetch("get", keys, false)?;
        Ok(found
            .into_iter()
            .map(|(key, (value, _))| (key, value))
            .collect())
    }

    /// Fetch one value with its CAS token
    pub fn gets<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> Result<Option<(S::Output, u64)>> {
        let key = key.into();
        let mut found = self.fetch("gets", [key], true)?;
        Ok(found
            .remove(key.as_bytes())
            .and_then(|(value, cas)| cas.map(|cas| (value, cas))))
    }

    /// Fetch several values with their CAS tokens
    pub fn gets_many<'k, I, K>(&mut self, keys: I) -> Result<HashMap<Vec<u8>, (S::Output, u64)>>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyRef<'k>>,
    {
        let found = self.fetch("gets", keys, true)?;
        Ok(found
            .into_iter()
            .filter_map(|(key, (value, cas))| cas.map(|cas| (key, (value, cas))))
            .collect())
    }

    fn fetch<'k, I, K>(
        &mut self,
        command: &'static str,
        keys: I,
        expect_cas: bool,
    ) -> Result<HashMap<Vec<u8>, Fetched<S::Output>>>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyRef<'k>>,
    {
        // wire key -> key as the caller gave it
        let mut originals = HashMap::new();
        let mut wire_keys = Vec::new();
        for key in keys {
            let key = key.into();
            let checked = self.check_key(key)?;
            originals.insert(checked.clone(), key.as_bytes().to_vec());
            wire_keys.push(checked);
        }

        if wire_keys.is_empty() {
            return Ok(HashMap::new());
        }

        let message = encode_fetch(command, &wire_keys);
        let max_len = self.config.max_value_len;
        let result = self
            .execute(&message, |conn| read_values(conn, expect_cas, max_len))
            .and_then(|values| self.assemble(values, &originals));
        self.or_miss(result, command)
    }

    fn assemble(
        &self,
        values: Vec<(ValueHeader, Bytes)>,
        originals: &HashMap<Vec<u8>, Vec<u8>>,
    ) -> Result<HashMap<Vec<u8>, Fetched<S::Output>>> {
        let mut found = HashMap::with_capacity(values.len());
        for (header, data) in values {
            let original = originals.get(&header.key).ok_or_else(|| {
                MemcacheError::Unknown(format!(
                    "value for unrequested key {:?}",
                    String::from_utf8_lossy(&header.key)
                ))
            })?;
            let value = self.serde.deserialize(&header.key, &data, header.flags)?;
            found.insert(original.clone(), (value, header.cas));
        }
        Ok(found)
    }

    // =========================================================================
    // Misc Commands
    // =========================================================================

    /// Delete a key. Returns false if it did not exist.
    pub fn delete<'k>(&mut self, key: impl Into<KeyRef<'k>>, noreply: bool) -> Result<bool> {
        let key = self.check_key(key)?;
        let message = encode_misc(&[b"delete".as_slice(), key.as_slice()], noreply);
        self.execute(&message, |conn| {
            if noreply {
                return Ok(true);
            }
            let line = conn.read_line()?;
            check_error_line(&line)?;
            match &line[..] {
                DELETED => Ok(true),
                NOT_FOUND => Ok(false),
                _ => Err(MemcacheError::unknown_line(&line)),
            }
        })
    }

    /// Delete several keys, one `delete` each
    pub fn delete_many<'k, I, K>(&mut self, keys: I, noreply: bool) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyRef<'k>>,
    {
        let keys: Vec<KeyRef<'k>> = keys.into_iter().map(Into::into).collect();
        for key in &keys {
            self.check_key(*key)?;
        }
        for key in keys {
            self.delete(key, noreply)?;
        }
        Ok(true)
    }

    /// Increment a numeric value. `None` if the key does not exist or with
    /// `noreply`.
    pub fn incr<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: u64,
        noreply: bool,
    ) -> Result<Option<u64>> {
        self.arithmetic(b"incr", key, value, noreply)
    }

    /// Decrement a numeric value; memcached stops at zero.
    pub fn decr<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        value: u64,
        noreply: bool,
    ) -> Result<Option<u64>> {
        self.arithmetic(b"decr", key, value, noreply)
    }

    fn arithmetic<'k>(
        &mut self,
        command: &[u8],
        key: impl Into<KeyRef<'k>>,
        value: u64,
        noreply: bool,
    ) -> Result<Option<u64>> {
        let key = self.check_key(key)?;
        let amount = value.to_string();
        let message = encode_misc(&[command, key.as_slice(), amount.as_bytes()], noreply);
        self.execute(&message, |conn| {
            if noreply {
                return Ok(None);
            }
            let line = conn.read_line()?;
            check_error_line(&line)?;
            if &line[..] == NOT_FOUND {
                return Ok(None);
            }
            parse_numeric_line(&line).map(Some)
        })
    }

    /// Update a key's expiration. Returns false if it did not exist.
    pub fn touch<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        expire: u32,
        noreply: bool,
    ) -> Result<bool> {
        let key = self.check_key(key)?;
        let expire = expire.to_string();
        let message = encode_misc(&[b"touch".as_slice(), key.as_slice(), expire.as_bytes()], noreply);
        self.execute(&message, |conn| {
            if noreply {
                return Ok(true);
            }
            let line = conn.read_line()?;
            check_error_line(&line)?;
            match &line[..] {
                TOUCHED => Ok(true),
                NOT_FOUND => Ok(false),
                _ => Err(MemcacheError::unknown_line(&line)),
            }
        })
    }

    /// Invalidate every item, after `delay` seconds
    pub fn flush_all(&mut self, delay: u32, noreply: bool) -> Result<bool> {
        let delay = delay.to_string();
        let message = encode_misc(&[b"flush_all".as_slice(), delay.as_bytes()], noreply);
        self.execute(&message, |conn| {
            if noreply {
                return Ok(true);
            }
            let line = conn.read_line()?;
            check_error_line(&line)?;
            match &line[..] {
                OK => Ok(true),
                _ => Err(MemcacheError::unknown_line(&line)),
            }
        })
    }

    /// Server version string
    pub fn version(&mut self) -> Result<String> {
        let message = encode_misc(&[b"version".as_slice()], false);
        self.execute(&message, |conn| {
            let line = conn.read_line()?;
            check_error_line(&line)?;
            parse_version_line(&line)
        })
    }

    // =========================================================================
    // Stats
    // =========================================================================

    /// Server statistics with known stats converted to typed values.
    ///
    /// `args` selects a stats group (`settings`, `items`, ...); pass an empty
    /// slice for general stats.
    pub fn stats(&mut self, args: &[&str]) -> Result<HashMap<String, StatValue>> {
        self.stats_raw(args).map(coerce_stats)
    }

    /// Server statistics as raw name/value bytes
    ///
    /// Arguments containing whitespace are rejected before anything is sent.
    pub fn stats_raw(&mut self, args: &[&str]) -> Result<HashMap<Vec<u8>, Vec<u8>>> {
        for arg in args {
            check_arg(arg)?;
        }
        let message = encode_fetch("stats", args);
        let result = self.execute(&message, read_stats);
        self.or_miss(result, "stats")
    }
}

/// Read `VALUE` blocks up to `END`
fn read_values(
    conn: &mut Connection,
    expect_cas: bool,
    max_len: usize,
) -> Result<Vec<(ValueHeader, Bytes)>> {
    let mut values = Vec::new();
    loop {
        let line = conn.read_line()?;
        if &line[..] == END {
            return Ok(values);
        }
        if is_value_line(&line) {
            let header = parse_value_header(&line)?;
            if expect_cas && header.cas.is_none() {
                return Err(MemcacheError::unknown_line(&line));
            }
            if header.len > max_len {
                return Err(MemcacheError::Unknown(format!(
                    "value of {} bytes exceeds limit of {}",
                    header.len, max_len
                )));
            }
            let data = conn.read_value(header.len)?;
            values.push((header, data));
            continue;
        }
        check_error_line(&line)?;
        return Err(MemcacheError::unknown_line(&line));
    }
}

/// Read `STAT` lines up to `END`
fn read_stats(conn: &mut Connection) -> Result<HashMap<Vec<u8>, Vec<u8>>> {
    let mut stats = HashMap::new();
    loop {
        let line = conn.read_line()?;
        if &line[..] == END {
            return Ok(stats);
        }
        if is_stat_line(&line) {
            let (name, value) = parse_stat_line(&line)?;
            stats.insert(name, value);
            continue;
        }
        check_error_line(&line)?;
        return Err(MemcacheError::unknown_line(&line));
    }
}
