//! Command encoding
//!
//! Builds ASCII command lines for the memcached text protocol. Keys passed
//! in here are already validated and prefixed.

use super::response::StoreOutcome;

/// Protocol line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Storage commands: everything that carries a data block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCommand {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
}

impl StoreCommand {
    /// Command name as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::Set => "set",
            StoreCommand::Add => "add",
            StoreCommand::Replace => "replace",
            StoreCommand::Append => "append",
            StoreCommand::Prepend => "prepend",
            StoreCommand::Cas => "cas",
        }
    }

    /// Whether memcached may legitimately answer this command with `outcome`
    pub fn accepts(&self, outcome: StoreOutcome) -> bool {
        match self {
            StoreCommand::Set
            | StoreCommand::Add
            | StoreCommand::Replace
            | StoreCommand::Append
            | StoreCommand::Prepend => {
                matches!(outcome, StoreOutcome::Stored | StoreOutcome::NotStored)
            }
            StoreCommand::Cas => matches!(
                outcome,
                StoreOutcome::Stored | StoreOutcome::Exists | StoreOutcome::NotFound
            ),
        }
    }
}

/// Encode a storage command with its data block
///
/// Format: `<name> <key> <flags> <expire> <bytes> [<cas>] [noreply]\r\n<data>\r\n`
pub fn encode_store(
    command: StoreCommand,
    key: &[u8],
    flags: u32,
    expire: u32,
    data: &[u8],
    cas: Option<u64>,
    noreply: bool,
) -> Vec<u8> {
    let header = match cas {
        Some(token) => format!(" {} {} {} {}", flags, expire, data.len(), token),
        None => format!(" {} {} {}", flags, expire, data.len()),
    };

    let mut message =
        Vec::with_capacity(command.name().len() + key.len() + header.len() + data.len() + 16);
    message.extend_from_slice(command.name().as_bytes());
    message.push(b' ');
    message.extend_from_slice(key);
    message.extend_from_slice(header.as_bytes());
    if noreply {
        message.extend_from_slice(b" noreply");
    }
    message.extend_from_slice(CRLF);
    message.extend_from_slice(data);
    message.extend_from_slice(CRLF);

    message
}

/// Encode a retrieval-style command: `<name> <arg1> <arg2> ...\r\n`
///
/// Used for `get`, `gets` and `stats`; `stats` may have no arguments.
pub fn encode_fetch<A: AsRef<[u8]>>(name: &str, args: &[A]) -> Vec<u8> {
    let args_len: usize = args.iter().map(|a| a.as_ref().len() + 1).sum();

    let mut message = Vec::with_capacity(name.len() + args_len + CRLF.len());
    message.extend_from_slice(name.as_bytes());
    for arg in args {
        message.push(b' ');
        message.extend_from_slice(arg.as_ref());
    }
    message.extend_from_slice(CRLF);

    message
}

/// Encode a single-line command, optionally with `noreply`
///
/// Used for `delete`, `incr`, `decr`, `touch`, `flush_all`, `version`, `quit`.
pub fn encode_misc(parts: &[&[u8]], noreply: bool) -> Vec<u8> {
    let mut message = Vec::with_capacity(parts.iter().map(|p| p.len() + 1).sum::<usize>() + 10);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            message.push(b' ');
        }
        message.extend_from_slice(part);
    }
    if noreply {
        message.extend_from_slice(b" noreply");
    }
    message.extend_from_slice(CRLF);

    message
}
