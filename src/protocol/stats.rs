//! Stats coercion
//!
//! `stats` replies arrive as raw `STAT <name> <value>` pairs. Known stat
//! names are converted to typed values here; anything unrecognized, or
//! anything that fails to parse as its expected type, stays as text.

use std::collections::HashMap;

/// A typed stats value
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl StatValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            StatValue::Float(v) => Some(*v),
            StatValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StatValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum StatKind {
    Int,
    Float,
    Bool,
}

// General stats plus `stats settings` entries.
const INT_STATS: &[&str] = &[
    "pid",
    "uptime",
    "time",
    "pointer_size",
    "curr_items",
    "total_items",
    "bytes",
    "curr_connections",
    "total_connections",
    "connection_structures",
    "reserved_fds",
    "cmd_get",
    "cmd_set",
    "cmd_flush",
    "cmd_touch",
    "get_hits",
    "get_misses",
    "get_expired",
    "get_flushed",
    "delete_misses",
    "delete_hits",
    "incr_misses",
    "incr_hits",
    "decr_misses",
    "decr_hits",
    "cas_misses",
    "cas_hits",
    "cas_badval",
    "touch_hits",
    "touch_misses",
    "auth_cmds",
    "auth_errors",
    "evictions",
    "reclaimed",
    "bytes_read",
    "bytes_written",
    "limit_maxbytes",
    "threads",
    "conn_yields",
    "hash_power_level",
    "hash_bytes",
    "expired_unfetched",
    "evicted_unfetched",
    "slabs_moved",
    "rejected_connections",
    "listen_disabled_num",
    "maxbytes",
    "maxconns",
    "tcpport",
    "udpport",
    "verbosity",
    "oldest",
    "chunk_size",
    "num_threads",
    "num_threads_per_udp",
    "reqs_per_event",
    "tcp_backlog",
    "item_size_max",
    "hashpower_init",
    "slab_automove",
];

const FLOAT_STATS: &[&str] = &["rusage_user", "rusage_system", "growth_factor"];

const BOOL_STATS: &[&str] = &[
    "accepting_conns",
    "hash_is_expanding",
    "slab_reassign_running",
    "detail_enabled",
    "cas_enabled",
    "auth_enabled_sasl",
    "maxconns_fast",
    "slab_reassign",
];

fn kind_of(name: &str) -> Option<StatKind> {
    if INT_STATS.contains(&name) {
        Some(StatKind::Int)
    } else if FLOAT_STATS.contains(&name) {
        Some(StatKind::Float)
    } else if BOOL_STATS.contains(&name) {
        Some(StatKind::Bool)
    } else {
        None
    }
}

/// Convert one raw stat into a typed value
pub fn coerce_stat(name: &str, raw: &[u8]) -> StatValue {
    let text = String::from_utf8_lossy(raw).into_owned();
    let coerced = match kind_of(name) {
        Some(StatKind::Int) => text.parse().ok().map(StatValue::Int),
        // Older servers report rusage as "seconds:microseconds".
        Some(StatKind::Float) => text.replace(':', ".").parse().ok().map(StatValue::Float),
        Some(StatKind::Bool) => match text.as_str() {
            "1" | "yes" | "on" | "true" => Some(StatValue::Bool(true)),
            "0" | "no" | "off" | "false" => Some(StatValue::Bool(false)),
            _ => None,
        },
        None => None,
    };
    coerced.unwrap_or(StatValue::Text(text))
}

/// Convert a raw stats map into typed values keyed by stat name
pub fn coerce_stats(raw: HashMap<Vec<u8>, Vec<u8>>) -> HashMap<String, StatValue> {
    raw.into_iter()
        .map(|(name, value)| {
            let name = String::from_utf8_lossy(&name).into_owned();
            let value = coerce_stat(&name, &value);
            (name, value)
        })
        .collect()
}
