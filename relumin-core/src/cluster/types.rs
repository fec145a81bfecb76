use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use thiserror::Error;

use super::slots::encode_slots;

/// Total number of hash slots (Redis-compatible)
pub const TOTAL_SLOTS: u16 = 16384;

/// Flag carried only by the line describing the reporting node itself
pub const FLAG_MYSELF: &str = "myself";
pub const FLAG_MASTER: &str = "master";
pub const FLAG_SLAVE: &str = "slave";
pub const FLAG_REPLICA: &str = "replica";
pub const FLAG_FAIL: &str = "fail";
pub const FLAG_PFAIL: &str = "fail?";

/// One row of a `CLUSTER NODES` report.
///
/// Identity is the node id alone, compared case-insensitively: two records
/// with the same id are equal (and hash equally) whatever their other
/// fields say. Records are built by the topology parser and never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct ClusterNode {
    pub(crate) node_id: String,
    pub(crate) host_and_port: String,
    pub(crate) flags: Vec<String>,
    pub(crate) master_node_id: String,
    pub(crate) ping_sent: i64,
    pub(crate) pong_received: i64,
    pub(crate) config_epoch: i64,
    pub(crate) connected: bool,
    pub(crate) migrating: BTreeMap<u16, String>,
    pub(crate) importing: BTreeMap<u16, String>,
    pub(crate) served_slots: BTreeSet<u16>,
}

impl ClusterNode {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Address used to reach the node (after loopback substitution)
    pub fn host_and_port(&self) -> &str {
        &self.host_and_port
    }

    /// Flags in report order
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Master node id, empty for masters and nodes without a known master
    pub fn master_node_id(&self) -> &str {
        &self.master_node_id
    }

    pub fn ping_sent(&self) -> i64 {
        self.ping_sent
    }

    pub fn pong_received(&self) -> i64 {
        self.pong_received
    }

    pub fn config_epoch(&self) -> i64 {
        self.config_epoch
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Slots this node is migrating away (slot -> destination node id)
    pub fn migrating(&self) -> &BTreeMap<u16, String> {
        &self.migrating
    }

    /// Slots this node is importing (slot -> source node id)
    pub fn importing(&self) -> &BTreeMap<u16, String> {
        &self.importing
    }

    pub fn served_slots(&self) -> &BTreeSet<u16> {
        &self.served_slots
    }

    pub fn slot_count(&self) -> usize {
        self.served_slots.len()
    }

    /// Served slots in range notation, e.g. `0-5460,5462`
    pub fn served_slots_display(&self) -> String {
        encode_slots(&self.served_slots)
    }

    pub fn serves_slot(&self, slot: u16) -> bool {
        self.served_slots.contains(&slot)
    }

    /// Exact, case-sensitive flag membership
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn is_myself(&self) -> bool {
        self.has_flag(FLAG_MYSELF)
    }

    pub fn is_master(&self) -> bool {
        self.has_flag(FLAG_MASTER)
    }

    pub fn is_replica(&self) -> bool {
        self.has_flag(FLAG_SLAVE) || self.has_flag(FLAG_REPLICA)
    }

    pub fn is_failing(&self) -> bool {
        self.has_flag(FLAG_FAIL) || self.has_flag(FLAG_PFAIL)
    }

    /// Host part of `host_and_port`
    pub fn host(&self) -> &str {
        match self.host_and_port.split_once(':') {
            Some((host, _)) => host,
            None => &self.host_and_port,
        }
    }

    /// Port part of `host_and_port`.
    ///
    /// Returns `None` when the address has no port or the port is not a
    /// plain number (a `@busport` suffix is left in place by the parser).
    pub fn port(&self) -> Option<u16> {
        self.host_and_port
            .split_once(':')
            .and_then(|(_, port)| port.parse().ok())
    }
}

impl PartialEq for ClusterNode {
    fn eq(&self, other: &Self) -> bool {
        self.node_id.eq_ignore_ascii_case(&other.node_id)
    }
}

impl Eq for ClusterNode {}

impl Hash for ClusterNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.node_id.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_usize(self.node_id.len());
    }
}

impl Serialize for ClusterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ClusterNode", 12)?;
        state.serialize_field("nodeId", &self.node_id)?;
        state.serialize_field("hostAndPort", &self.host_and_port)?;
        state.serialize_field("flags", &self.flags)?;
        state.serialize_field("masterNodeId", &self.master_node_id)?;
        state.serialize_field("pingSent", &self.ping_sent)?;
        state.serialize_field("pongReceived", &self.pong_received)?;
        state.serialize_field("configEpoch", &self.config_epoch)?;
        state.serialize_field("connected", &self.connected)?;
        state.serialize_field("migrating", &self.migrating)?;
        state.serialize_field("importing", &self.importing)?;
        state.serialize_field("servedSlots", &self.served_slots_display())?;
        state.serialize_field("slotCount", &self.slot_count())?;
        state.end()
    }
}

/// Inclusive run of consecutive slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
}

impl SlotRange {
    pub fn new(start: u16, end: u16) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }

    pub fn count(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }
}

impl std::fmt::Display for SlotRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Why a slot token was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotRangeErrorKind {
    #[error("invalid format")]
    InvalidFormat,
    #[error("start slot must be equal or less than end slot")]
    StartAfterEnd,
    #[error("slot must be less than 16384")]
    OutOfRange,
}

/// A slot token that could not be decoded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{token}' is invalid: {kind}")]
pub struct SlotRangeError {
    pub token: String,
    pub kind: SlotRangeErrorKind,
}

impl SlotRangeError {
    pub(crate) fn new(token: &str, kind: SlotRangeErrorKind) -> Self {
        Self {
            token: token.to_string(),
            kind,
        }
    }
}

/// Why a `CLUSTER NODES` line was rejected
#[derive(Debug, Error)]
pub enum NodesParseErrorKind {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("address '{0}' is not in ip:port form")]
    InvalidAddress(String),

    #[error("{field} '{value}' is not a number")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unrecognized slot descriptor '{0}'")]
    InvalidDescriptor(String),

    #[error("invalid slot token")]
    InvalidSlots(#[source] SlotRangeError),
}

/// A malformed line aborted the whole `CLUSTER NODES` parse
#[derive(Debug, Error)]
#[error("line {line_number} of CLUSTER NODES output is malformed ({kind}): {line}")]
pub struct NodesParseError {
    /// 1-based position in the raw report
    pub line_number: usize,
    pub line: String,
    #[source]
    pub kind: NodesParseErrorKind,
}
