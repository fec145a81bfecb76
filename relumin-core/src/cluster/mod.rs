//! Cluster Mode - topology reports and hash slots
//!
//! Implements the client side of Redis Cluster introspection:
//! - `CLUSTER NODES` report parsing into immutable node records
//! - Slot range notation codec (`0-5460,5462`)
//! - Read-only topology snapshot queries

pub mod nodes_parser;
pub mod slots;
pub mod topology;
pub mod types;

pub use nodes_parser::{parse_cluster_node_line, parse_cluster_nodes};
pub use slots::{decode_slot_list, decode_slots, encode_slots, slot_ranges};
pub use topology::{ClusterTopology, SlotMigration};
pub use types::{
    ClusterNode, NodesParseError, NodesParseErrorKind, SlotRange, SlotRangeError,
    SlotRangeErrorKind, TOTAL_SLOTS,
};
