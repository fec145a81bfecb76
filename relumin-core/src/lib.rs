//! Redis Cluster introspection core
//!
//! Parses `CLUSTER NODES`, `INFO` and `CLUSTER INFO` replies into typed
//! models and converts hash-slot sets to and from range notation.

pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitoring;

// Re-export commonly used types
pub use client::{CommandExecutor, NodeInspector, RedisExecutor};
pub use cluster::{
    ClusterNode, ClusterTopology, NodesParseError, SlotRangeError, decode_slots, encode_slots,
    parse_cluster_nodes,
};
pub use config::ReluminConfig;
pub use error::{CommandError, ConfigError, ReluminError, Result};
pub use monitoring::{InfoReport, parse_cluster_info_result, parse_colon_separated, parse_info_result};
