//! CLUSTER NODES parser
//!
//! Turns the raw report of one cluster node into [`ClusterNode`] records.
//!
//! Line format:
//! `<id> <ip:port> <flags> <master> <ping-sent> <pong-recv> <config-epoch> <link-state> <slot> <slot> ... <slot>`
//!
//! Example:
//! ```text
//! 07c37dfeb235213a872192d90877d0cd55635b91 127.0.0.1:30004 slave e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 0 1426238317239 4 connected
//! ```
//!
//! A single malformed line fails the whole report.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use super::slots::parse_slot_token;
use super::types::{
    ClusterNode, FLAG_MYSELF, NodesParseError, NodesParseErrorKind, TOTAL_SLOTS,
};

/// Minimum number of whitespace-separated fields on a node line
const MIN_FIELDS: usize = 8;

const MIGRATING_SEPARATOR: &str = "->-";
const IMPORTING_SEPARATOR: &str = "-<-";

/// Parse a full `CLUSTER NODES` report.
///
/// `queried_endpoint` is the `host:port` the report was fetched from. It is
/// used to replace loopback addresses (and the empty address a node reports
/// for itself before joining) with an address reachable by the caller; pass
/// an empty string to keep addresses as reported.
///
/// Nodes are returned in report order.
pub fn parse_cluster_nodes(
    raw: &str,
    queried_endpoint: &str,
) -> Result<Vec<ClusterNode>, NodesParseError> {
    let mut nodes = Vec::new();

    for (index, line) in raw.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let node = parse_cluster_node_line(line, queried_endpoint).map_err(|kind| {
            NodesParseError {
                line_number: index + 1,
                line: line.to_string(),
                kind,
            }
        })?;
        trace!(node_id = %node.node_id, address = %node.host_and_port, "Parsed cluster node");
        nodes.push(node);
    }

    debug!(
        "Parsed {} cluster nodes reported by {}",
        nodes.len(),
        if queried_endpoint.trim().is_empty() {
            "<unknown>"
        } else {
            queried_endpoint
        }
    );
    Ok(nodes)
}

/// Parse a single node line.
pub fn parse_cluster_node_line(
    line: &str,
    queried_endpoint: &str,
) -> Result<ClusterNode, NodesParseErrorKind> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_FIELDS {
        return Err(NodesParseErrorKind::MissingFields {
            expected: MIN_FIELDS,
            found: parts.len(),
        });
    }

    let mut builder = NodeBuilder::new(parts[0]);
    builder.host_and_port = resolve_address(parts[1], queried_endpoint)?;
    builder.flags = parse_flags(parts[2]);
    builder.master_node_id = if parts[3] == "-" {
        String::new()
    } else {
        parts[3].to_string()
    };
    builder.ping_sent = parse_number("ping-sent", parts[4])?;
    builder.pong_received = parse_number("pong-recv", parts[5])?;
    builder.config_epoch = parse_number("config-epoch", parts[6])?;
    builder.connected = parts[7] == "connected";

    // Only the reporting node lists its own migrations, so brackets are
    // recognized on the myself line alone.
    let is_myself = builder.flags.iter().any(|f| f == FLAG_MYSELF);
    for &token in &parts[MIN_FIELDS..] {
        if is_myself && token.starts_with('[') {
            builder.add_descriptor(token)?;
        } else {
            builder.add_slots(token)?;
        }
    }

    Ok(builder.build())
}

/// Resolve the reported address against the endpoint that was queried.
fn resolve_address(reported: &str, queried_endpoint: &str) -> Result<String, NodesParseErrorKind> {
    if queried_endpoint.trim().is_empty() {
        return Ok(reported.to_string());
    }

    // A node that does not know its own address yet reports ":port"
    if reported.starts_with(':') {
        return Ok(queried_endpoint.to_string());
    }

    let Some((ip, port)) = reported.split_once(':') else {
        return Err(NodesParseErrorKind::InvalidAddress(reported.to_string()));
    };

    if ip == "127.0.0.1" || ip == "localhost" {
        let host = queried_endpoint
            .split_once(':')
            .map_or(queried_endpoint, |(host, _)| host)
            .trim();
        Ok(format!("{}:{}", host, port))
    } else {
        Ok(reported.to_string())
    }
}

fn parse_flags(field: &str) -> Vec<String> {
    let mut flags: Vec<String> = Vec::new();
    for flag in field.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        if !flags.iter().any(|f| f == flag) {
            flags.push(flag.to_string());
        }
    }
    flags
}

fn parse_number(field: &'static str, value: &str) -> Result<i64, NodesParseErrorKind> {
    value
        .parse()
        .map_err(|source| NodesParseErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

/// Per-line accumulator, frozen into a [`ClusterNode`] once the line is done
struct NodeBuilder {
    node_id: String,
    host_and_port: String,
    flags: Vec<String>,
    master_node_id: String,
    ping_sent: i64,
    pong_received: i64,
    config_epoch: i64,
    connected: bool,
    migrating: BTreeMap<u16, String>,
    importing: BTreeMap<u16, String>,
    served_slots: BTreeSet<u16>,
}

impl NodeBuilder {
    fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            host_and_port: String::new(),
            flags: Vec::new(),
            master_node_id: String::new(),
            ping_sent: 0,
            pong_received: 0,
            config_epoch: 0,
            connected: false,
            migrating: BTreeMap::new(),
            importing: BTreeMap::new(),
            served_slots: BTreeSet::new(),
        }
    }

    /// `[slot->-destination]` or `[slot-<-source]`
    fn add_descriptor(&mut self, token: &str) -> Result<(), NodesParseErrorKind> {
        let invalid = || NodesParseErrorKind::InvalidDescriptor(token.to_string());

        let inner = token
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(invalid)?;

        let (target, slot, node_id) =
            if let Some((slot, node_id)) = inner.split_once(MIGRATING_SEPARATOR) {
                (&mut self.migrating, slot, node_id)
            } else if let Some((slot, node_id)) = inner.split_once(IMPORTING_SEPARATOR) {
                (&mut self.importing, slot, node_id)
            } else {
                return Err(invalid());
            };

        let slot: u16 = slot.parse().map_err(|_| invalid())?;
        if slot >= TOTAL_SLOTS || node_id.is_empty() {
            return Err(invalid());
        }

        target.insert(slot, node_id.to_string());
        Ok(())
    }

    fn add_slots(&mut self, token: &str) -> Result<(), NodesParseErrorKind> {
        let range = parse_slot_token(token).map_err(NodesParseErrorKind::InvalidSlots)?;
        self.served_slots.extend(range.start..=range.end);
        Ok(())
    }

    fn build(self) -> ClusterNode {
        ClusterNode {
            node_id: self.node_id,
            host_and_port: self.host_and_port,
            flags: self.flags,
            master_node_id: self.master_node_id,
            ping_sent: self.ping_sent,
            pong_received: self.pong_received,
            config_epoch: self.config_epoch,
            connected: self.connected,
            migrating: self.migrating,
            importing: self.importing,
            served_slots: self.served_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "10.0.0.5:7000";

    #[test]
    fn test_parse_myself_master_with_loopback_address() {
        let line = "abc123 127.0.0.1:7000 myself,master - 0 0 1 connected 0-5461";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();

        assert_eq!(node.node_id(), "abc123");
        assert_eq!(node.host_and_port(), "10.0.0.5:7000");
        assert_eq!(node.flags(), ["myself", "master"]);
        assert_eq!(node.master_node_id(), "");
        assert!(node.is_connected());
        assert_eq!(node.slot_count(), 5462);
        assert_eq!(node.served_slots().first(), Some(&0));
        assert_eq!(node.served_slots().last(), Some(&5461));
        assert!(node.migrating().is_empty());
        assert!(node.importing().is_empty());
    }

    #[test]
    fn test_parse_migrating_descriptor() {
        let line =
            "def456 10.0.0.6:7001 myself,master - 0 0 2 connected [1000->-abc123] 5462-10922";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();

        assert_eq!(node.host_and_port(), "10.0.0.6:7001");
        assert_eq!(node.migrating().get(&1000).map(String::as_str), Some("abc123"));
        assert_eq!(node.migrating().len(), 1);
        assert_eq!(node.served_slots_display(), "5462-10922");
    }

    #[test]
    fn test_parse_importing_descriptor() {
        let line = "def456 10.0.0.6:7001 myself,master - 0 0 2 connected 0-10 [93-<-292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f]";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();

        assert_eq!(
            node.importing().get(&93).map(String::as_str),
            Some("292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f")
        );
        assert_eq!(node.slot_count(), 11);
    }

    #[test]
    fn test_parse_replica() {
        let line = "07c37dfeb235213a872192d90877d0cd55635b91 10.0.0.7:30004 slave e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 0 1426238317239 4 connected";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();

        assert!(node.is_replica());
        assert_eq!(
            node.master_node_id(),
            "e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca"
        );
        assert_eq!(node.pong_received(), 1426238317239);
        assert_eq!(node.config_epoch(), 4);
        assert!(node.served_slots().is_empty());
    }

    #[test]
    fn test_address_kept_when_endpoint_blank() {
        let line = "abc 127.0.0.1:7000 master - 0 0 1 connected";
        let node = parse_cluster_node_line(line, "  ").unwrap();
        assert_eq!(node.host_and_port(), "127.0.0.1:7000");
    }

    #[test]
    fn test_empty_self_address_uses_endpoint() {
        let line = "abc :7000 myself,master - 0 0 0 connected";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();
        assert_eq!(node.host_and_port(), ENDPOINT);
    }

    #[test]
    fn test_localhost_is_substituted() {
        let line = "abc localhost:7002 master - 0 0 0 connected";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();
        assert_eq!(node.host_and_port(), "10.0.0.5:7002");
    }

    #[test]
    fn test_address_without_port_is_rejected() {
        let line = "abc 10.0.0.1 master - 0 0 0 connected";
        let err = parse_cluster_node_line(line, ENDPOINT).unwrap_err();
        assert!(matches!(err, NodesParseErrorKind::InvalidAddress(ref a) if a == "10.0.0.1"));
    }

    #[test]
    fn test_bus_port_suffix_is_not_stripped() {
        let line = "abc 127.0.0.1:7000@17000 master - 0 0 0 connected";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();
        assert_eq!(node.host_and_port(), "10.0.0.5:7000@17000");
        assert_eq!(node.port(), None);
    }

    #[test]
    fn test_flags_trimmed_deduplicated_and_ordered() {
        let line = "abc 10.0.0.1:7000 slave,,fail?,slave - 0 0 0 disconnected";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();
        assert_eq!(node.flags(), ["slave", "fail?"]);
        assert!(!node.is_connected());
    }

    #[test]
    fn test_unknown_link_state_is_not_connected() {
        let line = "abc 10.0.0.1:7000 master - 0 0 0 handshaking";
        let node = parse_cluster_node_line(line, ENDPOINT).unwrap();
        assert!(!node.is_connected());
    }

    #[test]
    fn test_missing_fields() {
        let err = parse_cluster_node_line("abc 10.0.0.1:7000 master - 0 0 0", ENDPOINT)
            .unwrap_err();
        assert!(matches!(
            err,
            NodesParseErrorKind::MissingFields {
                expected: 8,
                found: 7
            }
        ));
    }

    #[test]
    fn test_non_numeric_epoch() {
        let err = parse_cluster_node_line("abc 10.0.0.1:7000 master - 0 0 x connected", ENDPOINT)
            .unwrap_err();
        match err {
            NodesParseErrorKind::InvalidNumber { field, value, .. } => {
                assert_eq!(field, "config-epoch");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_descriptor_on_myself_line() {
        let line = "abc 10.0.0.1:7000 myself,master - 0 0 0 connected [1000]";
        let err = parse_cluster_node_line(line, ENDPOINT).unwrap_err();
        assert!(matches!(err, NodesParseErrorKind::InvalidDescriptor(ref t) if t == "[1000]"));

        let line = "abc 10.0.0.1:7000 myself,master - 0 0 0 connected [1000->-abc";
        assert!(matches!(
            parse_cluster_node_line(line, ENDPOINT).unwrap_err(),
            NodesParseErrorKind::InvalidDescriptor(_)
        ));

        let line = "abc 10.0.0.1:7000 myself,master - 0 0 0 connected [x->-abc]";
        assert!(matches!(
            parse_cluster_node_line(line, ENDPOINT).unwrap_err(),
            NodesParseErrorKind::InvalidDescriptor(_)
        ));
    }

    #[test]
    fn test_descriptor_on_other_line_goes_through_slot_decoder() {
        let line = "abc 10.0.0.1:7000 master - 0 0 0 connected [1000->-def]";
        let err = parse_cluster_node_line(line, ENDPOINT).unwrap_err();
        match err {
            NodesParseErrorKind::InvalidSlots(source) => assert_eq!(source.token, "[1000->-def]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_report_fails_as_a_whole() {
        let raw = "\
abc 10.0.0.1:7000 myself,master - 0 0 1 connected 0-100
def 10.0.0.2:7000 master - 0 0 oops connected 101-200
";
        let err = parse_cluster_nodes(raw, ENDPOINT).unwrap_err();
        assert_eq!(err.line_number, 2);
        assert!(err.line.starts_with("def "));
        assert!(matches!(err.kind, NodesParseErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn test_report_preserves_order_and_skips_blank_lines() {
        let raw = "b 10.0.0.2:7000 master - 0 0 2 connected 5-9\r\n\r\na 10.0.0.1:7000 myself,master - 0 0 1 connected 0-4\r\n";
        let nodes = parse_cluster_nodes(raw, ENDPOINT).unwrap();
        let ids: Vec<&str> = nodes.iter().map(ClusterNode::node_id).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(parse_cluster_nodes("", ENDPOINT).unwrap().is_empty());
    }
}
