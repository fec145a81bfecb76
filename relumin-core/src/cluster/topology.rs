//! Cluster topology snapshot
//!
//! An ordered, read-only view over the nodes of one `CLUSTER NODES` report.
//! Nothing here checks that the report is consistent: a slot claimed by two
//! masters is simply owned by whichever comes first.

use serde::Serialize;
use std::collections::BTreeSet;

use super::nodes_parser::parse_cluster_nodes;
use super::types::{ClusterNode, NodesParseError, TOTAL_SLOTS};

/// One slot handoff as seen by the reporting node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotMigration {
    pub slot: u16,
    pub from_node_id: String,
    pub to_node_id: String,
}

/// Nodes of a single report, in report order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClusterTopology {
    nodes: Vec<ClusterNode>,
}

impl ClusterTopology {
    /// Parse a raw `CLUSTER NODES` report fetched from `queried_endpoint`
    pub fn parse(raw: &str, queried_endpoint: &str) -> Result<Self, NodesParseError> {
        parse_cluster_nodes(raw, queried_endpoint).map(Self::from_nodes)
    }

    pub fn from_nodes(nodes: Vec<ClusterNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[ClusterNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<ClusterNode> {
        self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClusterNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id (case-insensitive)
    pub fn get(&self, node_id: &str) -> Option<&ClusterNode> {
        self.nodes
            .iter()
            .find(|n| n.node_id().eq_ignore_ascii_case(node_id))
    }

    /// The node that produced the report
    pub fn myself(&self) -> Option<&ClusterNode> {
        self.nodes.iter().find(|n| n.is_myself())
    }

    pub fn masters(&self) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().filter(|n| n.is_master())
    }

    pub fn replicas_of<'a>(&'a self, master_id: &'a str) -> impl Iterator<Item = &'a ClusterNode> {
        self.nodes.iter().filter(move |n| {
            !n.master_node_id().is_empty() && n.master_node_id().eq_ignore_ascii_case(master_id)
        })
    }

    /// First node in report order that serves `slot`
    pub fn slot_owner(&self, slot: u16) -> Option<&ClusterNode> {
        self.nodes.iter().find(|n| n.serves_slot(slot))
    }

    /// Union of every served slot
    pub fn covered_slots(&self) -> BTreeSet<u16> {
        self.nodes
            .iter()
            .flat_map(|n| n.served_slots().iter().copied())
            .collect()
    }

    /// Percentage of the slot space served by some node
    pub fn slot_coverage(&self) -> f64 {
        (self.covered_slots().len() as f64 / f64::from(TOTAL_SLOTS)) * 100.0
    }

    pub fn has_full_coverage(&self) -> bool {
        self.covered_slots().len() == usize::from(TOTAL_SLOTS)
    }

    /// Slot handoffs declared on the reporting node's line
    pub fn migrations(&self) -> Vec<SlotMigration> {
        let mut migrations = Vec::new();
        for node in &self.nodes {
            for (&slot, to) in node.migrating() {
                migrations.push(SlotMigration {
                    slot,
                    from_node_id: node.node_id().to_string(),
                    to_node_id: to.clone(),
                });
            }
            for (&slot, from) in node.importing() {
                migrations.push(SlotMigration {
                    slot,
                    from_node_id: from.clone(),
                    to_node_id: node.node_id().to_string(),
                });
            }
        }
        migrations
    }
}

impl<'a> IntoIterator for &'a ClusterTopology {
    type Item = &'a ClusterNode;
    type IntoIter = std::slice::Iter<'a, ClusterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for ClusterTopology {
    type Item = ClusterNode;
    type IntoIter = std::vec::IntoIter<ClusterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
