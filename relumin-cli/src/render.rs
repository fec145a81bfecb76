//! Terminal rendering for topologies and reports

use colored::Colorize;
use relumin_core::cluster::{ClusterNode, ClusterTopology};
use relumin_core::monitoring::InfoReport;

const ID_WIDTH: usize = 8;

fn short_id(id: &str) -> &str {
    id.get(..ID_WIDTH).unwrap_or(id)
}

fn role(node: &ClusterNode) -> &'static str {
    if node.is_master() {
        "master"
    } else if node.is_replica() {
        "replica"
    } else {
        "-"
    }
}

fn descriptors(node: &ClusterNode) -> String {
    let migrating = node
        .migrating()
        .iter()
        .map(|(slot, to)| format!("[{}->-{}]", slot, short_id(to)));
    let importing = node
        .importing()
        .iter()
        .map(|(slot, from)| format!("[{}-<-{}]", slot, short_id(from)));
    migrating.chain(importing).collect::<Vec<_>>().join(" ")
}

/// One row per node, in report order
pub fn topology_table(topology: &ClusterTopology) -> String {
    let mut out = format!(
        "{:<10}{:<22}{:<9}{:<10}{:<14}{:>6}  {}",
        "ID", "ADDRESS", "ROLE", "MASTER", "LINK", "SLOTS", "RANGES"
    )
    .bold()
    .to_string();
    out.push('\n');

    for node in topology {
        let master = if node.master_node_id().is_empty() {
            "-"
        } else {
            short_id(node.master_node_id())
        };
        let link = if node.is_connected() {
            "connected"
        } else {
            "disconnected"
        };

        let mut ranges = node.served_slots_display();
        let extra = descriptors(node);
        if !extra.is_empty() {
            if !ranges.is_empty() {
                ranges.push(' ');
            }
            ranges.push_str(&extra);
        }

        let row = format!(
            "{:<10}{:<22}{:<9}{:<10}{:<14}{:>6}  {}",
            short_id(node.node_id()),
            node.host_and_port(),
            role(node),
            master,
            link,
            node.slot_count(),
            ranges
        );

        let row = if node.is_failing() {
            row.red().to_string()
        } else if !node.is_connected() {
            row.yellow().to_string()
        } else if node.is_myself() {
            row.green().bold().to_string()
        } else {
            row
        };
        out.push_str(&row);
        out.push('\n');
    }

    out.push_str(&format!(
        "{} nodes, {:.2}% slots covered",
        topology.len(),
        topology.slot_coverage()
    ));
    out
}

/// `key:value` lines, in report order
pub fn info_lines(report: &InfoReport) -> String {
    report
        .iter()
        .map(|(key, value)| format!("{}:{}", key.cyan(), value))
        .collect::<Vec<_>>()
        .join("\n")
}
