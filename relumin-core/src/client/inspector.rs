use tracing::{debug, warn};

use super::executor::CommandExecutor;
use crate::cluster::ClusterTopology;
use crate::error::Result;
use crate::monitoring::{InfoReport, parse_cluster_info_result, parse_info_result};

/// Fetches reports from nodes and parses them.
///
/// One command round trip and one parse per call; no retries and no caching
/// between calls.
pub struct NodeInspector<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> NodeInspector<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// `CLUSTER NODES` as seen from `endpoint`
    pub fn cluster_nodes(&self, endpoint: &str) -> Result<ClusterTopology> {
        let raw = self.executor.execute(endpoint, &["CLUSTER", "NODES"])?;
        let topology = ClusterTopology::parse(&raw, endpoint).inspect_err(|e| {
            warn!("Rejected CLUSTER NODES reply from {}: {}", endpoint, e);
        })?;
        debug!("{} reports {} nodes", endpoint, topology.len());
        Ok(topology)
    }

    /// `INFO`, stamped with the capture time
    pub fn info(&self, endpoint: &str) -> Result<InfoReport> {
        let raw = self.executor.execute(endpoint, &["INFO"])?;
        Ok(parse_info_result(&raw))
    }

    /// `CLUSTER INFO`
    pub fn cluster_info(&self, endpoint: &str) -> Result<InfoReport> {
        let raw = self.executor.execute(endpoint, &["CLUSTER", "INFO"])?;
        Ok(parse_cluster_info_result(&raw))
    }
}
