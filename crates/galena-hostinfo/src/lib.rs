//! galena-hostinfo: Distributor host-info report parsing for `Galena`
//!
//! Each distributor periodically publishes a JSON report describing
//! what it knows about the cluster: the cluster state version it last
//! observed and, per storage node it tracks, the minimum current
//! replication factor across that node's buckets.
//!
//! The wire shape is:
//!
//! ```json
//! {
//!     "cluster-state-version": 2,
//!     "distributor": {
//!         "storage-nodes": [
//!             { "node-index": 0, "min-current-replication-factor": 2 },
//!             { "node-index": 1 }
//!         ]
//!     }
//! }
//! ```
//!
//! Absence is never a failure signal: a storage node missing from the
//! list, or listed without a replication factor, means "no
//! information". A report that does not parse at all degrades to
//! [`HostInfo::empty`], which downstream consumers must treat exactly
//! like "this distributor has not reported".

use serde::Deserialize;
use tracing::warn;

/// A distributor's most recent host-info report, parsed.
///
/// All fields are optional by design; [`HostInfo::empty`] (no version,
/// no per-node data) is the value of both "never reported" and
/// "reported garbage".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostInfo {
    #[serde(rename = "cluster-state-version")]
    cluster_state_version: Option<u32>,

    #[serde(default)]
    distributor: DistributorReport,
}

/// The `"distributor"` section of a host-info report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct DistributorReport {
    #[serde(rename = "storage-nodes", default)]
    storage_nodes: Vec<StorageNodeReport>,
}

/// Per-storage-node replication metrics within a distributor report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageNodeReport {
    #[serde(rename = "node-index")]
    node_index: u16,

    /// Lowest replication factor among the buckets this distributor
    /// has placed on the node. `None` means the distributor has no
    /// information, not that the factor is zero.
    #[serde(rename = "min-current-replication-factor")]
    min_current_replication_factor: Option<u32>,
}

impl StorageNodeReport {
    pub fn node_index(&self) -> u16 {
        self.node_index
    }

    pub fn min_current_replication_factor(&self) -> Option<u32> {
        self.min_current_replication_factor
    }
}

impl HostInfo {
    /// The report of a distributor that has told us nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a raw host-info payload, degrading to [`HostInfo::empty`]
    /// on malformed input.
    ///
    /// Unknown fields are ignored. A parse failure is logged but never
    /// propagated; the resulting empty report makes the distributor
    /// look like it has not reported yet, which is the safe
    /// interpretation.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice(raw) {
            Ok(host_info) => host_info,
            Err(error) => {
                warn!(%error, len = raw.len(), "discarding malformed host-info payload");
                Self::empty()
            }
        }
    }

    /// The cluster state version this report was generated against, if
    /// the distributor announced one.
    pub fn cluster_state_version(&self) -> Option<u32> {
        self.cluster_state_version
    }

    /// The per-node metrics entry for `node_index`, if present.
    pub fn storage_node(&self, node_index: u16) -> Option<&StorageNodeReport> {
        self.distributor
            .storage_nodes
            .iter()
            .find(|node| node.node_index == node_index)
    }

    /// Shorthand for the replication factor of `node_index`, flattening
    /// "node not listed" and "factor not reported" into `None`.
    pub fn min_replication_factor(&self, node_index: u16) -> Option<u32> {
        self.storage_node(node_index)
            .and_then(StorageNodeReport::min_current_replication_factor)
    }

    /// Returns whether this report carries any information at all.
    pub fn is_empty(&self) -> bool {
        self.cluster_state_version.is_none() && self.distributor.storage_nodes.is_empty()
    }
}
