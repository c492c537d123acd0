//! Static cluster topology: the configured node set and group layout.
//!
//! Topology is fixed at cluster build time. Each configured index
//! exists twice in the running system, once as a distributor and once
//! as a storage node; the observation arena holds an entry for both.

use serde::{Deserialize, Serialize};

/// A node declared in the cluster configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredNode {
    /// Distribution key of the node.
    pub index: u16,

    /// Retired nodes keep serving data but receive no new buckets.
    #[serde(default)]
    pub retired: bool,
}

impl ConfiguredNode {
    pub fn new(index: u16, retired: bool) -> Self {
        Self { index, retired }
    }
}

/// A named group of storage nodes.
///
/// Groups model placement domains (rack, chassis, site). When a
/// cluster is organized into groups, redundancy settings are taken to
/// be per group and multiplied up by the group count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Distribution-key index of the group.
    pub index: u16,

    /// Operator-facing group name.
    pub name: String,

    /// Indices of the configured nodes placed in this group.
    #[serde(default)]
    pub nodes: Vec<u16>,
}

impl Group {
    pub fn new(index: u16, name: impl Into<String>, nodes: Vec<u16>) -> Self {
        Self {
            index,
            name: name.into(),
            nodes,
        }
    }

    /// Returns whether `node_index` is placed in this group.
    pub fn contains(&self, node_index: u16) -> bool {
        self.nodes.contains(&node_index)
    }
}
