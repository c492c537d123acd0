//! Cluster configuration: the TOML file that declares a content
//! cluster.
//!
//! ```toml
//! [cluster]
//! name = "search"
//! node-count = 4
//! retired = [3]
//!
//! [[group]]
//! index = 0
//! name = "rack-a"
//! nodes = [0, 1]
//!
//! [[group]]
//! index = 1
//! name = "rack-b"
//! nodes = [2, 3]
//!
//! [redundancy]
//! initial = 2
//! final = 3
//! ready-copies = 2
//!
//! [thresholds]
//! min-storage-nodes-up = 3
//! min-ratio-of-storage-nodes-up = 0.9
//! ```
//!
//! Every section has working defaults; an empty file is a valid
//! single-node development cluster.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::redundancy::RedundancyConfig;
use crate::topology::{ConfiguredNode, Group};
use crate::{Error, Result};

/// Configuration for a Galena content cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterConfig {
    pub cluster: ClusterSection,

    /// Group layout; empty means a flat cluster.
    #[serde(rename = "group")]
    pub groups: Vec<Group>,

    pub redundancy: RedundancyConfig,

    pub thresholds: ClusterThresholds,
}

/// The `[cluster]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterSection {
    /// Cluster name, used in logs and operator messages.
    pub name: String,

    /// Number of configured node indices. Each index runs one
    /// distributor and one storage node.
    pub node_count: u16,

    /// Indices configured as retired.
    pub retired: Vec<u16>,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            name: "galena".to_string(),
            node_count: 1,
            retired: Vec::new(),
        }
    }
}

/// Cluster-wide availability policy inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterThresholds {
    /// Minimum number of storage nodes that must be up for a safe
    /// take-down to be considered at all.
    pub min_storage_nodes_up: u32,

    /// Minimum fraction of storage nodes that must be up.
    pub min_ratio_of_storage_nodes_up: f64,
}

impl Default for ClusterThresholds {
    fn default() -> Self {
        Self {
            min_storage_nodes_up: 1,
            min_ratio_of_storage_nodes_up: 0.0,
        }
    }
}

impl ClusterConfig {
    /// Loads and validates a cluster config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the semantic invariants the TOML schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.cluster.node_count == 0 {
            return Err(Error::InvalidConfig(
                "node-count must be >= 1".to_string(),
            ));
        }
        if let Some(index) = self
            .cluster
            .retired
            .iter()
            .find(|&&index| index >= self.cluster.node_count)
        {
            return Err(Error::InvalidConfig(format!(
                "retired index {index} is outside the configured range 0..{}",
                self.cluster.node_count
            )));
        }
        let ratio = self.thresholds.min_ratio_of_storage_nodes_up;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::InvalidConfig(format!(
                "min-ratio-of-storage-nodes-up must be within [0, 1], got {ratio}"
            )));
        }
        if self.redundancy.final_redundancy == 0 || self.redundancy.initial == 0 {
            return Err(Error::InvalidConfig(
                "redundancy counts must be >= 1".to_string(),
            ));
        }
        for group in &self.groups {
            if let Some(index) = group
                .nodes
                .iter()
                .find(|&&index| index >= self.cluster.node_count)
            {
                return Err(Error::InvalidConfig(format!(
                    "group '{}' places unconfigured node {index}",
                    group.name
                )));
            }
        }
        let mut group_indexes: Vec<u16> = self.groups.iter().map(|group| group.index).collect();
        group_indexes.sort_unstable();
        group_indexes.dedup();
        if group_indexes.len() != self.groups.len() {
            return Err(Error::InvalidConfig(
                "group indexes must be unique".to_string(),
            ));
        }
        Ok(())
    }

    /// Materializes the configured node list, ascending by index.
    pub fn configured_nodes(&self) -> Vec<ConfiguredNode> {
        (0..self.cluster.node_count)
            .map(|index| ConfiguredNode::new(index, self.cluster.retired.contains(&index)))
            .collect()
    }
}
