//! Redundancy policy for a content cluster.
//!
//! Configured redundancy counts are per group. A cluster organized
//! into N groups keeps N times as many copies in total, but never more
//! copies than it has nodes to put them on.

use serde::{Deserialize, Serialize};

/// Configured redundancy counts, as they appear in the cluster config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RedundancyConfig {
    /// Copies written synchronously before an insert is acknowledged.
    pub initial: u32,

    /// Copies kept at rest.
    #[serde(rename = "final")]
    pub final_redundancy: u32,

    /// Copies kept warm (indexed) for fast failover.
    pub ready_copies: u32,
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        Self {
            initial: 2,
            final_redundancy: 2,
            ready_copies: 1,
        }
    }
}

/// The effective redundancy policy of a built cluster.
///
/// Derived from [`RedundancyConfig`] once the total node count and the
/// group count are known. Every effective value is
/// `min(total_nodes, configured * implicit_groups)`.
///
/// # Examples
///
/// ```
/// use galena_cluster::{Redundancy, RedundancyConfig};
///
/// let config = RedundancyConfig { initial: 2, final_redundancy: 3, ready_copies: 2 };
/// let redundancy = Redundancy::new(config, 8, 2);
/// assert_eq!(redundancy.effective_final_redundancy(), 6);
/// assert_eq!(redundancy.effective_initial_redundancy(), 4);
///
/// // Capped by the number of available nodes.
/// let small = Redundancy::new(config, 4, 2);
/// assert_eq!(small.effective_final_redundancy(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redundancy {
    config: RedundancyConfig,
    total_nodes: u32,
    implicit_groups: u32,
}

impl Redundancy {
    /// Builds the policy for a cluster of `total_nodes` storage nodes
    /// organized into `implicit_groups` groups (1 when the cluster is
    /// flat).
    pub fn new(config: RedundancyConfig, total_nodes: u32, implicit_groups: u32) -> Self {
        Self {
            config,
            total_nodes,
            implicit_groups: implicit_groups.max(1),
        }
    }

    pub fn initial_redundancy(&self) -> u32 {
        self.config.initial
    }

    pub fn final_redundancy(&self) -> u32 {
        self.config.final_redundancy
    }

    pub fn ready_copies(&self) -> u32 {
        self.config.ready_copies
    }

    pub fn effective_initial_redundancy(&self) -> u32 {
        self.effective(self.config.initial)
    }

    pub fn effective_final_redundancy(&self) -> u32 {
        self.effective(self.config.final_redundancy)
    }

    pub fn effective_ready_copies(&self) -> u32 {
        self.effective(self.config.ready_copies)
    }

    fn effective(&self, configured: u32) -> u32 {
        self.total_nodes.min(configured * self.implicit_groups)
    }
}
