//! The content cluster: static policy plus the live observation arena.

use std::sync::{RwLock, RwLockReadGuard};

use galena_hostinfo::HostInfo;
use galena_types::{NodeId, NodeState};
use tracing::debug;

use crate::config::{ClusterConfig, ClusterThresholds};
use crate::observation::{ClusterInfo, Heartbeat};
use crate::redundancy::{Redundancy, RedundancyConfig};
use crate::topology::{ConfiguredNode, Group};
use crate::Result;

/// A configured content cluster and everything observed about it.
///
/// The static parts (name, redundancy policy, thresholds) are fixed at
/// build time. The observation arena sits behind a single `RwLock`:
/// report delivery takes brief write locks, the decision path takes a
/// read lock and evaluates against that snapshot. Each node's
/// observation is therefore always read as a unit; consistency across
/// nodes is not promised and not needed.
///
/// Reconfiguration (nodes added or removed) builds a new
/// `ContentCluster`; observations are never migrated.
#[derive(Debug)]
pub struct ContentCluster {
    name: String,
    redundancy: Redundancy,
    thresholds: ClusterThresholds,
    info: RwLock<ClusterInfo>,
}

impl ContentCluster {
    /// Builds a cluster from explicit topology.
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<ConfiguredNode>,
        groups: Vec<Group>,
        redundancy: RedundancyConfig,
        thresholds: ClusterThresholds,
    ) -> Self {
        let total_nodes = nodes.len() as u32;
        let implicit_groups = groups.len().max(1) as u32;
        Self {
            name: name.into(),
            redundancy: Redundancy::new(redundancy, total_nodes, implicit_groups),
            thresholds,
            info: RwLock::new(ClusterInfo::new(nodes, groups)),
        }
    }

    /// Builds a cluster from a validated config file.
    pub fn from_config(config: &ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.cluster.name.clone(),
            config.configured_nodes(),
            config.groups.clone(),
            config.redundancy,
            config.thresholds,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn redundancy(&self) -> &Redundancy {
        &self.redundancy
    }

    pub fn thresholds(&self) -> ClusterThresholds {
        self.thresholds
    }

    /// Takes a read snapshot of the observation arena.
    ///
    /// The decision engine holds this guard for the duration of one
    /// evaluation; writers block only for single-node updates.
    pub fn read(&self) -> RwLockReadGuard<'_, ClusterInfo> {
        self.info.read().expect("cluster observation lock poisoned")
    }

    /// Applies a heartbeat-delivered reported state.
    pub fn apply_heartbeat(&self, heartbeat: Heartbeat) -> Result<()> {
        debug!(
            cluster = %self.name,
            node = %heartbeat.node,
            state = %heartbeat.state,
            at = %heartbeat.timestamp,
            "applying heartbeat"
        );
        self.write().set_reported_state(heartbeat)
    }

    /// Parses and stores a distributor's host-info payload.
    ///
    /// Malformed payloads degrade to an empty report inside
    /// [`HostInfo::parse`]; the only error out of here is an
    /// unconfigured distributor index.
    pub fn apply_host_info(&self, distributor_index: u16, raw: &[u8]) -> Result<()> {
        let host_info = HostInfo::parse(raw);
        debug!(
            cluster = %self.name,
            distributor = distributor_index,
            cluster_state_version = ?host_info.cluster_state_version(),
            "applying host info"
        );
        self.write().set_host_info(distributor_index, host_info)
    }

    /// Applies an administratively decided wanted state.
    pub fn apply_wanted_state(&self, node: NodeId, wanted: NodeState) -> Result<()> {
        debug!(cluster = %self.name, %node, state = %wanted, "applying wanted state");
        self.write().set_wanted_state(node, wanted)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ClusterInfo> {
        self.info
            .write()
            .expect("cluster observation lock poisoned")
    }
}
