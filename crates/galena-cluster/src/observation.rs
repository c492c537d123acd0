//! The per-node observation arena.
//!
//! One [`NodeObservation`] record exists for every configured node,
//! created when the cluster is built and mutated in place by report
//! delivery for the lifetime of the cluster object. The records are
//! held in an arena keyed by [`NodeId`] rather than a linked object
//! graph, so readers can take a plain snapshot reference with no
//! back-pointers to chase.

use std::collections::BTreeMap;

use galena_hostinfo::HostInfo;
use galena_types::{NodeId, NodeState, State, Timestamp};

use crate::topology::{ConfiguredNode, Group};
use crate::{Error, Result};

/// A heartbeat delivered for a configured node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    /// The node the report is about.
    pub node: NodeId,

    /// The operational state the node reported for itself.
    pub state: NodeState,

    /// When the report arrived.
    pub timestamp: Timestamp,
}

/// Everything the controller knows about one configured node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeObservation {
    reported: NodeState,
    reported_at: Timestamp,
    wanted: NodeState,
    host_info: Option<HostInfo>,
}

impl NodeObservation {
    /// A node nothing has been heard from: reported `Down`, wanted
    /// `Up`, no host info.
    fn unreported() -> Self {
        Self {
            reported: NodeState::new(State::Down),
            reported_at: Timestamp::EPOCH,
            wanted: NodeState::default(),
            host_info: None,
        }
    }

    /// The most recent self-reported operational state.
    pub fn reported_state(&self) -> &NodeState {
        &self.reported
    }

    /// When the reported state last changed hands.
    pub fn reported_state_timestamp(&self) -> Timestamp {
        self.reported_at
    }

    /// The administrative target state.
    pub fn wanted_state(&self) -> &NodeState {
        &self.wanted
    }

    /// The last parsed host-info report, for distributors that have
    /// delivered one.
    pub fn host_info(&self) -> Option<&HostInfo> {
        self.host_info.as_ref()
    }
}

/// The observation arena plus the static topology it was built for.
///
/// This is the snapshot the decision engine evaluates against. All
/// accessors borrow; mutation happens through the `set_*` methods on
/// the write path only.
#[derive(Debug, Clone)]
pub struct ClusterInfo {
    nodes: Vec<ConfiguredNode>,
    groups: Vec<Group>,
    observations: BTreeMap<NodeId, NodeObservation>,
}

impl ClusterInfo {
    /// Builds the arena for a configured node set: one distributor and
    /// one storage observation per configured index.
    ///
    /// `nodes` must be sorted by index; the config loader guarantees
    /// this.
    pub fn new(nodes: Vec<ConfiguredNode>, groups: Vec<Group>) -> Self {
        let mut observations = BTreeMap::new();
        for node in &nodes {
            observations.insert(NodeId::distributor(node.index), NodeObservation::unreported());
            observations.insert(NodeId::storage(node.index), NodeObservation::unreported());
        }
        Self {
            nodes,
            groups,
            observations,
        }
    }

    /// The configured node set, ascending by index.
    pub fn configured_nodes(&self) -> &[ConfiguredNode] {
        &self.nodes
    }

    /// The configured group layout (empty for a flat cluster).
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Configured storage node ids, ascending by index.
    pub fn configured_storage_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| NodeId::storage(node.index))
    }

    /// Configured distributor ids, ascending by index.
    pub fn configured_distributors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .map(|node| NodeId::distributor(node.index))
    }

    /// The observation record for `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not in the configured set. Querying an
    /// unconfigured node is a caller bug, not an operational
    /// condition.
    pub fn observation(&self, node: NodeId) -> &NodeObservation {
        self.observations
            .get(&node)
            .unwrap_or_else(|| panic!("node {node} is not in the configured set"))
    }

    /// The most recent reported state of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not in the configured set.
    pub fn reported_state(&self, node: NodeId) -> &NodeState {
        self.observation(node).reported_state()
    }

    /// The administrative target state of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not in the configured set.
    pub fn wanted_state(&self, node: NodeId) -> &NodeState {
        self.observation(node).wanted_state()
    }

    /// The last host-info report from distributor `index`, if any.
    ///
    /// # Panics
    ///
    /// Panics if no distributor with `index` is configured.
    pub fn host_info(&self, index: u16) -> Option<&HostInfo> {
        self.observation(NodeId::distributor(index)).host_info()
    }

    /// Number of configured storage nodes whose reported state counts
    /// towards the availability quorum.
    pub fn up_storage_node_count(&self) -> usize {
        self.configured_storage_nodes()
            .filter(|&node| self.reported_state(node).state().counts_as_up())
            .count()
    }

    /// Records a heartbeat-delivered reported state.
    pub fn set_reported_state(&mut self, heartbeat: Heartbeat) -> Result<()> {
        let observation = self
            .observations
            .get_mut(&heartbeat.node)
            .ok_or(Error::UnknownNode(heartbeat.node))?;
        observation.reported = heartbeat.state;
        observation.reported_at = heartbeat.timestamp;
        Ok(())
    }

    /// Records an administratively applied wanted state.
    pub fn set_wanted_state(&mut self, node: NodeId, wanted: NodeState) -> Result<()> {
        let observation = self
            .observations
            .get_mut(&node)
            .ok_or(Error::UnknownNode(node))?;
        observation.wanted = wanted;
        Ok(())
    }

    /// Records a parsed host-info report for distributor `index`.
    pub fn set_host_info(&mut self, index: u16, host_info: HostInfo) -> Result<()> {
        let node = NodeId::distributor(index);
        let observation = self
            .observations
            .get_mut(&node)
            .ok_or(Error::UnknownNode(node))?;
        observation.host_info = Some(host_info);
        Ok(())
    }
}
