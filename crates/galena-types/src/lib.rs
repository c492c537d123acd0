//! # galena-types: Core types for `Galena`
//!
//! This crate contains the shared vocabulary used across the Galena
//! cluster controller:
//! - Node identity ([`NodeType`], [`NodeId`])
//! - Operational states ([`State`], [`NodeState`])
//! - Transition request conditions ([`Condition`])
//! - Temporal types ([`Timestamp`])
//!
//! A node is identified by its role plus an integer distribution key;
//! the same index can (and normally does) exist once as a distributor
//! and once as a storage node.

use std::fmt::{self, Display};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================================================
// Node identity
// ============================================================================

/// The role a configured node plays in a content cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Routes documents to storage nodes and tracks per-bucket
    /// replication health.
    Distributor,
    /// Holds bucket replicas.
    Storage,
}

impl Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Distributor => write!(f, "distributor"),
            NodeType::Storage => write!(f, "storage"),
        }
    }
}

/// Identity of a configured node: role plus distribution key.
///
/// `NodeId` is the map key for every per-node observation, so it is
/// `Copy` and totally ordered (distributors sort before storage nodes,
/// then by index).
///
/// # Examples
///
/// ```
/// use galena_types::{NodeId, NodeType};
///
/// let node = NodeId::storage(1);
/// assert_eq!(node.node_type(), NodeType::Storage);
/// assert_eq!(node.index(), 1);
/// assert_eq!(node.to_string(), "storage.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    node_type: NodeType,
    index: u16,
}

impl NodeId {
    pub fn new(node_type: NodeType, index: u16) -> Self {
        Self { node_type, index }
    }

    /// Shorthand for a distributor node id.
    pub fn distributor(index: u16) -> Self {
        Self::new(NodeType::Distributor, index)
    }

    /// Shorthand for a storage node id.
    pub fn storage(index: u16) -> Self {
        Self::new(NodeType::Storage, index)
    }

    pub fn node_type(self) -> NodeType {
        self.node_type
    }

    pub fn index(self) -> u16 {
        self.index
    }

    /// Returns whether this id names a storage node.
    pub fn is_storage(self) -> bool {
        self.node_type == NodeType::Storage
    }

    /// Returns whether this id names a distributor.
    pub fn is_distributor(self) -> bool {
        self.node_type == NodeType::Distributor
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_type, self.index)
    }
}

// ============================================================================
// Operational state
// ============================================================================

/// Operational state tag for a node, reported via heartbeat or set as
/// an administrative target.
///
/// The member set is closed so every transition rule can be checked
/// exhaustively at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    Up,
    Down,
    Initializing,
    Retired,
    Maintenance,
    Stopping,
}

impl State {
    /// Returns whether a storage node in this state still counts
    /// towards the cluster's up-node quorum.
    ///
    /// Retired and initializing nodes serve or hold data and count as
    /// up for availability purposes.
    pub fn counts_as_up(self) -> bool {
        matches!(self, State::Up | State::Retired | State::Initializing)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Up => "Up",
            State::Down => "Down",
            State::Initializing => "Initializing",
            State::Retired => "Retired",
            State::Maintenance => "Maintenance",
            State::Stopping => "Stopping",
        };
        write!(f, "{name}")
    }
}

/// A state tag together with its free-text description.
///
/// The description explains *why* a state was set ("Orchestrator",
/// "rebooting for kernel upgrade") and is carried verbatim; it never
/// participates in state equality checks.
///
/// # Examples
///
/// ```
/// use galena_types::{NodeState, State};
///
/// let a = NodeState::new(State::Maintenance).with_description("os upgrade");
/// let b = NodeState::new(State::Maintenance).with_description("disk swap");
/// assert!(a.same_state_as(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    state: State,
    #[serde(default)]
    description: String,
}

impl NodeState {
    pub fn new(state: State) -> Self {
        Self {
            state,
            description: String::new(),
        }
    }

    /// Attaches a description, consuming and returning `self` for
    /// chaining.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Compares only the state tags, ignoring descriptions.
    pub fn same_state_as(&self, other: &NodeState) -> bool {
        self.state == other.state
    }
}

impl Default for NodeState {
    /// The administrative default: `Up` with an empty description.
    fn default() -> Self {
        Self::new(State::Up)
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.state)
        } else {
            write!(f, "{}: {}", self.state, self.description)
        }
    }
}

// ============================================================================
// Transition request condition
// ============================================================================

/// How strictly a wanted-state transition request should be vetted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    /// Apply unconditionally, bypassing all safety checks.
    Force,
    /// Apply only if data redundancy and availability are preserved.
    Safe,
}

// ============================================================================
// Time
// ============================================================================

/// Milliseconds since the Unix epoch.
///
/// Observation timestamps record when a report arrived. Within the
/// controller core they are metadata only; no safety rule keys off
/// elapsed time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Creates a timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Creates a timestamp for the current time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is before Unix epoch (should never
    /// happen).
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before Unix epoch");
        Self(duration.as_millis() as u64)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn node_id_ordering_groups_by_type() {
        let mut ids = vec![
            NodeId::storage(0),
            NodeId::distributor(2),
            NodeId::storage(3),
            NodeId::distributor(0),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                NodeId::distributor(0),
                NodeId::distributor(2),
                NodeId::storage(0),
                NodeId::storage(3),
            ]
        );
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::distributor(7).to_string(), "distributor.7");
        assert_eq!(NodeId::storage(0).to_string(), "storage.0");
    }

    #[test_case(State::Up, true)]
    #[test_case(State::Retired, true)]
    #[test_case(State::Initializing, true)]
    #[test_case(State::Down, false)]
    #[test_case(State::Maintenance, false)]
    #[test_case(State::Stopping, false)]
    fn counts_as_up(state: State, expected: bool) {
        assert_eq!(state.counts_as_up(), expected);
    }

    #[test]
    fn node_state_equality_ignores_description_only_via_same_state_as() {
        let a = NodeState::new(State::Maintenance).with_description("foo");
        let b = NodeState::new(State::Maintenance).with_description("bar");
        assert_ne!(a, b);
        assert!(a.same_state_as(&b));
        assert!(!a.same_state_as(&NodeState::new(State::Up)));
    }

    #[test]
    fn default_node_state_is_up_with_empty_description() {
        let state = NodeState::default();
        assert_eq!(state.state(), State::Up);
        assert_eq!(state.description(), "");
    }

    #[test]
    fn state_serde_uses_kebab_case() {
        let json = serde_json::to_string(&State::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, State::Maintenance);
    }

    #[test]
    fn condition_serde_round_trip() {
        let json = serde_json::to_string(&Condition::Safe).unwrap();
        assert_eq!(json, "\"safe\"");
        assert_eq!(
            serde_json::from_str::<Condition>("\"force\"").unwrap(),
            Condition::Force
        );
    }

    #[test]
    fn timestamp_millis_round_trip() {
        let ts = Timestamp::from_millis(1_234);
        assert_eq!(ts.as_millis(), 1_234);
        assert_eq!(u64::from(ts), 1_234);
        assert!(Timestamp::now() > Timestamp::EPOCH);
    }
}
