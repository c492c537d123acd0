//! galena-controller: wanted-state transition safety checking.
//!
//! The cluster controller gates every administrative wanted-state
//! change through [`NodeStateChangeChecker`]: given the current
//! observation snapshot, may this node be taken to that state without
//! violating the cluster's redundancy and availability invariants?
//!
//! The checker is deliberately a pure predicate. It performs no I/O,
//! mutates nothing, and expresses every refusal as a [`Decision`]
//! carrying an operator-readable reason; applying an allowed
//! transition is the administrative handler's job. The observations it
//! reads are partial and possibly stale by construction (heartbeats
//! and distributor reports arrive asynchronously), which is why the
//! rules below lean on explicit "has not reported" denials instead of
//! assuming fresh data.

use galena_cluster::{ClusterInfo, ClusterThresholds, ContentCluster};
use galena_types::{Condition, NodeId, NodeState, State};
use serde::Serialize;

// ============================================================================
// Decision
// ============================================================================

/// The outcome of evaluating a wanted-state transition request.
///
/// A denial always carries a reason meant to be shown verbatim to an
/// operator or logged by automation; "already set" is reported
/// separately so handlers can answer idempotent requests without
/// treating them as failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Decision {
    allowed: bool,
    already_set: bool,
    reason: Option<String>,
}

impl Decision {
    /// The transition is safe to apply.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            already_set: false,
            reason: None,
        }
    }

    /// The transition is refused, with an operator-readable reason.
    pub fn disallow(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            already_set: false,
            reason: Some(reason.into()),
        }
    }

    /// The wanted state already has the requested value.
    pub fn already_set() -> Self {
        Self {
            allowed: false,
            already_set: true,
            reason: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn is_already_set(&self) -> bool {
        self.already_set
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

// ============================================================================
// Transition request
// ============================================================================

/// A wanted-state transition request, as issued by an administrative
/// handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// The node whose wanted state should change.
    pub target: NodeId,

    /// The cluster state version the request was issued against.
    /// Distributor reports must reference this version to be trusted.
    pub cluster_state_version: u32,

    /// Whether safety checks apply at all.
    pub condition: Condition,

    /// The node's current wanted state.
    pub current_wanted: NodeState,

    /// The requested wanted state.
    pub new_wanted: NodeState,
}

// ============================================================================
// Checker
// ============================================================================

/// Decides whether a wanted-state transition preserves the cluster's
/// redundancy and availability invariants.
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. `Force` requests bypass everything.
/// 2. Safe-set is supported for storage nodes only.
/// 3. A request for the state already wanted (descriptions ignored) is
///    reported as already set.
/// 4. A node reported `Down` is refused a wanted state of `Up`.
/// 5. Taking a node down requires the configured minimum of storage
///    nodes to be up (retired and initializing count as up).
/// 6. Taking a node down requires every *other* storage node to not be
///    reported `Down`.
/// 7. Every distributor must have reported against the request's
///    cluster state version, and none may report the target's bucket
///    redundancy below the required minimum. Distributors with no
///    information about the target abstain.
/// 8. Otherwise the transition is allowed.
#[derive(Debug, Clone, Copy)]
pub struct NodeStateChangeChecker {
    min_storage_nodes_up: u32,
    min_ratio_of_storage_nodes_up: f64,
    required_redundancy: u32,
}

impl NodeStateChangeChecker {
    pub fn new(thresholds: ClusterThresholds, required_redundancy: u32) -> Self {
        Self {
            min_storage_nodes_up: thresholds.min_storage_nodes_up,
            min_ratio_of_storage_nodes_up: thresholds.min_ratio_of_storage_nodes_up,
            required_redundancy,
        }
    }

    /// Builds a checker from a cluster's configured thresholds and its
    /// effective final redundancy.
    pub fn for_cluster(cluster: &ContentCluster) -> Self {
        Self::new(
            cluster.thresholds(),
            cluster.redundancy().effective_final_redundancy(),
        )
    }

    /// The redundancy floor this checker enforces.
    pub fn required_redundancy(&self) -> u32 {
        self.required_redundancy
    }

    /// The configured minimum up-ratio. Part of the thresholds
    /// surface; no current rule consumes it.
    pub fn min_ratio_of_storage_nodes_up(&self) -> f64 {
        self.min_ratio_of_storage_nodes_up
    }

    /// Evaluates a transition request against an observation snapshot.
    ///
    /// Pure: two evaluations of the same request against the same
    /// snapshot return the same decision.
    ///
    /// # Panics
    ///
    /// Panics if a `Safe` request targets a node outside the configured
    /// set; that is a caller bug, not an operational condition.
    pub fn evaluate_transition(&self, info: &ClusterInfo, request: &TransitionRequest) -> Decision {
        if request.condition == Condition::Force {
            return Decision::allow();
        }

        if request.target.is_distributor() {
            return Decision::disallow(
                "Safe-set of node state is only supported for storage nodes",
            );
        }

        if request.new_wanted.same_state_as(&request.current_wanted) {
            return Decision::already_set();
        }

        // Validates the target is configured; unknown targets panic here.
        let observation = info.observation(request.target);

        if request.new_wanted.state() == State::Up {
            return Self::check_set_up(observation.reported_state());
        }
        self.check_take_down(info, request)
    }

    /// Rule 4: never revive a node the cluster still sees as down.
    /// Its reported state would mask the wanted state anyway, and the
    /// request is more likely a mistake than a plan.
    fn check_set_up(reported: &NodeState) -> Decision {
        if reported.state() == State::Down {
            return Decision::disallow(
                "Refusing to set wanted state to up when it is currently in Down",
            );
        }
        Decision::allow()
    }

    /// Rules 5-7, for transitions away from `Up` (maintenance, down,
    /// retired, ...).
    fn check_take_down(&self, info: &ClusterInfo, request: &TransitionRequest) -> Decision {
        let up_count = info.up_storage_node_count();
        if (up_count as u32) < self.min_storage_nodes_up {
            return Decision::disallow(format!(
                "There are only {up_count} storage nodes up, while config requires at least {}",
                self.min_storage_nodes_up
            ));
        }

        // The target being down is not disqualifying; it is the node
        // being taken down intentionally.
        for node in info.configured_storage_nodes() {
            if node.index() == request.target.index() {
                continue;
            }
            if info.reported_state(node).state() == State::Down {
                return Decision::disallow(format!(
                    "Not enough storage nodes running: storage node {} is reported down",
                    node.index()
                ));
            }
        }

        self.check_distributor_reports(info, request)
    }

    /// Rule 7: deny if any distributor objects, checked in ascending
    /// index order with early exit, so the cited distributor is
    /// deterministic.
    fn check_distributor_reports(&self, info: &ClusterInfo, request: &TransitionRequest) -> Decision {
        for distributor in info.configured_distributors() {
            let index = distributor.index();
            let reported_version = info
                .host_info(index)
                .and_then(galena_hostinfo::HostInfo::cluster_state_version);
            if reported_version != Some(request.cluster_state_version) {
                return Decision::disallow(format!(
                    "Distributor node ({index}) has not reported any cluster state version yet."
                ));
            }

            // No entry for the target, or an entry without a factor,
            // is "no information" and must not deny on its own.
            let factor = info
                .host_info(index)
                .and_then(|host_info| host_info.min_replication_factor(request.target.index()));
            if let Some(factor) = factor {
                if factor < self.required_redundancy {
                    return Decision::disallow(format!(
                        "Distributor {index} says storage node {} has buckets with redundancy \
                         as low as {factor}, but we require at least {}",
                        request.target.index(),
                        self.required_redundancy
                    ));
                }
            }
        }

        Decision::allow()
    }
}
