//! Content-cluster observation model for `Galena`.
//!
//! This crate owns what the cluster controller *knows*:
//! - The configured topology: node set, groups, redundancy policy
//!   ([`ConfiguredNode`], [`Group`], [`Redundancy`])
//! - The live observation arena: per-node reported state, wanted
//!   state, and distributor host-info reports ([`ClusterInfo`],
//!   [`NodeObservation`])
//! - Cluster configuration loading ([`ClusterConfig`])
//!
//! Observations are continuously updated by report delivery and read
//! by the decision engine in `galena-controller`; see
//! [`ContentCluster`] for the locking contract.

pub mod config;
pub mod error;
pub mod observation;
pub mod redundancy;
pub mod topology;

mod cluster;

pub use cluster::ContentCluster;
pub use config::{ClusterConfig, ClusterSection, ClusterThresholds};
pub use error::{Error, Result};
pub use observation::{ClusterInfo, Heartbeat, NodeObservation};
pub use redundancy::{Redundancy, RedundancyConfig};
pub use topology::{ConfiguredNode, Group};
