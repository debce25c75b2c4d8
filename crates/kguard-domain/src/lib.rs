//! Cluster inventory snapshot (no IO).
//!
//! Input: cluster, node, deployment, pod and machine config objects gathered elsewhere.
//! Output: an immutable [`Domain`] that every check of a run reads concurrently.

#![forbid(unsafe_code)]

pub mod data;
pub mod domain;
pub mod model;
pub mod target;

pub use data::{DataRepository, StaticDataRepository};
pub use domain::{Domain, DomainSnapshot};
pub use model::{Cluster, Container, Deployment, MachineConfig, Node, Pod};
pub use target::{Target, TargetRef};

#[cfg(test)]
mod proptest;
