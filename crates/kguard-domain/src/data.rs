//! The data repository checks query through their context.
//!
//! The engine never looks inside these values. A repository must return the
//! same answers for the whole run; implementations fetch once, up front.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub trait DataRepository: Send + Sync {
    /// Cluster-wide data (API server flags, RBAC objects, ...).
    fn cluster_data(&self) -> Option<&Value>;

    /// Data scraped from the host behind a node, keyed by node name.
    fn host_data(&self, node_name: &str) -> Option<&Value>;

    /// A named dataset, matching a check's declared data dependency tag
    /// (`"network_policies"`, `"images"`, ...).
    fn dataset(&self, tag: &str) -> Option<&Value>;

    fn has_dataset(&self, tag: &str) -> bool {
        self.dataset(tag).is_some()
    }
}

/// In-memory repository, loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticDataRepository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Value>,
    #[serde(default)]
    pub hosts: BTreeMap<String, Value>,
    #[serde(default)]
    pub datasets: BTreeMap<String, Value>,
}

impl StaticDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster_data(mut self, value: Value) -> Self {
        self.cluster = Some(value);
        self
    }

    pub fn with_host_data(mut self, node_name: impl Into<String>, value: Value) -> Self {
        self.hosts.insert(node_name.into(), value);
        self
    }

    pub fn with_dataset(mut self, tag: impl Into<String>, value: Value) -> Self {
        self.datasets.insert(tag.into(), value);
        self
    }
}

impl DataRepository for StaticDataRepository {
    fn cluster_data(&self) -> Option<&Value> {
        self.cluster.as_ref()
    }

    fn host_data(&self, node_name: &str) -> Option<&Value> {
        self.hosts.get(node_name)
    }

    fn dataset(&self, tag: &str) -> Option<&Value> {
        self.datasets.get(tag)
    }
}
