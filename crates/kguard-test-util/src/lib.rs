//! Shared test utilities for the kguard workspace.
//!
//! Engine and app tests need the same small inventories, a way to park a
//! check mid-body until the test releases it, and a way to compare run reports
//! without their timestamps.

use kguard_domain::{Cluster, Deployment, Domain, MachineConfig, Node, Pod};
use serde_json::Value;
use std::sync::{Arc, Condvar, Mutex, Once, PoisonError};
use std::time::Duration;

pub const CLUSTER_ID: &str = "cluster-1";

pub fn cluster() -> Cluster {
    Cluster {
        id: CLUSTER_ID.to_string(),
        name: "prod".to_string(),
        ..Cluster::default()
    }
}

pub fn node(id: &str) -> Node {
    Node {
        id: id.to_string(),
        name: format!("{id}.internal"),
        cluster_id: CLUSTER_ID.to_string(),
        ..Node::default()
    }
}

pub fn deployment(id: &str) -> Deployment {
    Deployment {
        id: id.to_string(),
        name: id.to_string(),
        namespace: "default".to_string(),
        cluster_id: CLUSTER_ID.to_string(),
        replicas: 1,
        ..Deployment::default()
    }
}

pub fn pod(id: &str, deployment_id: &str) -> Pod {
    Pod {
        id: id.to_string(),
        name: id.to_string(),
        namespace: "default".to_string(),
        deployment_id: deployment_id.to_string(),
        node_name: None,
    }
}

pub fn machine_config(id: &str, role: &str) -> MachineConfig {
    MachineConfig {
        id: id.to_string(),
        name: id.to_string(),
        roles: vec![role.to_string()],
        ..MachineConfig::default()
    }
}

/// A shared domain with the given node and deployment ids and no pods.
pub fn domain(node_ids: &[&str], deployment_ids: &[&str]) -> Arc<Domain> {
    Arc::new(Domain::new(
        cluster(),
        node_ids.iter().map(|id| node(id)).collect(),
        deployment_ids.iter().map(|id| deployment(id)).collect(),
        Vec::new(),
    ))
}

/// A one-way latch: closed until `open` is called, then open forever.
#[derive(Clone, Debug, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_open(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the gate is opened.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _open = cvar
            .wait_while(guard, |open| !*open)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Block until the gate is opened or `timeout` elapses. Returns whether it opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (open, _) = cvar
            .wait_timeout_while(guard, timeout, |open| !*open)
            .unwrap_or_else(PoisonError::into_inner);
        *open
    }
}

/// Route `tracing` output through the test harness. Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

/// Normalize non-deterministic fields of a serialized run report.
///
/// `tool.version` is replaced only at the root of something shaped like a
/// report (`schema`, `tool`, `standard`, `outcome`, `checks`). Timestamps
/// (`started_at`, `finished_at`) and `duration_ms` are replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_report = ["schema", "tool", "standard", "outcome", "checks"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_report
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert(
                "version".to_string(),
                Value::String("__VERSION__".to_string()),
            );
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if map.contains_key(key) {
                    map.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
                }
            }
            if map.contains_key("duration_ms") {
                map.insert("duration_ms".to_string(), Value::Number(0.into()));
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn domain_fixture_has_requested_targets() {
        let d = domain(&["n1", "n2"], &["d1"]);
        assert_eq!(d.cluster().id(), CLUSTER_ID);
        assert_eq!(d.nodes().len(), 2);
        assert_eq!(d.deployments()[0].id(), "d1");
    }

    #[test]
    fn gate_releases_waiters() {
        let gate = Gate::new();
        assert!(!gate.wait_timeout(Duration::from_millis(5)));
        let waiter = gate.clone();
        let handle = thread::spawn(move || waiter.wait());
        gate.open();
        handle.join().unwrap();
        assert!(gate.is_open());
    }

    #[test]
    fn normalizes_report_shaped_root_only() {
        let report = json!({
            "schema": "kguard.run_report.v1",
            "tool": {"name": "kguard", "version": "1.2.3"},
            "standard": "cis",
            "outcome": {"status": "completed"},
            "started_at": "2026-01-01T00:00:00Z",
            "duration_ms": 17,
            "checks": [{"tool": {"version": "keep"}}]
        });
        let normalized = normalize_nondeterministic(report);
        assert_eq!(normalized["tool"]["version"], "__VERSION__");
        assert_eq!(normalized["started_at"], "__TIMESTAMP__");
        assert_eq!(normalized["duration_ms"], 0);
        assert_eq!(normalized["checks"][0]["tool"]["version"], "keep");
    }
}
