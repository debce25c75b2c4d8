use crate::model::{Cluster, Deployment, MachineConfig, Node, Pod};
use crate::target::{Target, TargetRef};
use kguard_types::TargetKind;
use serde::{Deserialize, Serialize};

/// Immutable per-run snapshot of everything a check can target.
///
/// Built once, then shared behind an `Arc` by every check of the run. There is
/// no `&mut self` API after construction.
#[derive(Clone, Debug)]
pub struct Domain {
    cluster: Target,
    nodes: Vec<Target>,
    deployments: Vec<Target>,
    machine_configs: Vec<Target>,
    pods: Vec<Pod>,
}

impl Domain {
    pub fn new(
        cluster: Cluster,
        nodes: Vec<Node>,
        deployments: Vec<Deployment>,
        pods: Vec<Pod>,
    ) -> Self {
        Self {
            cluster: Target::from(cluster),
            nodes: nodes.into_iter().map(Target::from).collect(),
            deployments: deployments.into_iter().map(Target::from).collect(),
            machine_configs: Vec::new(),
            pods,
        }
    }

    /// Attach machine configs. Consumes the domain, so it can only happen before sharing.
    pub fn with_machine_configs(mut self, machine_configs: Vec<MachineConfig>) -> Self {
        self.machine_configs = machine_configs.into_iter().map(Target::from).collect();
        self
    }

    pub fn cluster(&self) -> &Target {
        &self.cluster
    }

    pub fn nodes(&self) -> &[Target] {
        &self.nodes
    }

    pub fn deployments(&self) -> &[Target] {
        &self.deployments
    }

    pub fn machine_configs(&self) -> &[Target] {
        &self.machine_configs
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    /// All targets of one kind, in snapshot order.
    pub fn targets(&self, kind: TargetKind) -> &[Target] {
        match kind {
            TargetKind::Cluster => std::slice::from_ref(&self.cluster),
            TargetKind::Node => &self.nodes,
            TargetKind::Deployment => &self.deployments,
            TargetKind::MachineConfig => &self.machine_configs,
        }
    }

    pub fn target(&self, target: &TargetRef) -> Option<&Target> {
        self.targets(target.kind)
            .iter()
            .find(|t| t.id() == target.id)
    }

    pub fn pods_for<'a>(&'a self, deployment_id: &'a str) -> impl Iterator<Item = &'a Pod> + 'a {
        self.pods
            .iter()
            .filter(move |p| p.deployment_id == deployment_id)
    }
}

/// Serializable form of a [`Domain`], e.g. an inventory dump on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub cluster: Cluster,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default)]
    pub machine_configs: Vec<MachineConfig>,
}

impl From<DomainSnapshot> for Domain {
    fn from(s: DomainSnapshot) -> Self {
        Domain::new(s.cluster, s.nodes, s.deployments, s.pods)
            .with_machine_configs(s.machine_configs)
    }
}
