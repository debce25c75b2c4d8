use crate::model::{Cluster, Deployment, MachineConfig, Node};
use kguard_types::TargetKind;
use std::fmt;
use std::sync::Arc;

/// One evaluable object of a [`crate::Domain`].
///
/// Objects sit behind `Arc`; cloning a target is a refcount bump.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Cluster(Arc<Cluster>),
    Node(Arc<Node>),
    Deployment(Arc<Deployment>),
    MachineConfig(Arc<MachineConfig>),
}

/// Identity of a target: `(kind, id)`. Used as the key of the results tree.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: String,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Cluster(_) => TargetKind::Cluster,
            Target::Node(_) => TargetKind::Node,
            Target::Deployment(_) => TargetKind::Deployment,
            Target::MachineConfig(_) => TargetKind::MachineConfig,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Target::Cluster(c) => &c.id,
            Target::Node(n) => &n.id,
            Target::Deployment(d) => &d.id,
            Target::MachineConfig(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Target::Cluster(c) => &c.name,
            Target::Node(n) => &n.name,
            Target::Deployment(d) => &d.name,
            Target::MachineConfig(m) => &m.name,
        }
    }

    pub fn to_ref(&self) -> TargetRef {
        TargetRef::new(self.kind(), self.id())
    }

    pub fn as_cluster(&self) -> Option<&Cluster> {
        match self {
            Target::Cluster(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Target::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_deployment(&self) -> Option<&Deployment> {
        match self {
            Target::Deployment(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_machine_config(&self) -> Option<&MachineConfig> {
        match self {
            Target::MachineConfig(m) => Some(m),
            _ => None,
        }
    }

    /// Typed cluster view.
    ///
    /// # Panics
    ///
    /// Panics if this target is not a cluster. Asking for the wrong view is a
    /// bug in the calling check.
    pub fn cluster(&self) -> &Cluster {
        match self.as_cluster() {
            Some(c) => c,
            None => self.wrong_view(TargetKind::Cluster),
        }
    }

    /// Typed node view. Panics on any other kind, see [`Target::cluster`].
    pub fn node(&self) -> &Node {
        match self.as_node() {
            Some(n) => n,
            None => self.wrong_view(TargetKind::Node),
        }
    }

    /// Typed deployment view. Panics on any other kind, see [`Target::cluster`].
    pub fn deployment(&self) -> &Deployment {
        match self.as_deployment() {
            Some(d) => d,
            None => self.wrong_view(TargetKind::Deployment),
        }
    }

    /// Typed machine config view. Panics on any other kind, see [`Target::cluster`].
    pub fn machine_config(&self) -> &MachineConfig {
        match self.as_machine_config() {
            Some(m) => m,
            None => self.wrong_view(TargetKind::MachineConfig),
        }
    }

    fn wrong_view(&self, wanted: TargetKind) -> ! {
        panic!(
            "target {} is a {}, not a {}",
            self.to_ref(),
            self.kind(),
            wanted
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind(), self.name(), self.id())
    }
}

impl From<Cluster> for Target {
    fn from(c: Cluster) -> Self {
        Target::Cluster(Arc::new(c))
    }
}

impl From<Node> for Target {
    fn from(n: Node) -> Self {
        Target::Node(Arc::new(n))
    }
}

impl From<Deployment> for Target {
    fn from(d: Deployment) -> Self {
        Target::Deployment(Arc::new(d))
    }
}

impl From<MachineConfig> for Target {
    fn from(m: MachineConfig) -> Self {
        Target::MachineConfig(Arc::new(m))
    }
}
