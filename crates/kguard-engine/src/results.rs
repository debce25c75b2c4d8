//! Per-check results tree.
//!
//! One root per check, one child per visited target, keyed by [`TargetRef`].
//! Nodes never point back into the domain.

use crate::error::CheckError;
use kguard_domain::{Target, TargetRef};
use kguard_types::{EvidenceRecord, EvidenceStatus, StatusCounts};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct ResultsNode {
    state: Mutex<NodeState>,
}

#[derive(Debug, Default)]
struct NodeState {
    evidence: Vec<EvidenceRecord>,
    error: Option<CheckError>,
    children: BTreeMap<TargetRef, Arc<ResultsNode>>,
}

impl ResultsNode {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record(&self, status: EvidenceStatus, message: String) {
        self.lock().evidence.push(EvidenceRecord { status, message });
    }

    /// Set the terminal error. Only the first one sticks.
    pub(crate) fn set_error(&self, err: CheckError) -> bool {
        let mut state = self.lock();
        if state.error.is_some() {
            return false;
        }
        state.error = Some(err);
        true
    }

    /// The child node for `target`, created on first visit.
    pub(crate) fn child(&self, target: TargetRef) -> Arc<ResultsNode> {
        self.lock()
            .children
            .entry(target)
            .or_insert_with(ResultsNode::new)
            .clone()
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only view of one node of a check's results tree.
///
/// Snapshots are taken under the node lock, so a view can be read while the
/// check is still running; it simply reflects what was recorded so far.
#[derive(Clone, Debug)]
pub struct Results {
    node: Arc<ResultsNode>,
}

impl Results {
    pub(crate) fn new(node: Arc<ResultsNode>) -> Self {
        Self { node }
    }

    /// Evidence recorded directly against this target, in program order.
    pub fn evidence(&self) -> Vec<EvidenceRecord> {
        self.node.lock().evidence.clone()
    }

    /// The terminal error of this target, if evaluation ended abnormally.
    pub fn error(&self) -> Option<CheckError> {
        self.node.lock().error.clone()
    }

    /// Results for a child target. `None` means the check never ran for it,
    /// which is different from running and recording a skip.
    pub fn for_child(&self, target: &Target) -> Option<Results> {
        self.for_ref(&target.to_ref())
    }

    pub fn for_ref(&self, target: &TargetRef) -> Option<Results> {
        self.node
            .lock()
            .children
            .get(target)
            .map(|node| Results::new(node.clone()))
    }

    /// Direct children, ordered by target kind then id.
    pub fn children(&self) -> Vec<(TargetRef, Results)> {
        self.node
            .lock()
            .children
            .iter()
            .map(|(target, node)| (target.clone(), Results::new(node.clone())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        let state = self.node.lock();
        state.evidence.is_empty() && state.error.is_none() && state.children.is_empty()
    }

    /// Status counts for this node and all of its descendants.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        let children: Vec<Arc<ResultsNode>> = {
            let state = self.node.lock();
            for record in &state.evidence {
                counts.record(record.status);
            }
            if state.error.is_some() {
                counts.errors += 1;
            }
            state.children.values().cloned().collect()
        };
        for child in children {
            counts.merge(&Results::new(child).counts());
        }
        counts
    }
}
