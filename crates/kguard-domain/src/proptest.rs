//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Target identity (`to_ref` round-trips through `Domain::target`)
//! - Pod grouping by deployment
//! - Snapshot conversion preserving order

use crate::domain::{Domain, DomainSnapshot};
use crate::model::{Cluster, Deployment, Node, Pod};
use crate::target::Target;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Strategy for object ids: short, lowercase, unique within a kind after dedup.
fn arb_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9-]{0,11}", 0..max)
        .prop_map(|set| set.into_iter().collect())
}

fn arb_domain() -> impl Strategy<Value = Domain> {
    (arb_ids(8), arb_ids(8), prop::collection::vec(0usize..8, 0..16)).prop_map(
        |(node_ids, deployment_ids, pod_owners)| {
            let nodes = node_ids
                .iter()
                .map(|id| Node {
                    id: id.clone(),
                    name: format!("node-{id}"),
                    ..Node::default()
                })
                .collect();
            let pods = pod_owners
                .iter()
                .enumerate()
                .filter_map(|(i, owner)| {
                    deployment_ids.get(*owner).map(|d| Pod {
                        id: format!("pod-{i}"),
                        name: format!("pod-{i}"),
                        deployment_id: d.clone(),
                        ..Pod::default()
                    })
                })
                .collect();
            let deployments = deployment_ids
                .into_iter()
                .map(|id| Deployment {
                    name: format!("deploy-{id}"),
                    id,
                    ..Deployment::default()
                })
                .collect();
            Domain::new(
                Cluster {
                    id: "cluster".to_string(),
                    name: "cluster".to_string(),
                    ..Cluster::default()
                },
                nodes,
                deployments,
                pods,
            )
        },
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn every_target_is_found_by_its_ref(domain in arb_domain()) {
        let all = std::iter::once(domain.cluster())
            .chain(domain.nodes())
            .chain(domain.deployments());
        for target in all {
            let found = domain.target(&target.to_ref());
            prop_assert_eq!(found, Some(target));
        }
    }

    #[test]
    fn refs_are_unique_within_a_domain(domain in arb_domain()) {
        let refs: Vec<_> = domain
            .nodes()
            .iter()
            .chain(domain.deployments())
            .map(Target::to_ref)
            .collect();
        let unique: BTreeSet<_> = refs.iter().cloned().collect();
        prop_assert_eq!(unique.len(), refs.len());
    }

    #[test]
    fn pods_for_partitions_owned_pods(domain in arb_domain()) {
        let grouped: usize = domain
            .deployments()
            .iter()
            .map(|d| domain.pods_for(d.id()).count())
            .sum();
        prop_assert_eq!(grouped, domain.pods().len());
    }

    #[test]
    fn snapshot_conversion_preserves_order(ids in arb_ids(8)) {
        let snapshot = DomainSnapshot {
            nodes: ids
                .iter()
                .map(|id| Node { id: id.clone(), name: id.clone(), ..Node::default() })
                .collect(),
            ..DomainSnapshot::default()
        };
        let domain = Domain::from(snapshot);
        let got: Vec<&str> = domain.nodes().iter().map(Target::id).collect();
        let want: Vec<&str> = ids.iter().map(String::as_str).collect();
        prop_assert_eq!(got, want);
    }
}
