//! Grouping of fingerprinted images into clusters.
//!
//! [`StarGrouper`] compares every candidate against the cluster seed only,
//! so if A matches B and B matches C but A does not match C, then C is not
//! pulled into A's cluster. [`ConnectedGrouper`] is the transitive
//! alternative: it merges every chain of matches with union-find.

use super::{Cluster, ComparisonStrategy};
use crate::core::hasher::HashedImage;
use crate::events::{Event, EventSender, GroupEvent};

/// A clustering algorithm over fingerprinted images
pub trait Grouper: Send + Sync {
    /// Partition `hashed` into clusters of two or more members.
    ///
    /// Singletons are never returned.
    fn group(&self, hashed: &[HashedImage], strategy: &dyn ComparisonStrategy) -> Vec<Cluster> {
        self.group_with_events(hashed, strategy, &crate::events::null_sender())
    }

    /// Same as [`Grouper::group`], reporting each cluster as it forms
    fn group_with_events(
        &self,
        hashed: &[HashedImage],
        strategy: &dyn ComparisonStrategy,
        events: &EventSender,
    ) -> Vec<Cluster>;
}

/// Greedy single-pass seed clustering.
///
/// Walks the input in order. Each image not yet used seeds a cluster, and
/// every other unused image within the threshold of that seed joins it.
/// Which image becomes a seed depends on input order, so the input must
/// arrive in listing order and this pass stays sequential.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarGrouper;

impl StarGrouper {
    pub fn new() -> Self {
        Self
    }
}

impl Grouper for StarGrouper {
    fn group_with_events(
        &self,
        hashed: &[HashedImage],
        strategy: &dyn ComparisonStrategy,
        events: &EventSender,
    ) -> Vec<Cluster> {
        let mut used = vec![false; hashed.len()];
        let mut clusters = Vec::new();

        for (i, seed) in hashed.iter().enumerate() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let mut members = vec![seed.path.clone()];

            for (j, candidate) in hashed.iter().enumerate() {
                if used[j] {
                    continue;
                }
                if strategy.is_similar(seed.fingerprint.distance(&candidate.fingerprint)) {
                    members.push(candidate.path.clone());
                    used[j] = true;
                }
            }

            if members.len() > 1 {
                events.send(Event::Group(GroupEvent::ClusterFound {
                    seed: seed.path.clone(),
                    size: members.len(),
                }));
                clusters.push(Cluster::new(members));
            }
        }

        clusters
    }
}

/// Transitive clustering: connected components of the "within threshold"
/// graph.
///
/// Clusters come out ordered by their earliest member, and members keep
/// input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedGrouper;

impl ConnectedGrouper {
    pub fn new() -> Self {
        Self
    }
}

/// Find root with path halving
fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Union two sets, keeping the smaller index as root
fn union(parent: &mut [usize], a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        let (low, high) = if root_a < root_b { (root_a, root_b) } else { (root_b, root_a) };
        parent[high] = low;
    }
}

impl Grouper for ConnectedGrouper {
    fn group_with_events(
        &self,
        hashed: &[HashedImage],
        strategy: &dyn ComparisonStrategy,
        events: &EventSender,
    ) -> Vec<Cluster> {
        let n = hashed.len();
        let mut parent: Vec<usize> = (0..n).collect();

        for i in 0..n {
            for j in (i + 1)..n {
                if strategy.is_similar(hashed[i].fingerprint.distance(&hashed[j].fingerprint)) {
                    union(&mut parent, i, j);
                }
            }
        }

        // Roots are the smallest index of their component, so visiting
        // indices in order yields clusters ordered by earliest member
        let mut slots: Vec<Option<usize>> = vec![None; n];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            let slot = *slots[root].get_or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(i);
        }

        components
            .into_iter()
            .filter(|members| members.len() > 1)
            .map(|members| {
                events.send(Event::Group(GroupEvent::ClusterFound {
                    seed: hashed[members[0]].path.clone(),
                    size: members.len(),
                }));
                Cluster::new(members.into_iter().map(|i| hashed[i].path.clone()).collect())
            })
            .collect()
    }
}
