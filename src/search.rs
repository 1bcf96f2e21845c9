//! ## Nearest-neighbor and range search
//!
//! Best-first traversal over a single min-heap of candidates, exactly the
//! pattern `r_tree.rs`'s `KnnCandidate` uses for its own kNN search: every
//! candidate (a still-unopened subtree, or a concrete data item) carries a
//! lower bound on how close it — or anything inside it — can possibly be to
//! the query, and the heap always expands the most promising one next.
//!
//! For a subtree behind a routing entry at distance `d` from the query with
//! covering radius `r`, the triangle inequality gives a lower bound of
//! `max(d - r, 0)` on the distance from the query to anything inside it.
//! For a leaf entry, the distance is already exact. Because the heap pops
//! in ascending key order and a subtree's bound can only be loosened (never
//! tightened) by opening it, the first `limit` items popped as exact
//! distances are provably the `limit` nearest neighbors.

use crate::distance::Metric;
use crate::heap::{FloatKey, KeyedHeap};
use crate::node::Node;

/// One result of a nearest-neighbor or range query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestNeighbor<T> {
    pub data: T,
    pub distance: f64,
}

enum Candidate<'t, T> {
    Subtree { node: &'t Node<T>, key: FloatKey },
    Item { data: T, key: FloatKey },
}

impl<'t, T> Candidate<'t, T> {
    fn key(&self) -> FloatKey {
        match self {
            Candidate::Subtree { key, .. } | Candidate::Item { key, .. } => *key,
        }
    }
}

/// A lazy, best-first iterator over the data indexed by an [`crate::MTree`],
/// nearest to a query object first.
///
/// Produced by [`crate::MTree::get_nearest`]; stops after `limit` results
/// (if one was given) or once every candidate within `range` has been
/// exhausted.
pub struct NearestNeighbors<'t, T, M> {
    query: T,
    metric: &'t M,
    range: f64,
    limit: Option<usize>,
    returned: usize,
    pending: KeyedHeap<Candidate<'t, T>, FloatKey, fn(&Candidate<'t, T>) -> FloatKey>,
}

fn candidate_key<T>(c: &Candidate<'_, T>) -> FloatKey {
    c.key()
}

impl<'t, T, M> NearestNeighbors<'t, T, M>
where
    T: Clone,
    M: Metric<T>,
{
    pub(crate) fn new(root: &'t Node<T>, query: T, metric: &'t M, range: f64, limit: Option<usize>) -> Self {
        let mut pending = KeyedHeap::new(candidate_key as fn(&Candidate<'t, T>) -> FloatKey);
        pending.push(Candidate::Subtree {
            node: root,
            key: FloatKey::from(0.0),
        });
        NearestNeighbors {
            query,
            metric,
            range,
            limit,
            returned: 0,
            pending,
        }
    }

    fn expand(&mut self, node: &'t Node<T>) {
        match node {
            Node::RootLeaf { entries } | Node::Leaf { entries } => {
                for entry in entries {
                    let d = self.metric.distance(&self.query, &entry.data);
                    if d <= self.range {
                        self.pending.push(Candidate::Item {
                            data: entry.data.clone(),
                            key: FloatKey::from(d),
                        });
                    }
                }
            }
            Node::RootInternal { entries } | Node::Internal { entries } => {
                for entry in entries {
                    let d = self.metric.distance(&self.query, &entry.data);
                    let lower_bound = (d - entry.radius).max(0.0);
                    if lower_bound <= self.range {
                        self.pending.push(Candidate::Subtree {
                            node: entry.subtree.as_ref(),
                            key: FloatKey::from(lower_bound),
                        });
                    }
                }
            }
        }
    }
}

impl<'t, T, M> Iterator for NearestNeighbors<'t, T, M>
where
    T: Clone,
    M: Metric<T>,
{
    type Item = NearestNeighbor<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(limit) = self.limit {
            if self.returned >= limit {
                return None;
            }
        }

        loop {
            match self.pending.pop()? {
                Candidate::Subtree { node, .. } => self.expand(node),
                Candidate::Item { data, key } => {
                    self.returned += 1;
                    return Some(NearestNeighbor {
                        data,
                        distance: key.into_inner(),
                    });
                }
            }
        }
    }
}
