//! ## The M-tree itself
//!
//! Wires the node model, the distance metric, and the split policy
//! together behind the small public surface the rest of the crate builds
//! toward: [`MTree::add`], [`MTree::remove`], [`MTree::get_nearest`].

use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::distance::{EuclideanMetric, Metric};
use crate::error::MTreeError;
use crate::node::{self, Ctx, InsertOutcome, Node, RemoveOutcome, RoutingEntry};
use crate::search::NearestNeighbors;
use crate::split::{BalancedPartition, DefaultSplitPolicy, RandomPromotion, SplitPolicy};

/// A balanced, height-uniform metric-space index.
///
/// `T` is the indexed data type, `M` the distance metric over it, and `S`
/// the split policy used when a node overflows. Both `M` and `S` default to
/// the same pairing [`MTree::with_defaults`] uses: [`EuclideanMetric`] and
/// [`RandomPromotion`] + [`BalancedPartition`].
///
/// ```
/// use mtree::MTree;
///
/// let mut tree: MTree<Vec<i64>> = MTree::with_defaults();
/// tree.add(vec![34]);
/// tree.add(vec![44]);
/// tree.add(vec![0]);
///
/// let nearest = tree.get_nearest(vec![34], f64::INFINITY, Some(1)).next().unwrap();
/// assert_eq!(nearest.data, vec![34]);
/// assert_eq!(nearest.distance, 0.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MTree<T, M = EuclideanMetric, S = DefaultSplitPolicy<RandomPromotion, BalancedPartition>> {
    root: Node<T>,
    metric: M,
    split: S,
    max_capacity: usize,
    min_capacity: usize,
    size: usize,
}

impl<T> MTree<T, EuclideanMetric, DefaultSplitPolicy<RandomPromotion, BalancedPartition>>
where
    T: Clone + Eq + Hash + AsRef<[i64]>,
{
    /// Builds a tree with [`EuclideanMetric`] and a `RandomPromotion` +
    /// `BalancedPartition` split policy, at a node capacity of 50 (the
    /// default used throughout the fixture-driven test suite).
    pub fn with_defaults() -> Self {
        Self::new(
            EuclideanMetric,
            DefaultSplitPolicy::new(RandomPromotion, BalancedPartition),
            50,
            2,
        )
        .expect("the built-in defaults always satisfy the capacity constraints")
    }
}

impl<T, M, S> MTree<T, M, S>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    /// Builds a tree with an explicit metric, split policy, and capacity
    /// bounds.
    ///
    /// # Errors
    ///
    /// Returns [`MTreeError::InvalidArgument`] if `max_capacity < 2` or if
    /// `min_capacity` is too large for two sides of an overflowing node
    /// (`max_capacity + 1` entries) to each meet it.
    pub fn new(metric: M, split: S, max_capacity: usize, min_capacity: usize) -> Result<Self, MTreeError> {
        info!("creating new MTree with max_capacity={max_capacity}, min_capacity={min_capacity}");
        if max_capacity < 2 {
            return Err(MTreeError::InvalidArgument {
                reason: format!("max_capacity must be at least 2, got {max_capacity}"),
            });
        }
        if min_capacity < 1 || min_capacity * 2 > max_capacity + 1 {
            return Err(MTreeError::InvalidArgument {
                reason: format!(
                    "min_capacity ({min_capacity}) must be at least 1 and allow two sides of a {}-entry overflow to each reach it",
                    max_capacity + 1
                ),
            });
        }
        Ok(MTree {
            root: Node::empty_root_leaf(),
            metric,
            split,
            max_capacity,
            min_capacity,
            size: 0,
        })
    }

    /// Number of data objects currently indexed.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Inserts `data`. `data` must not already be indexed (invariant 7: the
    /// tree holds a set, not a multiset, of values) — the tree has no
    /// notion of a primary key to distinguish a reinsert from a duplicate,
    /// so the caller is responsible for not calling `add` twice with an
    /// equal value.
    pub fn add(&mut self, data: T) {
        info!("inserting into MTree (currently {} entries)", self.size);
        let mut ctx = Ctx::new(&self.metric, &mut self.split, self.max_capacity, self.min_capacity);
        let outcome = node::insert(&mut self.root, data, None, &mut ctx);
        if let InsertOutcome::Split(c1, c2) = outcome {
            let entries = vec![
                RoutingEntry {
                    data: c1.data,
                    radius: c1.radius,
                    distance_to_parent: 0.0,
                    subtree: c1.subtree,
                },
                RoutingEntry {
                    data: c2.data,
                    radius: c2.radius,
                    distance_to_parent: 0.0,
                    subtree: c2.subtree,
                },
            ];
            self.root = Node::RootInternal { entries };
        }
        self.size += 1;
    }

    /// Removes one occurrence of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`MTreeError::NotFound`] if `data` isn't currently indexed.
    pub fn remove(&mut self, data: &T) -> Result<(), MTreeError> {
        info!("removing from MTree (currently {} entries)", self.size);
        let mut ctx = Ctx::new(&self.metric, &mut self.split, self.max_capacity, self.min_capacity);
        match node::remove(&mut self.root, data, None, &mut ctx) {
            RemoveOutcome::NotFound => Err(MTreeError::NotFound),
            RemoveOutcome::Removed { .. } => {
                self.size -= 1;
                let old_root = std::mem::replace(&mut self.root, Node::empty_root_leaf());
                self.root = node::try_shrink_root(old_root);
                Ok(())
            }
        }
    }

    /// Best-first search for objects near `query`: at most `limit` results
    /// (unbounded if `None`), each within `range` of `query`, nearest
    /// first. The returned iterator is lazy — it only does as much tree
    /// traversal as the caller actually consumes.
    pub fn get_nearest(&self, query: T, range: f64, limit: Option<usize>) -> NearestNeighbors<'_, T, M> {
        info!("starting nearest-neighbor search: range={range}, limit={limit:?}");
        NearestNeighbors::new(&self.root, query, &self.metric, range, limit)
    }

    /// The `k` objects nearest to `query`, nearest first.
    pub fn knn(&self, query: T, k: usize) -> NearestNeighbors<'_, T, M> {
        self.get_nearest(query, f64::INFINITY, Some(k))
    }

    /// Every indexed object within `radius` of `query`, nearest first.
    pub fn range(&self, query: T, radius: f64) -> NearestNeighbors<'_, T, M> {
        self.get_nearest(query, radius, None)
    }
}
