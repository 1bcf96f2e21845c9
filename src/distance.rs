//! ## Distance metric and per-split cache
//!
//! [`Metric<T>`] is the pluggable distance function the tree is built
//! against — it only needs *a* metric, not a catalog of them.
//! [`EuclideanMetric`] is provided as the default, matching
//! `euclidean_distance` in `examples/original_source/mtree/functions.py`.
//!
//! [`DistanceCache`] is a symmetric memoizer scoped to a single
//! overflow-handling pass, bounding the number of distance computations
//! during a split to O(|S|²) worst case.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// A distance function over `T`. Must satisfy the metric axioms
/// (non-negativity, identity, symmetry, triangle inequality); violating
/// this is undefined behavior for the tree built on top of it.
pub trait Metric<T> {
    /// Returns the distance between `a` and `b`.
    fn distance(&self, a: &T, b: &T) -> f64;
}

/// Euclidean distance over fixed-arity sequences of integers.
///
/// The original implementation's data objects are same-sized tuples of
/// numbers; Rust has no variadic-arity tuple generic, so a growable integer
/// vector stands in uniformly across dimensions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMetric;

impl<T> Metric<T> for EuclideanMetric
where
    T: AsRef<[i64]>,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        a.as_ref()
            .iter()
            .zip(b.as_ref().iter())
            .map(|(x, y)| {
                let diff = (*x - *y) as f64;
                diff * diff
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// A symmetric memoizer around a [`Metric`], scoped to a single split.
///
/// The first time a pair `(a, b)` is requested, the distance is computed and
/// stored under both `(a, b)` and `(b, a)`; subsequent lookups (in either
/// order) are a hash-map hit.
pub struct DistanceCache<'m, T, M> {
    metric: &'m M,
    cache: RefCell<HashMap<(T, T), f64>>,
}

impl<'m, T, M> DistanceCache<'m, T, M>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
{
    pub fn new(metric: &'m M) -> Self {
        DistanceCache {
            metric,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<'m, T, M> Metric<T> for DistanceCache<'m, T, M>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        let key = (a.clone(), b.clone());
        if let Some(d) = self.cache.borrow().get(&key) {
            return *d;
        }
        let d = self.metric.distance(a, b);
        self.cache
            .borrow_mut()
            .insert((a.clone(), b.clone()), d);
        self.cache
            .borrow_mut()
            .insert((b.clone(), a.clone()), d);
        d
    }
}
