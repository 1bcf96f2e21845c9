//! ## Split policy
//!
//! A split policy is a pair `(promote, partition)`, configured once at
//! `MTree` construction and reused for every overflowing node:
//!
//! - [`Promotion::promote`] picks two pivots `(p1, p2)` from an overflowing
//!   node's child-data set `S`.
//! - [`Partition::partition`] assigns every element of `S` to exactly one of
//!   two subsets, `p1` always landing in the first and `p2` in the second.
//!
//! [`DefaultSplitPolicy`] composes the two into a `split(S, d) -> (p1, S1,
//! p2, S2)` operation. The default pairing is [`RandomPromotion`] +
//! [`BalancedPartition`]; the test suite substitutes [`SortedPromotion`]
//! for determinism, mirroring
//! `examples/original_source/mtree/tests/test_mtreebase.py`'s
//! `not_random_promotion`.

use std::collections::HashSet;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::distance::Metric;
use crate::heap::{FloatKey, KeyedHeap};

/// Picks two pivots from an overflowing node's data set.
pub trait Promotion<T> {
    /// Returns two distinct elements of `items` to serve as the
    /// representatives of the two successor nodes.
    fn promote<M: Metric<T>>(&mut self, items: &[T], distance: &M) -> (T, T);
}

/// Assigns every element of an overflowing node's data set to one of two
/// partitions, given the two pivots chosen by a [`Promotion`].
pub trait Partition<T: Clone + Eq + Hash> {
    /// Partitions `items` into `(S1, S2)` such that `S1 ∪ S2 = items`,
    /// `S1 ∩ S2 = ∅`, `p1 ∈ S1`, `p2 ∈ S2`.
    fn partition<M: Metric<T>>(
        &self,
        p1: &T,
        p2: &T,
        items: &[T],
        distance: &M,
    ) -> (HashSet<T>, HashSet<T>);
}

/// Default promotion: picks two elements of `S` uniformly at random.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPromotion;

impl<T: Clone> Promotion<T> for RandomPromotion {
    fn promote<M: Metric<T>>(&mut self, items: &[T], _distance: &M) -> (T, T) {
        assert!(
            items.len() >= 2,
            "promote requires at least two candidates, got {}",
            items.len()
        );
        let mut rng = thread_rng();
        let chosen: Vec<&T> = items.choose_multiple(&mut rng, 2).collect();
        (chosen[0].clone(), chosen[1].clone())
    }
}

/// Deterministic promotion used by the test suite: sorts `S` by its natural
/// order and returns `(min, max)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedPromotion;

impl<T: Clone + Ord> Promotion<T> for SortedPromotion {
    fn promote<M: Metric<T>>(&mut self, items: &[T], _distance: &M) -> (T, T) {
        assert!(
            items.len() >= 2,
            "promote requires at least two candidates, got {}",
            items.len()
        );
        let mut sorted: Vec<T> = items.to_vec();
        sorted.sort();
        let min = sorted.first().unwrap().clone();
        let max = sorted.last().unwrap().clone();
        (min, max)
    }
}

/// Default partition: two priority queues keyed by distance to each pivot,
/// alternately popping the nearest-so-far element for each side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedPartition;

impl<T: Clone + Eq + Hash> Partition<T> for BalancedPartition {
    fn partition<M: Metric<T>>(
        &self,
        p1: &T,
        p2: &T,
        items: &[T],
        distance: &M,
    ) -> (HashSet<T>, HashSet<T>) {
        let mut side1: HashSet<T> = HashSet::new();
        let mut side2: HashSet<T> = HashSet::new();

        let mut queue1 = KeyedHeap::from_iter(items.iter().cloned(), |data: &T| {
            FloatKey::from(distance.distance(data, p1))
        });
        let mut queue2 = KeyedHeap::from_iter(items.iter().cloned(), |data: &T| {
            FloatKey::from(distance.distance(data, p2))
        });

        while !queue1.is_empty() || !queue2.is_empty() {
            while let Some(data) = queue1.pop() {
                if !side2.contains(&data) {
                    side1.insert(data);
                    break;
                }
            }
            while let Some(data) = queue2.pop() {
                if !side1.contains(&data) {
                    side2.insert(data);
                    break;
                }
            }
        }

        (side1, side2)
    }
}

/// Composes a [`Promotion`] and a [`Partition`] into a `split(S, d) ->
/// (p1, S1, p2, S2)` operation.
pub trait SplitPolicy<T: Clone + Eq + Hash> {
    /// Splits `items` (the overflowing node's child-data set) into two
    /// pivot/partition pairs, each containing at least `min_capacity`
    /// elements.
    ///
    /// # Panics
    ///
    /// Panics if the configured partition violates the `min_capacity`
    /// contract on either side — this indicates a broken `Partition`
    /// implementation, not a recoverable runtime condition.
    fn split<M: Metric<T>>(
        &mut self,
        items: &[T],
        distance: &M,
        min_capacity: usize,
    ) -> (T, HashSet<T>, T, HashSet<T>);
}

/// The standard `(promote, partition)` split policy.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSplitPolicy<P, Q> {
    promotion: P,
    partition: Q,
}

impl<P, Q> DefaultSplitPolicy<P, Q> {
    pub fn new(promotion: P, partition: Q) -> Self {
        DefaultSplitPolicy {
            promotion,
            partition,
        }
    }
}

impl<T, P, Q> SplitPolicy<T> for DefaultSplitPolicy<P, Q>
where
    T: Clone + Eq + Hash,
    P: Promotion<T>,
    Q: Partition<T>,
{
    fn split<M: Metric<T>>(
        &mut self,
        items: &[T],
        distance: &M,
        min_capacity: usize,
    ) -> (T, HashSet<T>, T, HashSet<T>) {
        let (p1, p2) = self.promotion.promote(items, distance);
        let (s1, s2) = self.partition.partition(&p1, &p2, items, distance);
        assert!(
            s1.len() >= min_capacity && s2.len() >= min_capacity,
            "split policy produced an undersized partition: {} and {} elements, minimum is {}",
            s1.len(),
            s2.len(),
            min_capacity
        );
        (p1, s1, p2, s2)
    }
}
