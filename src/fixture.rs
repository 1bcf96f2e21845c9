//! ## Scenario fixtures
//!
//! A small data-driven format for the ADD/REMOVE/QUERY scenarios in
//! `examples/original_source/py/mtree/tests/fixtures/`: a sequence of
//! mutations against a tree, interleaved with point-in-time nearest/range
//! queries whose expected result sets are checked against what the tree
//! actually returns. `tests/scenarios.rs` replays several of these.

use crate::distance::Metric;
use crate::mtree::MTree;
use crate::split::SplitPolicy;
use std::collections::HashSet;
use std::hash::Hash;

/// A single mutation in a [`Fixture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<T> {
    Add(T),
    Remove(T),
}

/// A query to run after some prefix of a [`Fixture`]'s actions, and the
/// result set it is expected to produce (order-independent: correctness is
/// about the *set* of objects within range, not the order a particular
/// traversal happens to enumerate them in).
#[derive(Debug, Clone)]
pub struct Query<T> {
    pub query: T,
    pub range: f64,
    pub limit: Option<usize>,
    pub expected: Vec<T>,
}

/// An ADD/REMOVE scenario plus the queries to check after it runs.
#[derive(Debug, Clone, Default)]
pub struct Fixture<T> {
    pub actions: Vec<Action<T>>,
    pub queries: Vec<Query<T>>,
}

impl<T> Fixture<T> {
    pub fn new() -> Self {
        Fixture {
            actions: Vec::new(),
            queries: Vec::new(),
        }
    }

    pub fn add(mut self, data: T) -> Self {
        self.actions.push(Action::Add(data));
        self
    }

    pub fn remove(mut self, data: T) -> Self {
        self.actions.push(Action::Remove(data));
        self
    }

    pub fn query(mut self, query: Query<T>) -> Self {
        self.queries.push(query);
        self
    }
}

/// Replays `fixture`'s actions against `tree`, then checks every query's
/// expected result set (order-independent, but reporting any distance
/// ordering violation actually returned by the tree).
///
/// # Panics
///
/// Panics with a descriptive message if a `Remove` targets data not
/// currently indexed, or if any query's result set doesn't match its
/// expected set.
pub fn run_fixture<T, M, S>(tree: &mut MTree<T, M, S>, fixture: &Fixture<T>)
where
    T: Clone + Eq + Hash + std::fmt::Debug,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    for action in &fixture.actions {
        match action {
            Action::Add(data) => tree.add(data.clone()),
            Action::Remove(data) => tree
                .remove(data)
                .unwrap_or_else(|e| panic!("fixture removed {data:?} that wasn't indexed: {e}")),
        }
    }

    for q in &fixture.queries {
        let mut previous_distance = f64::NEG_INFINITY;
        let mut actual = Vec::new();
        for n in tree.get_nearest(q.query.clone(), q.range, q.limit) {
            assert!(
                n.distance >= previous_distance,
                "results were not returned in non-decreasing distance order: {} came after {}",
                n.distance,
                previous_distance
            );
            previous_distance = n.distance;
            actual.push(n.data);
        }

        let expected: HashSet<&T> = q.expected.iter().collect();
        let actual_set: HashSet<&T> = actual.iter().collect();
        assert_eq!(
            expected, actual_set,
            "query around {:?} (range {}, limit {:?}) returned {:?}, expected {:?}",
            q.query, q.range, q.limit, actual, q.expected
        );
    }
}
