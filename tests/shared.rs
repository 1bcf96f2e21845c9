#![allow(dead_code)]

//! Shared test utilities.
//!
//! Common constants, sample data, and helper functions used across multiple
//! integration tests: capacity/range parameters, a brute-force nearest
//! neighbor reference implementation, and a handful of fixed point sets in
//! varying dimensionality.

use mtree::{BalancedPartition, DefaultSplitPolicy, EuclideanMetric, MTree, Metric, SortedPromotion};

//
// Constants
//
pub const MAX_CAPACITY: usize = 4;
pub const MIN_CAPACITY: usize = 2;

pub const RADIUS: f64 = 30.0;
pub const KNN_COUNT: usize = 3;

//
// Query points
//
pub fn query_point_1d() -> Vec<i64> {
    vec![35]
}

pub fn query_point_3d() -> Vec<i64> {
    vec![35, 45, 35]
}

pub fn range_query_point_3d() -> Vec<i64> {
    vec![20, 20, 20]
}

//
// Common point sets
//
pub fn common_points_1d() -> Vec<Vec<i64>> {
    vec![
        vec![11],
        vec![51],
        vec![31],
        vec![71],
        vec![81],
        vec![21],
        vec![22],
        vec![23],
        vec![24],
        vec![25],
        vec![26],
    ]
}

pub fn common_points_3d() -> Vec<Vec<i64>> {
    vec![
        vec![11, 11, 11],
        vec![51, 51, 51],
        vec![31, 41, 21],
        vec![71, 81, 91],
        vec![81, 91, 71],
        vec![21, 21, 21],
        vec![22, 22, 22],
        vec![23, 23, 23],
        vec![24, 24, 24],
        vec![25, 25, 25],
        vec![26, 26, 26],
    ]
}

/// A tree with deterministic splitting, suitable for tests that assert on
/// exact result sets rather than just structural properties.
pub fn deterministic_tree() -> MTree<Vec<i64>, EuclideanMetric, DefaultSplitPolicy<SortedPromotion, BalancedPartition>> {
    MTree::new(
        EuclideanMetric,
        DefaultSplitPolicy::new(SortedPromotion, BalancedPartition),
        MAX_CAPACITY,
        MIN_CAPACITY,
    )
    .expect("test capacity parameters are valid")
}

/// Every point in `points` within `radius` of `query`, nearest first —
/// computed by brute force, for checking the tree's pruning against a
/// reference that can't get the pruning wrong.
pub fn brute_force_range(points: &[Vec<i64>], query: &[i64], radius: f64) -> Vec<(Vec<i64>, f64)> {
    let metric = EuclideanMetric;
    let query = query.to_vec();
    let mut result: Vec<(Vec<i64>, f64)> = points
        .iter()
        .map(|p| (p.clone(), metric.distance(p, &query)))
        .filter(|(_, d)| *d <= radius)
        .collect();
    result.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    result
}

/// The `k` nearest of `points` to `query`, nearest first — by brute force.
pub fn brute_force_knn(points: &[Vec<i64>], query: &[i64], k: usize) -> Vec<(Vec<i64>, f64)> {
    let mut result = brute_force_range(points, query, f64::INFINITY);
    result.truncate(k);
    result
}
