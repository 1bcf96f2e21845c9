//! Round-trip serialization of an `MTree` through `bincode`, gated on the
//! `serde` feature (see `Cargo.toml`'s dev-dependency on `mtree` with that
//! feature enabled).

#![cfg(feature = "serde")]

#[path = "shared.rs"]
mod shared;
use shared::*;

use mtree::{BalancedPartition, DefaultSplitPolicy, EuclideanMetric, MTree, RandomPromotion};

type Tree = MTree<Vec<i64>, EuclideanMetric, DefaultSplitPolicy<RandomPromotion, BalancedPartition>>;

fn build_tree() -> Tree {
    let mut tree = MTree::new(
        EuclideanMetric,
        DefaultSplitPolicy::new(RandomPromotion, BalancedPartition),
        MAX_CAPACITY,
        MIN_CAPACITY,
    )
    .unwrap();
    for p in common_points_3d() {
        tree.add(p);
    }
    tree
}

#[test]
fn test_serialize_deserialize_roundtrip_preserves_query_results() {
    let tree = build_tree();
    let encoded = bincode::serialize(&tree).unwrap();
    let decoded: Tree = bincode::deserialize(&encoded[..]).unwrap();

    assert_eq!(decoded.len(), tree.len());

    let before: Vec<_> = tree
        .get_nearest(query_point_3d(), RADIUS, None)
        .map(|n| (n.data, n.distance))
        .collect();
    let after: Vec<_> = decoded
        .get_nearest(query_point_3d(), RADIUS, None)
        .map(|n| (n.data, n.distance))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_serialize_deserialize_empty_tree() {
    let tree = MTree::<Vec<i64>>::with_defaults();
    let encoded = bincode::serialize(&tree).unwrap();
    let decoded: MTree<Vec<i64>> = bincode::deserialize(&encoded[..]).unwrap();
    assert_eq!(decoded.len(), 0);
    assert!(decoded.get_nearest(vec![0], f64::INFINITY, None).next().is_none());
}
