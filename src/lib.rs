//! ## M-tree
//!
//! An in-memory [M-tree](http://en.wikipedia.org/wiki/M-tree): a balanced,
//! height-uniform index over a set of objects drawn from an arbitrary metric
//! space. Given a distance function `d(x, y)` that satisfies the metric
//! axioms (non-negativity, identity, symmetry, triangle inequality), the
//! index answers range and k-nearest-neighbor queries by pruning whole
//! subtrees with the triangle inequality applied against per-subtree
//! covering radii, rather than scanning every indexed object.
//!
//! # Example
//!
//! ```
//! use mtree::MTree;
//!
//! let mut tree: MTree<Vec<i64>> = MTree::with_defaults();
//! tree.add(vec![13, 77, 34]);
//! tree.add(vec![47, 20, 27]);
//! tree.add(vec![88, 80, 82]);
//!
//! let nearest: Vec<_> = tree.knn(vec![0, 0, 0], 2).collect();
//! assert_eq!(nearest.len(), 2);
//! ```

mod distance;
mod error;
mod fixture;
mod heap;
mod logging;
mod mtree;
mod node;
mod search;
mod split;

pub use distance::{DistanceCache, EuclideanMetric, Metric};
pub use error::MTreeError;
pub use fixture::{run_fixture, Action, Fixture, Query};
pub use mtree::MTree;
pub use search::{NearestNeighbor, NearestNeighbors};
pub use split::{
    BalancedPartition, DefaultSplitPolicy, Partition, Promotion, RandomPromotion, SortedPromotion,
    SplitPolicy,
};
