//! ## Node model and insert/delete engines
//!
//! A tagged four-variant [`Node`]: the leaf/internal distinction and the
//! root/non-root distinction are orthogonal, so a node is one of
//! `RootLeaf`, `RootInternal`, `Internal`, `Leaf`. `RootLeaf`/`Leaf` share
//! [`LeafEntry`] and leaf behavior; `RootInternal`/`Internal` share
//! [`RoutingEntry`] and routing behavior. The duplication this creates
//! between the two root variants and their non-root counterparts is
//! intentional, and kept in check by routing both members of each pair
//! through the same free function (`leaf_insert`/`internal_insert`,
//! `leaf_remove`/`internal_remove`).
//!
//! This module owns no parent back-pointers (ownership-strict child
//! boxing): a node's "distance to its own parent entry" is threaded down as
//! a `parent_pivot: Option<&T>` argument during recursion and cached in the
//! entry once known, rather than recovered via a stored link.

use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::distance::{DistanceCache, Metric};
use crate::split::SplitPolicy;

/// A data object stored directly in a leaf node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct LeafEntry<T> {
    pub data: T,
    /// Distance from `data` to the pivot of the entry that routes to this
    /// leaf from one level up. Meaningless (and left at `0.0`) for entries
    /// of a `RootLeaf`, which has no parent entry.
    pub distance_to_parent: f64,
}

/// A routing object: a pivot plus the subtree of everything within
/// `radius` of it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct RoutingEntry<T> {
    pub data: T,
    /// Covering radius: no object in `subtree` is farther than this from
    /// `data`.
    pub radius: f64,
    pub distance_to_parent: f64,
    pub subtree: Box<Node<T>>,
}

/// A node of the tree. See the module docs for why there are four variants
/// instead of two.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) enum Node<T> {
    RootLeaf { entries: Vec<LeafEntry<T>> },
    RootInternal { entries: Vec<RoutingEntry<T>> },
    Internal { entries: Vec<RoutingEntry<T>> },
    Leaf { entries: Vec<LeafEntry<T>> },
}

impl<T> Node<T> {
    pub(crate) fn empty_root_leaf() -> Self {
        Node::RootLeaf { entries: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Node::RootLeaf { entries } | Node::Leaf { entries } => entries.len(),
            Node::RootInternal { entries } | Node::Internal { entries } => entries.len(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::RootLeaf { .. } | Node::Leaf { .. })
    }
}

/// The shared collaborators every insert/remove call needs: the distance
/// metric, the split policy, and the tree's capacity bounds.
pub(crate) struct Ctx<'a, T, M, S> {
    pub metric: &'a M,
    pub split: &'a mut S,
    pub max_capacity: usize,
    pub min_capacity: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T, M, S> Ctx<'a, T, M, S> {
    pub(crate) fn new(metric: &'a M, split: &'a mut S, max_capacity: usize, min_capacity: usize) -> Self {
        Ctx {
            metric,
            split,
            max_capacity,
            min_capacity,
            _marker: std::marker::PhantomData,
        }
    }
}

/// A freshly split-off successor node, on its way to becoming a
/// [`RoutingEntry`] in whatever absorbs it.
pub(crate) struct NewChild<T> {
    pub data: T,
    pub radius: f64,
    pub subtree: Box<Node<T>>,
}

pub(crate) enum InsertOutcome<T> {
    Absorbed,
    Split(NewChild<T>, NewChild<T>),
}

pub(crate) enum RemoveOutcome {
    NotFound,
    /// The entry was removed; `underflow` reports whether the node that
    /// held it now has fewer than `min_capacity` entries (always `false`
    /// for a root node, which has no lower bound).
    Removed { underflow: bool },
}

/// Inserts `data` into `node`, splitting it (and reporting the split up)
/// if it overflows `max_capacity`.
pub(crate) fn insert<T, M, S>(
    node: &mut Node<T>,
    data: T,
    parent_pivot: Option<&T>,
    ctx: &mut Ctx<T, M, S>,
) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    match node {
        Node::RootLeaf { entries } | Node::Leaf { entries } => leaf_insert(entries, data, parent_pivot, ctx),
        Node::RootInternal { entries } | Node::Internal { entries } => {
            internal_insert(entries, data, parent_pivot, ctx)
        }
    }
}

fn leaf_insert<T, M, S>(
    entries: &mut Vec<LeafEntry<T>>,
    data: T,
    parent_pivot: Option<&T>,
    ctx: &mut Ctx<T, M, S>,
) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    let distance_to_parent = parent_pivot.map(|p| ctx.metric.distance(&data, p)).unwrap_or(0.0);
    entries.push(LeafEntry {
        data,
        distance_to_parent,
    });
    if entries.len() > ctx.max_capacity {
        split_leaf(entries, ctx)
    } else {
        InsertOutcome::Absorbed
    }
}

fn internal_insert<T, M, S>(
    entries: &mut Vec<RoutingEntry<T>>,
    data: T,
    parent_pivot: Option<&T>,
    ctx: &mut Ctx<T, M, S>,
) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    let chosen_idx = choose_subtree(entries, &data, ctx.metric);
    let pivot = entries[chosen_idx].data.clone();
    let outcome = insert(&mut entries[chosen_idx].subtree, data, Some(&pivot), ctx);

    match outcome {
        InsertOutcome::Absorbed => InsertOutcome::Absorbed,
        InsertOutcome::Split(c1, c2) => {
            entries.remove(chosen_idx);
            add_child(entries, c1, parent_pivot, ctx);
            add_child(entries, c2, parent_pivot, ctx);
            if entries.len() > ctx.max_capacity {
                split_internal(entries, ctx)
            } else {
                InsertOutcome::Absorbed
            }
        }
    }
}

/// Adds `new_child` to `entries` as a new routing entry, implementing spec
/// §4.5.3's representative-collision contract: a split can promote a pivot
/// that already equals an existing sibling's representative (the same raw
/// data value surfacing as the pivot of two subtrees under the same
/// parent). When that happens, `new_child`'s own children are folded into
/// the colliding entry instead of pushing a second entry with the same
/// `data` (which would violate invariant 7's uniqueness), and the fattened
/// entry is re-split if absorbing them pushed it over `max_capacity`, with
/// the resulting halves replayed through this same function. Bounded
/// because each replay strictly shrinks the set of nodes still pending
/// placement (a split's two halves are always smaller than what was split).
fn add_child<T, M, S>(entries: &mut Vec<RoutingEntry<T>>, new_child: NewChild<T>, parent_pivot: Option<&T>, ctx: &mut Ctx<T, M, S>)
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    let mut pending = vec![new_child];
    while let Some(child) = pending.pop() {
        match entries.iter().position(|e| e.data == child.data) {
            None => {
                let distance_to_parent = parent_pivot.map(|p| ctx.metric.distance(&child.data, p)).unwrap_or(0.0);
                entries.push(RoutingEntry {
                    data: child.data,
                    radius: child.radius,
                    distance_to_parent,
                    subtree: child.subtree,
                });
            }
            Some(existing_idx) => {
                debug!("add_child: representative collision on existing entry {existing_idx}, merging children");
                let mut existing = entries.remove(existing_idx);
                absorb_children(existing.subtree.as_mut(), &existing.data, *child.subtree, ctx);
                if node_len(&existing.subtree) > ctx.max_capacity {
                    if let InsertOutcome::Split(c1, c2) = split_node(&mut existing.subtree, ctx) {
                        pending.push(c1);
                        pending.push(c2);
                    }
                } else {
                    recompute_radius(&mut existing, ctx.metric);
                    entries.push(existing);
                }
            }
        }
    }
}

/// Moves `incoming`'s own children into `existing_subtree` (the colliding
/// entry's subtree), one level down from `add_child`'s collision case.
/// `existing_subtree` and `incoming` are always the same kind (both `Leaf`
/// or both `Internal`) — height uniformity guarantees colliding siblings
/// sit at the same depth.
fn absorb_children<T, M, S>(existing_subtree: &mut Node<T>, existing_data: &T, incoming: Node<T>, ctx: &mut Ctx<T, M, S>)
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    match (existing_subtree, incoming) {
        (Node::Leaf { entries: target }, Node::Leaf { entries: incoming_entries }) => {
            for mut e in incoming_entries {
                e.distance_to_parent = ctx.metric.distance(&e.data, existing_data);
                target.push(e);
            }
        }
        (Node::Internal { entries: target }, Node::Internal { entries: incoming_entries }) => {
            for grandchild in incoming_entries {
                let new_child = NewChild {
                    data: grandchild.data,
                    radius: grandchild.radius,
                    subtree: grandchild.subtree,
                };
                add_child(target, new_child, Some(existing_data), ctx);
            }
        }
        _ => unreachable!("colliding siblings share child kind by height uniformity"),
    }
}

/// Splits `node` (a non-root `Leaf` or `Internal`), dispatching to the
/// right per-kind split routine. Used by [`add_child`]'s re-split-on-
/// overflow path, where only a `Node<T>` (not the surrounding entries
/// `Vec`) is at hand.
fn split_node<T, M, S>(node: &mut Node<T>, ctx: &mut Ctx<T, M, S>) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    match node {
        Node::Leaf { entries } => split_leaf(entries, ctx),
        Node::Internal { entries } => split_internal(entries, ctx),
        _ => unreachable!("add_child only ever holds non-root subtrees"),
    }
}

/// Picks the child entry to descend into: the nearest entry whose radius
/// already covers `data`, or, failing that, the entry needing the least
/// radius growth to cover it (which is grown in place).
fn choose_subtree<T, M>(entries: &mut [RoutingEntry<T>], data: &T, metric: &M) -> usize
where
    M: Metric<T>,
{
    let mut in_range: Option<(usize, f64)> = None;
    let mut best_overflow: Option<(usize, f64)> = None;

    for (i, e) in entries.iter().enumerate() {
        let d = metric.distance(data, &e.data);
        if d <= e.radius {
            if in_range.map_or(true, |(_, best)| d < best) {
                in_range = Some((i, d));
            }
        } else {
            let overflow = d - e.radius;
            if best_overflow.map_or(true, |(_, best)| overflow < best) {
                best_overflow = Some((i, overflow));
            }
        }
    }

    match in_range {
        Some((i, _)) => i,
        None => {
            let (i, _) = best_overflow.expect("a non-empty entries slice has at least one candidate");
            entries[i].radius = metric.distance(data, &entries[i].data);
            i
        }
    }
}

fn split_leaf<T, M, S>(entries: &mut Vec<LeafEntry<T>>, ctx: &mut Ctx<T, M, S>) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    debug!("splitting overflowing leaf node with {} entries", entries.len());
    let cache = DistanceCache::new(ctx.metric);
    let values: Vec<T> = entries.iter().map(|e| e.data.clone()).collect();
    let (p1, s1, p2, s2) = ctx.split.split(&values, &cache, ctx.min_capacity);

    let drained: Vec<LeafEntry<T>> = entries.drain(..).collect();
    let mut side1 = Vec::new();
    let mut side2 = Vec::new();
    for mut e in drained {
        if s1.contains(&e.data) {
            e.distance_to_parent = cache.distance(&e.data, &p1);
            side1.push(e);
        } else {
            debug_assert!(s2.contains(&e.data));
            e.distance_to_parent = cache.distance(&e.data, &p2);
            side2.push(e);
        }
    }

    let radius1 = side1.iter().map(|e| e.distance_to_parent).fold(0.0, f64::max);
    let radius2 = side2.iter().map(|e| e.distance_to_parent).fold(0.0, f64::max);

    InsertOutcome::Split(
        NewChild {
            data: p1,
            radius: radius1,
            subtree: Box::new(Node::Leaf { entries: side1 }),
        },
        NewChild {
            data: p2,
            radius: radius2,
            subtree: Box::new(Node::Leaf { entries: side2 }),
        },
    )
}

fn split_internal<T, M, S>(entries: &mut Vec<RoutingEntry<T>>, ctx: &mut Ctx<T, M, S>) -> InsertOutcome<T>
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    debug!("splitting overflowing internal node with {} entries", entries.len());
    let cache = DistanceCache::new(ctx.metric);
    let values: Vec<T> = entries.iter().map(|e| e.data.clone()).collect();
    let (p1, s1, p2, s2) = ctx.split.split(&values, &cache, ctx.min_capacity);

    let drained: Vec<RoutingEntry<T>> = entries.drain(..).collect();
    let mut side1 = Vec::new();
    let mut side2 = Vec::new();
    for mut e in drained {
        if s1.contains(&e.data) {
            e.distance_to_parent = cache.distance(&e.data, &p1);
            side1.push(e);
        } else {
            debug_assert!(s2.contains(&e.data));
            e.distance_to_parent = cache.distance(&e.data, &p2);
            side2.push(e);
        }
    }

    let radius1 = side1
        .iter()
        .map(|e| e.distance_to_parent + e.radius)
        .fold(0.0, f64::max);
    let radius2 = side2
        .iter()
        .map(|e| e.distance_to_parent + e.radius)
        .fold(0.0, f64::max);

    InsertOutcome::Split(
        NewChild {
            data: p1,
            radius: radius1,
            subtree: Box::new(Node::Internal { entries: side1 }),
        },
        NewChild {
            data: p2,
            radius: radius2,
            subtree: Box::new(Node::Internal { entries: side2 }),
        },
    )
}

/// If `node` is a `RootInternal` with exactly one entry left (the common
/// aftermath of repeated merges during deletion), collapses the tree by one
/// level: that entry's subtree becomes the new root.
pub(crate) fn try_shrink_root<T>(node: Node<T>) -> Node<T> {
    match node {
        Node::RootInternal { mut entries } if entries.len() == 1 => {
            debug!("collapsing root: single child promoted to new root");
            let child = entries.pop().expect("length checked above");
            match *child.subtree {
                Node::Leaf { entries } => Node::RootLeaf { entries },
                Node::Internal { entries } => Node::RootInternal { entries },
                other => other,
            }
        }
        other => other,
    }
}

/// Removes `data` from `node`. Whether the `min_capacity` underflow check
/// applies is read off `node`'s own variant (a root has no lower bound on
/// its entry count), not passed in — the variant already carries that fact.
pub(crate) fn remove<T, M, S>(
    node: &mut Node<T>,
    data: &T,
    parent_pivot: Option<&T>,
    ctx: &mut Ctx<T, M, S>,
) -> RemoveOutcome
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    match node {
        Node::RootLeaf { entries } => leaf_remove(entries, data, true, ctx),
        Node::Leaf { entries } => leaf_remove(entries, data, false, ctx),
        Node::RootInternal { entries } => internal_remove(entries, data, parent_pivot, true, ctx),
        Node::Internal { entries } => internal_remove(entries, data, parent_pivot, false, ctx),
    }
}

fn leaf_remove<T, M, S>(
    entries: &mut Vec<LeafEntry<T>>,
    data: &T,
    is_root: bool,
    ctx: &mut Ctx<T, M, S>,
) -> RemoveOutcome
where
    T: Eq,
{
    match entries.iter().position(|e| &e.data == data) {
        None => RemoveOutcome::NotFound,
        Some(i) => {
            entries.remove(i);
            let underflow = !is_root && entries.len() < ctx.min_capacity;
            RemoveOutcome::Removed { underflow }
        }
    }
}

fn internal_remove<T, M, S>(
    entries: &mut Vec<RoutingEntry<T>>,
    data: &T,
    parent_pivot: Option<&T>,
    is_root: bool,
    ctx: &mut Ctx<T, M, S>,
) -> RemoveOutcome
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    let candidates: Vec<usize> = (0..entries.len())
        .filter(|&i| ctx.metric.distance(data, &entries[i].data) <= entries[i].radius)
        .collect();

    for idx in candidates {
        let pivot = entries[idx].data.clone();
        let outcome = remove(&mut entries[idx].subtree, data, Some(&pivot), ctx);
        match outcome {
            RemoveOutcome::NotFound => continue,
            RemoveOutcome::Removed { underflow: false } => return RemoveOutcome::Removed { underflow: false },
            RemoveOutcome::Removed { underflow: true } => {
                repair_underflow(entries, idx, ctx);
                let underflow = !is_root && entries.len() < ctx.min_capacity;
                return RemoveOutcome::Removed { underflow };
            }
        }
    }
    RemoveOutcome::NotFound
}

/// Repairs entry `idx`, whose subtree has fallen under `min_capacity`, per
/// spec §4.6.3: independently searches the nearest sibling with a surplus
/// (room to donate one entry without itself underflowing) and the nearest
/// sibling sitting exactly at `min_capacity` (a merge candidate), donating
/// from the former if one exists and otherwise merging `idx`'s subtree into
/// the latter and dropping `idx` entirely. The two pools are searched
/// separately rather than picking a single globally-nearest sibling and
/// branching on its surplus, matching the original's `balance_children`
/// (`examples/original_source/py/mtree/__init__.py`): with three or more
/// siblings, the nearest one may lack surplus while a farther one has it,
/// and donating is always preferable to merging when both are available.
fn repair_underflow<T, M, S>(entries: &mut Vec<RoutingEntry<T>>, idx: usize, ctx: &mut Ctx<T, M, S>)
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    if entries.len() <= 1 {
        return;
    }

    let mut nearest_donor: Option<(usize, f64)> = None;
    let mut nearest_merge_candidate: Option<(usize, f64)> = None;

    for i in 0..entries.len() {
        if i == idx {
            continue;
        }
        let d = ctx.metric.distance(&entries[idx].data, &entries[i].data);
        if node_len(&entries[i].subtree) > ctx.min_capacity {
            if nearest_donor.map_or(true, |(_, best)| d < best) {
                nearest_donor = Some((i, d));
            }
        } else if nearest_merge_candidate.map_or(true, |(_, best)| d < best) {
            nearest_merge_candidate = Some((i, d));
        }
    }

    match nearest_donor {
        Some((donor_idx, _)) => donate(entries, idx, donor_idx, ctx),
        None => {
            let (merge_idx, _) = nearest_merge_candidate
                .expect("entries.len() > 1 guarantees at least one other sibling, a donor or a merge candidate");
            merge(entries, idx, merge_idx, ctx);
        }
    }
}

fn node_len<T>(node: &Node<T>) -> usize {
    node.len()
}

fn donate<T, M, S>(entries: &mut Vec<RoutingEntry<T>>, underflowed_idx: usize, donor_idx: usize, ctx: &mut Ctx<T, M, S>)
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    debug!("donating one entry from sibling {donor_idx} to underflowed child {underflowed_idx}");
    let moved = pop_one_entry_value(&mut entries[donor_idx].subtree);
    if let Some(value) = moved {
        let pivot = entries[underflowed_idx].data.clone();
        let _ = insert(&mut entries[underflowed_idx].subtree, value, Some(&pivot), ctx);
        recompute_radius(&mut entries[underflowed_idx], ctx.metric);
        recompute_radius(&mut entries[donor_idx], ctx.metric);
    }
}

fn merge<T, M, S>(entries: &mut Vec<RoutingEntry<T>>, underflowed_idx: usize, target_idx: usize, ctx: &mut Ctx<T, M, S>)
where
    T: Clone + Eq + Hash,
    M: Metric<T>,
    S: SplitPolicy<T>,
{
    debug!("merging underflowed child {underflowed_idx} into sibling {target_idx}");
    let removed = entries.remove(underflowed_idx);
    let target_idx = if target_idx > underflowed_idx { target_idx - 1 } else { target_idx };
    let values = drain_all_entry_values(*removed.subtree);
    let target_pivot = entries[target_idx].data.clone();
    for value in values {
        let _ = insert(&mut entries[target_idx].subtree, value, Some(&target_pivot), ctx);
    }
    recompute_radius(&mut entries[target_idx], ctx.metric);
}

/// Removes and returns one arbitrary data value from `node`, for donation
/// to an underflowed sibling. Leaves `node`'s own invariants intact (it is
/// only called on a node known to have a surplus above `min_capacity`).
fn pop_one_entry_value<T>(node: &mut Node<T>) -> Option<T> {
    match node {
        Node::Leaf { entries } | Node::RootLeaf { entries } => entries.pop().map(|e| e.data),
        Node::Internal { entries } | Node::RootInternal { entries } => {
            let last = entries.last_mut()?;
            pop_one_entry_value(&mut last.subtree)
        }
    }
}

/// Flattens every data value reachable from `node`, consuming it. Used to
/// redistribute a merged-away node's contents into its new home.
fn drain_all_entry_values<T>(node: Node<T>) -> Vec<T> {
    match node {
        Node::Leaf { entries } | Node::RootLeaf { entries } => entries.into_iter().map(|e| e.data).collect(),
        Node::Internal { entries } | Node::RootInternal { entries } => entries
            .into_iter()
            .flat_map(|e| drain_all_entry_values(*e.subtree))
            .collect(),
    }
}

fn recompute_radius<T, M>(entry: &mut RoutingEntry<T>, metric: &M)
where
    M: Metric<T>,
{
    entry.radius = match entry.subtree.as_ref() {
        Node::Leaf { entries } | Node::RootLeaf { entries } => entries
            .iter()
            .map(|e| metric.distance(&e.data, &entry.data))
            .fold(0.0, f64::max),
        Node::Internal { entries } | Node::RootInternal { entries } => entries
            .iter()
            .map(|e| metric.distance(&e.data, &entry.data) + e.radius)
            .fold(0.0, f64::max),
    };
}

/// Walks `root` checking the structural invariants that apply below the
/// tree's own public API: height uniformity, capacity bounds, cached
/// parent distances, and covering radii. Used by property tests in
/// [`crate::mtree`] that assert these hold after every mutation, not just
/// at the scenarios this module's own unit tests happen to cover.
#[cfg(test)]
pub(crate) fn assert_tree_invariants<T, M>(root: &Node<T>, metric: &M, min_capacity: usize, max_capacity: usize)
where
    M: Metric<T>,
{
    let depths = check_node(root, metric, min_capacity, max_capacity, true, None, f64::INFINITY, 0);
    if let Some(&first) = depths.first() {
        assert!(
            depths.iter().all(|&d| d == first),
            "leaves found at varying depths: {depths:?}"
        );
    }
}

#[cfg(test)]
fn check_node<T, M>(
    node: &Node<T>,
    metric: &M,
    min_capacity: usize,
    max_capacity: usize,
    is_root: bool,
    parent_pivot: Option<&T>,
    parent_radius: f64,
    depth: usize,
) -> Vec<usize>
where
    M: Metric<T>,
{
    match node {
        Node::RootLeaf { entries } => {
            assert!(is_root, "RootLeaf found below the root");
            for e in entries {
                check_entry_against_parent(&e.data, 0.0, e.distance_to_parent, parent_pivot, parent_radius, metric);
            }
            vec![depth]
        }
        Node::Leaf { entries } => {
            assert!(!is_root, "Leaf found at the root");
            assert!(
                entries.len() >= min_capacity && entries.len() <= max_capacity,
                "leaf capacity {} outside [{min_capacity}, {max_capacity}]",
                entries.len()
            );
            for e in entries {
                check_entry_against_parent(&e.data, 0.0, e.distance_to_parent, parent_pivot, parent_radius, metric);
            }
            vec![depth]
        }
        Node::RootInternal { entries } => {
            assert!(is_root, "RootInternal found below the root");
            assert!(entries.len() >= 2, "RootInternal below its minimum of 2: {}", entries.len());
            entries
                .iter()
                .flat_map(|e| {
                    check_entry_against_parent(&e.data, e.radius, e.distance_to_parent, parent_pivot, parent_radius, metric);
                    check_node(&e.subtree, metric, min_capacity, max_capacity, false, Some(&e.data), e.radius, depth + 1)
                })
                .collect()
        }
        Node::Internal { entries } => {
            assert!(!is_root, "Internal found at the root");
            assert!(
                entries.len() >= min_capacity && entries.len() <= max_capacity,
                "internal capacity {} outside [{min_capacity}, {max_capacity}]",
                entries.len()
            );
            entries
                .iter()
                .flat_map(|e| {
                    check_entry_against_parent(&e.data, e.radius, e.distance_to_parent, parent_pivot, parent_radius, metric);
                    check_node(&e.subtree, metric, min_capacity, max_capacity, false, Some(&e.data), e.radius, depth + 1)
                })
                .collect()
        }
    }
}

/// Checks invariants 3 and 4 (cached parent distance, covering radius) for
/// one entry against the node that holds it; a no-op at the root, which
/// has no parent entry of its own.
#[cfg(test)]
fn check_entry_against_parent<T, M>(
    data: &T,
    own_radius: f64,
    distance_to_parent: f64,
    parent_pivot: Option<&T>,
    parent_radius: f64,
    metric: &M,
) where
    M: Metric<T>,
{
    if let Some(pivot) = parent_pivot {
        let actual = metric.distance(data, pivot);
        assert!(
            (actual - distance_to_parent).abs() < 1e-6,
            "cached distance_to_parent {distance_to_parent} != actual d(data, parent) {actual}"
        );
        assert!(
            distance_to_parent + own_radius <= parent_radius + 1e-6,
            "covering radius violated: {distance_to_parent} + {own_radius} > {parent_radius}"
        );
    }
}
