//! 3-D k-d tree for great-circle radius search.
//!
//! Points are projected onto the sphere and partitioned by x, y, z in turn.
//! The tree lives in a flat arena: children are indexes into `nodes`, so
//! traversal is a loop over a small stack instead of pointer chasing.
//!
//! Partitioning is Euclidean but the question asked of the tree is
//! "which points lie within `r` km along the surface". The search turns
//! `r` into the chord it subtends once and uses that chord only to decide
//! which subtrees can be skipped; every visited point is accepted or
//! rejected with the exact great-circle distance.

use citymesh_core::{chord_for_arc_km, great_circle_km, project, LatLon, Point3};

/// Relative slack added to the pruning chord.
const CHORD_SLACK_REL: f64 = 1e-9;

/// Absolute slack added to the pruning chord, in kilometres.
const CHORD_SLACK_ABS: f64 = 1e-6;

#[derive(Debug, Clone)]
struct KdNode<T> {
    item: T,
    location: LatLon,
    point: Point3,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Clone, Copy)]
struct Entry<T> {
    item: T,
    location: LatLon,
    point: Point3,
}

/// A static k-d tree over projected coordinates.
///
/// Built once from a full set of points; there is no insert or remove.
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    nodes: Vec<KdNode<T>>,
    root: Option<usize>,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<T: Copy> KdTree<T> {
    /// Builds a tree from `(item, location)` pairs.
    ///
    /// At depth `d` the points are stably sorted by axis `d % 3` and the
    /// one at index `len / 2` becomes the node; the points before and after
    /// it form the left and right subtrees. Equal inputs give equal trees.
    pub fn build(items: Vec<(T, LatLon)>) -> Self {
        let mut entries: Vec<Entry<T>> = items
            .into_iter()
            .map(|(item, location)| Entry {
                item,
                location,
                point: project(location),
            })
            .collect();

        let mut nodes = Vec::with_capacity(entries.len());
        let root = build_subtree(&mut entries, 0, &mut nodes);

        Self { nodes, root }
    }

    /// Returns every item whose great-circle distance to `center` is at
    /// most `radius_km`.
    ///
    /// The result is exact (same set as a linear scan). Order follows the
    /// traversal and carries no meaning.
    pub fn range_query(&self, center: LatLon, radius_km: f64) -> Vec<T> {
        let mut found = Vec::new();
        if radius_km.is_nan() || radius_km < 0.0 {
            return found;
        }

        let query = project(center);
        let chord = pruning_chord(radius_km);

        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];

            if great_circle_km(node.location, center) <= radius_km {
                found.push(node.item);
            }

            let split = node.point.axis(node.axis);
            let target = query.axis(node.axis);

            if let Some(left) = node.left {
                if split > target - chord {
                    stack.push(left);
                }
            }
            if let Some(right) = node.right {
                if split < target + chord {
                    stack.push(right);
                }
            }
        }

        found
    }

    /// Iterates over all indexed items with their locations, in arena order.
    pub fn items(&self) -> impl Iterator<Item = (T, LatLon)> + '_ {
        self.nodes.iter().map(|n| (n.item, n.location))
    }
}

impl<T> KdTree<T> {
    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Length of the longest root-to-leaf path (0 for an empty tree).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[index];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        deepest
    }
}

fn build_subtree<T: Copy>(
    entries: &mut [Entry<T>],
    depth: usize,
    nodes: &mut Vec<KdNode<T>>,
) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }

    let axis = depth % 3;
    entries.sort_by(|a, b| a.point.axis(axis).total_cmp(&b.point.axis(axis)));

    let median = entries.len() / 2;
    let pivot = entries[median];

    let slot = nodes.len();
    nodes.push(KdNode {
        item: pivot.item,
        location: pivot.location,
        point: pivot.point,
        axis,
        left: None,
        right: None,
    });

    let (before, rest) = entries.split_at_mut(median);
    let after = &mut rest[1..];

    let left = build_subtree(before, depth + 1, nodes);
    let right = build_subtree(after, depth + 1, nodes);

    nodes[slot].left = left;
    nodes[slot].right = right;

    Some(slot)
}

/// Chord bound for pruning. Slightly wider than the exact chord so that a
/// point sitting exactly on the radius is never cut off by rounding.
fn pruning_chord(radius_km: f64) -> f64 {
    chord_for_arc_km(radius_km) * (1.0 + CHORD_SLACK_REL) + CHORD_SLACK_ABS
}
