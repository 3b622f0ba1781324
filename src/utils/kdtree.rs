//! Static 2-d tree for nearest-bit-location queries
//!
//! Built once over a bit-location snapshot; answers single nearest-neighbor
//! queries in O(log n) for well-distributed grids. There is no insertion or
//! removal: when the underlying point set changes, the owner rebuilds the
//! whole tree.

use crate::models::Point;

struct Node {
    point: Point,
    /// Position of the point in the slice the tree was built from
    index: usize,
    /// Split axis: 0 = x, 1 = y
    axis: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Balanced 2-d tree over an immutable point snapshot
pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    /// Build a tree from a point slice by recursive median split
    ///
    /// Query results report indices into this slice.
    pub fn build(points: &[Point]) -> Self {
        let mut items: Vec<(Point, usize)> =
            points.iter().copied().enumerate().map(|(i, p)| (p, i)).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = build_subtree(&mut items, 0, &mut nodes);
        Self { nodes, root }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no points
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The stored point closest to `query`, as (index, Euclidean distance)
    ///
    /// `None` only for an empty tree.
    pub fn nearest(&self, query: Point) -> Option<(usize, f64)> {
        let root = self.root?;
        let mut best = (usize::MAX, f64::INFINITY);
        self.search(root, query, &mut best);
        Some((best.0, best.1.sqrt()))
    }

    fn search(&self, node_id: usize, query: Point, best: &mut (usize, f64)) {
        let node = &self.nodes[node_id];

        let dist_sq = node.point.distance_squared(&query);
        if dist_sq < best.1 {
            *best = (node.index, dist_sq);
        }

        let diff = if node.axis == 0 {
            query.x - node.point.x
        } else {
            query.y - node.point.y
        };
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = near {
            self.search(child, query, best);
        }
        // The far side can only win if the splitting plane is closer than
        // the best match so far
        if let Some(child) = far {
            if diff * diff < best.1 {
                self.search(child, query, best);
            }
        }
    }
}

fn build_subtree(
    items: &mut [(Point, usize)],
    depth: usize,
    nodes: &mut Vec<Node>,
) -> Option<usize> {
    if items.is_empty() {
        return None;
    }

    let axis = (depth % 2) as u8;
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| {
        let (ka, kb) = if axis == 0 { (a.0.x, b.0.x) } else { (a.0.y, b.0.y) };
        ka.total_cmp(&kb)
    });

    let (point, index) = items[mid];
    let node_id = nodes.len();
    nodes.push(Node {
        point,
        index,
        axis,
        left: None,
        right: None,
    });

    let (lower, rest) = items.split_at_mut(mid);
    let upper = &mut rest[1..];
    let left = build_subtree(lower, depth + 1, nodes);
    let right = build_subtree(upper, depth + 1, nodes);
    nodes[node_id].left = left;
    nodes[node_id].right = right;

    Some(node_id)
}
