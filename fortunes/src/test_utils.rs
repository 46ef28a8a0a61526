use approx::relative_eq;
use itertools::Itertools;

use crate::geometry::Vec2;
use crate::Edge;

pub fn compare_points(a: &Vec2, b: &Vec2) -> bool {
    relative_eq!(a.x(), b.x()) && relative_eq!(a.y(), b.y())
}

pub fn compare_edges_unordered(a: &Edge, b: &Edge) -> bool {
    (compare_points(&a.start, &b.start) && compare_points(&a.end, &b.end))
        || (compare_points(&a.start, &b.end) && compare_points(&a.end, &b.start))
}

/// True when `a` and `b` contain the same set of edges up to endpoint
/// swap and ordering, matching how the sweep may commit the two halves of
/// a Voronoi vertex in either order.
pub fn compare_edge_sets(a: &[Edge], b: &[Edge]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    for perm in a.iter().permutations(a.len()).unique() {
        if perm.iter().enumerate().all(|(i, e)| compare_edges_unordered(e, &b[i])) {
            return true;
        }
    }

    false
}
