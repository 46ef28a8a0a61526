//! Beachline sampling at the sweep's stop position (§4.8): renders every
//! still-active arc and breakpoint so a caller can draw the beachline's
//! final snapshot, in addition to the committed Voronoi edges.

use crate::arc::{ArcKind, NodeId};
use crate::beachline::Beachline;
use crate::geometry::{create_parabola, create_v, prep_draw_parabola, prep_draw_v, Vec2};
use crate::tolerances::Tolerances;

/// A still-active ARC_V's sampled run at the stop position (§3.4 `b_edges`).
pub struct BeachlineEdge {
    pub points: Vec<Vec2>,
}

/// A still-active ARC_PARA's sampled run at the stop position (§3.4
/// `b_curvedEdges`).
pub struct BeachlineCurve {
    pub points: Vec<Vec2>,
}

pub struct BeachlineSnapshot {
    pub edges: Vec<BeachlineEdge>,
    pub curves: Vec<BeachlineCurve>,
}

const SAMPLES_PER_ARC: usize = 24;

/// Walks every arc in the beachline left to right and samples its envelope
/// between the breakpoints bounding it (or a fixed margin at the two ends).
/// ARC_V arcs land in `edges`, ARC_PARA arcs in `curves` (§3.4/§6.2).
pub fn sample_beachline(
    bl: &Beachline,
    root: NodeId,
    directrix: f64,
    x_margin: f64,
    tol: &Tolerances,
) -> BeachlineSnapshot {
    let mut arcs = vec![];
    collect_arcs_in_order(bl, root, &mut arcs);

    let mut curves = vec![];
    let mut edges = vec![];

    for (i, &arc_id) in arcs.iter().enumerate() {
        let xl = if i == 0 {
            leftmost_x(bl, root) - x_margin
        } else {
            bl.get_intercept(arcs[i - 1], arc_id, directrix, tol)
                .map(|p| p.x())
                .unwrap_or(-x_margin)
        };
        let xr = if i + 1 == arcs.len() {
            rightmost_x(bl, root) + x_margin
        } else {
            bl.get_intercept(arc_id, arcs[i + 1], directrix, tol)
                .map(|p| p.x())
                .unwrap_or(x_margin)
        };

        match bl.arc(arc_id) {
            ArcKind::Para(p) => {
                let points = create_parabola(p.point, directrix)
                    .map(|parab| prep_draw_parabola(&parab, xl, xr, SAMPLES_PER_ARC))
                    .unwrap_or_default();
                if !points.is_empty() {
                    curves.push(BeachlineCurve { points });
                }
            }
            ArcKind::V(s) => {
                let points = create_v(s.a, s.b, directrix)
                    .map(|v| prep_draw_v(&v, xl, xr, SAMPLES_PER_ARC))
                    .unwrap_or_default();
                if !points.is_empty() {
                    edges.push(BeachlineEdge { points });
                }
            }
        }
    }

    BeachlineSnapshot { edges, curves }
}

fn collect_arcs_in_order(bl: &Beachline, id: NodeId, out: &mut Vec<NodeId>) {
    let node = bl.node(id);
    match (node.left, node.right) {
        (Some(l), Some(r)) => {
            collect_arcs_in_order(bl, l, out);
            collect_arcs_in_order(bl, r, out);
        }
        _ => out.push(id),
    }
}

fn leftmost_x(bl: &Beachline, root: NodeId) -> f64 {
    let mut id = root;
    loop {
        match bl.node(id).left {
            Some(l) => id = l,
            None => return arc_site_x(bl, id),
        }
    }
}

fn rightmost_x(bl: &Beachline, root: NodeId) -> f64 {
    let mut id = root;
    loop {
        match bl.node(id).right {
            Some(r) => id = r,
            None => return arc_site_x(bl, id),
        }
    }
}

fn arc_site_x(bl: &Beachline, id: NodeId) -> f64 {
    match bl.arc(id) {
        ArcKind::Para(p) => p.point.x(),
        ArcKind::V(s) => s.a.x(),
    }
}
