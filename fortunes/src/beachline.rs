//! The beachline: an arena-backed binary tree whose leaves are arcs and
//! whose internal nodes are breakpoints (§2 item 3, §3.3, §4.2-§4.4).

use log::trace;
use slotmap::SlotMap;

use crate::arc::{ArcId, ArcKind, EdgeData, Node, NodeId};
use crate::error::{GvdError, GvdResult};
use crate::event::EventPacket;
use crate::geometry::{
    bisect_point_line, bisect_point_point, consolidate, create_parabola, create_v, equiv2,
    parabola_f, point_on_arc_at_x, pp_intersect, v_f, vb_intersect, vp_intersect, vv_intersect,
    Bisector, Line, Vec2,
};
use crate::tolerances::Tolerances;

pub struct Beachline {
    arena: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
}

/// What a breakpoint's two adjacent sites resolve to, for `getIntercept`'s
/// dispatch and edge commitment's bisector choice.
enum Adjacent<'a> {
    Para(&'a crate::geometry::PointSite),
    V(&'a crate::geometry::SegmentSite),
}

/// An edge that finished sweeping and must be committed to the result (§4.7).
pub struct CommittedEdge {
    pub start: Vec2,
    pub end: Vec2,
    pub shape: EdgeShape,
}

pub enum EdgeShape {
    Line,
    Curve(crate::geometry::GeneralParabola),
}

/// What `insert`/`remove` report back to the driver.
pub struct MutationOutcome {
    pub recheck: Vec<ArcId>,
    pub committed: Vec<CommittedEdge>,
}

impl Beachline {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    pub fn arc(&self, id: ArcId) -> &ArcKind {
        self.arena[id].as_arc().expect("not an arc")
    }

    fn minimum(&self, mut id: NodeId) -> ArcId {
        loop {
            match self.arena[id].left {
                Some(left) => id = left,
                None => return id,
            }
        }
    }

    fn maximum(&self, mut id: NodeId) -> ArcId {
        loop {
            match self.arena[id].right {
                Some(right) => id = right,
                None => return id,
            }
        }
    }

    fn predecessor(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.arena[id].parent?;
            if self.arena[parent].right == Some(id) {
                return Some(parent);
            }
            id = parent;
        }
    }

    fn successor(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            let parent = self.arena[id].parent?;
            if self.arena[parent].left == Some(id) {
                return Some(parent);
            }
            id = parent;
        }
    }

    pub fn prev_arc(&self, id: ArcId) -> Option<ArcId> {
        let edge = self.predecessor(id)?;
        Some(self.maximum(self.arena[edge].left.unwrap()))
    }

    pub fn next_arc(&self, id: ArcId) -> Option<ArcId> {
        let edge = self.successor(id)?;
        Some(self.minimum(self.arena[edge].right.unwrap()))
    }

    pub fn prev_edge(&self, id: NodeId) -> Option<NodeId> {
        self.predecessor(id)
    }

    pub fn next_edge(&self, id: NodeId) -> Option<NodeId> {
        self.successor(id)
    }

    /// The arcs immediately left and right of a breakpoint, at any instant
    /// (not just the instant it was created).
    pub fn adjacent_arcs(&self, edge: NodeId) -> (ArcId, ArcId) {
        let node = &self.arena[edge];
        (self.maximum(node.left.unwrap()), self.minimum(node.right.unwrap()))
    }

    fn adjacent(&self, id: ArcId) -> Adjacent<'_> {
        match self.arc(id) {
            ArcKind::Para(p) => Adjacent::Para(p),
            ArcKind::V(s) => Adjacent::V(s),
        }
    }

    fn arc_point_at_x(&self, id: ArcId, directrix: f64, x: f64) -> GvdResult<Vec2> {
        match self.adjacent(id) {
            Adjacent::Para(p) => Ok(point_on_arc_at_x(p.point, directrix, x)),
            Adjacent::V(s) => {
                let v = create_v(s.a, s.b, directrix)?;
                v_f(&v, x)
                    .map(|y| Vec2::new(x, y))
                    .ok_or(GvdError::NoIntercept {
                        context: "arc_point_at_x: x outside V-arc's rays",
                    })
            }
        }
    }

    /// `getIntercept`: the active breakpoint between two neighboring arcs at
    /// the given sweep position (§4.2).
    pub fn get_intercept(
        &self,
        left: ArcId,
        right: ArcId,
        directrix: f64,
        tol: &Tolerances,
    ) -> GvdResult<Vec2> {
        match (self.adjacent(left), self.adjacent(right)) {
            (Adjacent::V(l), Adjacent::V(r)) => self.intersect_straight_arcs(l, r, directrix),
            (Adjacent::Para(l), Adjacent::Para(r)) => self.intersect_parabolic_arcs(l, r, directrix),
            _ => self.intersect_parabolic_to_straight_arc(left, right, directrix, tol),
        }
    }

    fn intersect_straight_arcs(
        &self,
        l: &crate::geometry::SegmentSite,
        r: &crate::geometry::SegmentSite,
        directrix: f64,
    ) -> GvdResult<Vec2> {
        let left = create_v(l.a, l.b, directrix)?;
        let right = create_v(r.a, r.b, directrix)?;
        let mut ints = vv_intersect(&left, &right);
        if ints.is_empty() {
            return Err(GvdError::NoIntercept {
                context: "intersectStraightArcs: empty V-V intersection",
            });
        }
        if ints.len() == 1 {
            return Ok(ints[0]);
        }
        if ints.len() > 2 {
            let pivot = right.apex.x();
            ints.sort_by(|a, b| {
                (a.x() - pivot)
                    .abs()
                    .partial_cmp(&(b.x() - pivot).abs())
                    .unwrap()
            });
            ints.truncate(2);
        }
        ints.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap());
        let cx = (ints[0].x() + ints[1].x()) / 2.0;
        let prev_y = v_f(&left, cx);
        let next_y = v_f(&right, cx);
        let lower = match (prev_y, next_y) {
            (Some(p), Some(n)) if p < n => 0,
            _ => 1,
        };
        Ok(ints[1 - lower])
    }

    fn intersect_parabolic_arcs(
        &self,
        l: &crate::geometry::PointSite,
        r: &crate::geometry::PointSite,
        directrix: f64,
    ) -> GvdResult<Vec2> {
        // A site sitting exactly on the directrix traces a degenerate arc (a
        // vertical ray at its own x), which `create_parabola` rejects. Two
        // sites can tie on y when they're consumed at the same sweep
        // position, so handle that before constructing either parabola.
        let l_degenerate = l.point.y() <= directrix;
        let r_degenerate = r.point.y() <= directrix;
        match (l_degenerate, r_degenerate) {
            (true, true) => {
                return Ok(Vec2::new((l.point.x() + r.point.x()) / 2.0, directrix));
            }
            (true, false) => {
                let right = create_parabola(r.point, directrix)?;
                let x = l.point.x();
                return Ok(Vec2::new(x, parabola_f(x, right.h, right.k, right.p)));
            }
            (false, true) => {
                let left = create_parabola(l.point, directrix)?;
                let x = r.point.x();
                return Ok(Vec2::new(x, parabola_f(x, left.h, left.k, left.p)));
            }
            (false, false) => {}
        }

        let left = create_parabola(l.point, directrix)?;
        let right = create_parabola(r.point, directrix)?;
        let mut ints = pp_intersect(left.h, left.k, left.p, right.h, right.k, right.p);
        if ints.is_empty() {
            return Err(GvdError::NoIntercept {
                context: "intersectParabolicArcs: empty P-P intersection",
            });
        }
        ints.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap());
        let cx = (ints[0].x() + ints[1].x()) / 2.0;
        let prev_y = parabola_f(cx, left.h, left.k, left.p);
        let next_y = parabola_f(cx, right.h, right.k, right.p);
        let lower = if prev_y < next_y { 0 } else { 1 };
        Ok(ints[1 - lower])
    }

    fn intersect_parabolic_to_straight_arc(
        &self,
        left: ArcId,
        right: ArcId,
        directrix: f64,
        tol: &Tolerances,
    ) -> GvdResult<Vec2> {
        let (para, seg) = match (self.adjacent(left), self.adjacent(right)) {
            (Adjacent::Para(p), Adjacent::V(s)) => (*p, *s),
            (Adjacent::V(s), Adjacent::Para(p)) => (*p, *s),
            _ => unreachable!("dispatch guarantees one Para and one V"),
        };

        let parabola = create_parabola(para.point, directrix)?;
        let v = create_v(seg.a, seg.b, directrix)?;
        let mut ints = vp_intersect(&v, &parabola);

        if ints.is_empty() {
            let at_endpoint = equiv2(para.point, seg.a)
                || (equiv2(para.point, seg.b) && parabola.p < tol.parabola_narrowness);
            if at_endpoint {
                let backup = Line::horizontal(parabola.focus.y());
                ints = vb_intersect(&v, backup);
            }
            if ints.is_empty() {
                return Err(GvdError::NoIntercept {
                    context: "intersectParabolicToStraightArc: 0 intersections between P and V",
                });
            }
        }

        if ints.len() == 1 {
            return Ok(ints[0]);
        }
        if ints.len() > 2 {
            ints = consolidate(&ints, para.point.x(), tol);
            if ints.len() == 1 {
                return Ok(ints[0]);
            }
        }

        ints.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap());
        let cx = (ints[0].x() + ints[1].x()) / 2.0;
        let v_y = v_f(&v, cx);
        let p_y = parabola_f(cx, parabola.h, parabola.k, parabola.p);
        let lower = match v_y {
            Some(vy) if vy < p_y => 0,
            _ => 1,
        };
        let idx = if equiv2(para.point, seg.b) { lower } else { 1 - lower };
        Ok(ints[idx])
    }

    /// Descends from the root to find the arc above `(x, directrix)`.
    pub fn locate_arc_above(&self, x: f64, directrix: f64, tol: &Tolerances) -> GvdResult<ArcId> {
        let mut current = self.root.ok_or(GvdError::NoIntercept {
            context: "locate_arc_above: empty beachline",
        })?;
        loop {
            let node = &self.arena[current];
            if node.as_arc().is_some() {
                return Ok(current);
            }
            let left = self.maximum(node.left.unwrap());
            let right = self.minimum(node.right.unwrap());
            let bp = self.get_intercept(left, right, directrix, tol)?;
            current = if x < bp.x() {
                node.left.unwrap()
            } else {
                node.right.unwrap()
            };
        }
    }

    /// Inserts an `EventPacket` into the beachline (§4.3). Returns the arcs
    /// whose close events must be recomputed.
    pub fn insert(&mut self, packet: &EventPacket, tol: &Tolerances) -> GvdResult<MutationOutcome> {
        let vertex = packet_vertex(packet);
        let directrix = packet.directrix();
        let fan = fan_order(packet);

        if self.root.is_none() {
            let (root, arcs) = self.build_fan(&fan, vertex);
            self.root = Some(root);
            return Ok(MutationOutcome {
                recheck: arcs,
                committed: vec![],
            });
        }

        let split = self.locate_arc_above(vertex.x(), directrix, tol)?;
        let split_kind = *self.arc(split);
        let edge_origin = self.arc_point_at_x(split, directrix, vertex.x())?;

        let old_prev_edge = self.prev_edge(split);
        let old_next_edge = self.next_edge(split);
        let parent = self.arena[split].parent;

        let left_copy = self.arena.insert(Node::leaf(split_kind));
        let right_copy = self.arena.insert(Node::leaf(split_kind));

        let (fan_root, fan_arcs) = self.build_fan(&fan, vertex);

        let left_edge = self
            .arena
            .insert(Node::internal(left_copy, fan_root, EdgeData::new(edge_origin)));
        self.arena[left_copy].parent = Some(left_edge);
        self.arena[fan_root].parent = Some(left_edge);

        let right_edge = self
            .arena
            .insert(Node::internal(left_edge, right_copy, EdgeData::new(edge_origin)));
        self.arena[left_edge].parent = Some(right_edge);
        self.arena[right_copy].parent = Some(right_edge);

        if let Some(p) = parent {
            if self.arena[p].left == Some(split) {
                self.arena[p].left = Some(right_edge);
            } else {
                self.arena[p].right = Some(right_edge);
            }
            self.arena[right_edge].parent = Some(p);
        } else {
            self.root = Some(right_edge);
        }
        self.arena.remove(split);

        for e in [old_prev_edge, old_next_edge].into_iter().flatten() {
            if equiv2(self.arena[e].as_edge().unwrap().edge_start, vertex) {
                self.arena[e].as_edge_mut().unwrap().overridden = true;
                trace!("beachline: edge {:?} overridden by shared vertex {:?}", e, vertex);
            }
        }

        let mut recheck = vec![left_copy];
        recheck.extend(&fan_arcs);
        recheck.push(right_copy);
        if let Some(p) = self.prev_arc(left_copy) {
            recheck.insert(0, p);
        }
        if let Some(n) = self.next_arc(right_copy) {
            recheck.push(n);
        }

        Ok(MutationOutcome {
            recheck,
            committed: vec![],
        })
    }

    /// Builds a left-to-right chain of arcs from `fan`, all new breakpoints
    /// anchored at `vertex`. Returns the subtree root and the arcs created.
    fn build_fan(&mut self, fan: &[ArcKind], vertex: Vec2) -> (NodeId, Vec<ArcId>) {
        let arcs: Vec<ArcId> = fan
            .iter()
            .map(|kind| self.arena.insert(Node::leaf(*kind)))
            .collect();

        let mut root = arcs[0];
        for &next in &arcs[1..] {
            let edge = self
                .arena
                .insert(Node::internal(root, next, EdgeData::new(vertex)));
            self.arena[root].parent = Some(edge);
            self.arena[next].parent = Some(edge);
            root = edge;
        }
        (root, arcs)
    }

    /// Removes a collapsing arc (§4.4). `point` is the close-event locus.
    /// Returns committed edges and the arcs needing a fresh close-event
    /// prediction.
    pub fn remove(&mut self, arc: ArcId, point: Vec2) -> GvdResult<MutationOutcome> {
        let prev_edge = self.prev_edge(arc);
        let next_edge = self.next_edge(arc);

        let mut committed = vec![];
        for e in [prev_edge, next_edge].into_iter().flatten() {
            if !self.arena[e].as_edge().unwrap().overridden {
                if let Some(edge) = self.commit_edge(e, point) {
                    committed.push(edge);
                }
            }
        }

        let parent = self.arena[arc].parent.ok_or(GvdError::NoIntercept {
            context: "remove: arc has no parent",
        })?;
        let grandparent = self.arena[parent].parent.ok_or(GvdError::NoIntercept {
            context: "remove: arc's parent has no parent",
        })?;

        let side_is_left = self.arena[parent].left == Some(arc);
        let parent_side_is_left = self.arena[grandparent].left == Some(parent);

        // The arc's own parent is the edge on its own side (next_edge when
        // the arc is a left child, prev_edge when it's a right child) and is
        // detached below; the *other* edge is the one that survives in the
        // tree and absorbs the close point as its new edgeStart.
        let surviving_edge = if side_is_left {
            prev_edge.ok_or(GvdError::NoIntercept {
                context: "remove: missing surviving prev edge",
            })?
        } else {
            next_edge.ok_or(GvdError::NoIntercept {
                context: "remove: missing surviving next edge",
            })?
        };

        let sibling = if side_is_left {
            self.arena[parent].right.unwrap()
        } else {
            self.arena[parent].left.unwrap()
        };

        if parent_side_is_left {
            self.arena[grandparent].left = Some(sibling);
        } else {
            self.arena[grandparent].right = Some(sibling);
        }
        self.arena[sibling].parent = Some(grandparent);
        self.arena[surviving_edge].as_edge_mut().unwrap().edge_start = point;

        self.arena.remove(arc);
        self.arena.remove(parent);

        let mut recheck = vec![];
        if let Some(p) = self.prev_arc(surviving_edge) {
            recheck.push(p);
        }
        if let Some(n) = self.next_arc(surviving_edge) {
            recheck.push(n);
        }

        Ok(MutationOutcome { recheck, committed })
    }

    /// Commits the final edge for a terminating breakpoint (§4.7).
    fn commit_edge(&self, edge: NodeId, end_point: Vec2) -> Option<CommittedEdge> {
        let prev = self.prev_arc(edge)?;
        let next = self.next_arc(edge)?;
        let prev_kind = self.arc(prev);
        let next_kind = self.arc(next);
        if prev_kind.label() == next_kind.label() {
            return None;
        }
        let start = self.arena[edge].as_edge().unwrap().edge_start;
        let shape = match (prev_kind, next_kind) {
            (ArcKind::V(_), ArcKind::V(_)) => EdgeShape::Line,
            (ArcKind::Para(p), ArcKind::Para(q)) => match bisect_point_point(p.point, q.point) {
                Bisector::Line(_) => EdgeShape::Line,
                _ => unreachable!("point-point bisector is always a line"),
            },
            (ArcKind::Para(p), ArcKind::V(s)) | (ArcKind::V(s), ArcKind::Para(p)) => {
                match bisect_point_line(p.point, s.a, s.b) {
                    Bisector::Parabola(gp) => EdgeShape::Curve(gp),
                    _ => unreachable!("point-line bisector is always a parabola"),
                }
            }
        };
        Some(CommittedEdge {
            start,
            end: end_point,
            shape,
        })
    }
}

fn packet_vertex(packet: &EventPacket) -> Vec2 {
    match packet.primary {
        crate::event::SiteEvent::Point(p) => p.point,
        crate::event::SiteEvent::Seg(s) => s.a,
    }
}

/// Orders a packet's 1-3 sites left-to-right for fan construction, by the
/// angular offset of each segment's lower endpoint from straight-down at the
/// shared vertex; a lone point site (no direction of its own) sorts as the
/// center.
fn fan_order(packet: &EventPacket) -> Vec<ArcKind> {
    let vertex = packet_vertex(packet);

    let mut entries: Vec<(f64, ArcKind)> = packet
        .all()
        .map(|e| match e {
            crate::event::SiteEvent::Point(p) => (0.0, ArcKind::Para(*p)),
            crate::event::SiteEvent::Seg(s) => {
                let d = s.b - vertex;
                let angle = d.x().atan2(-d.y());
                (angle, ArcKind::V(*s))
            }
        })
        .collect();

    entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    entries.into_iter().map(|(_, k)| k).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SiteEvent;
    use crate::geometry::PointSite;

    fn packet_of(p: PointSite) -> EventPacket {
        EventPacket::single(SiteEvent::Point(p))
    }

    #[test]
    fn locate_arc_above_is_monotone_for_two_arcs() {
        let mut bl = Beachline::new();
        let tol = Tolerances::default();
        let p1 = PointSite::new(0, Vec2::new(0.0, 10.0));
        let p2 = PointSite::new(1, Vec2::new(4.0, 6.0));

        bl.insert(&packet_of(p1), &tol).unwrap();
        bl.insert(&packet_of(p2), &tol).unwrap();

        let directrix = 0.0;
        let left = bl.locate_arc_above(-100.0, directrix, &tol).unwrap();
        let right = bl.locate_arc_above(100.0, directrix, &tol).unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn prev_and_next_arc_are_symmetric() {
        let mut bl = Beachline::new();
        let tol = Tolerances::default();
        let p1 = PointSite::new(0, Vec2::new(-5.0, 10.0));
        let p2 = PointSite::new(1, Vec2::new(5.0, 10.0));
        let p3 = PointSite::new(2, Vec2::new(0.0, 5.0));

        bl.insert(&packet_of(p1), &tol).unwrap();
        bl.insert(&packet_of(p2), &tol).unwrap();
        let outcome = bl.insert(&packet_of(p3), &tol).unwrap();

        let middle = outcome
            .recheck
            .iter()
            .find(|&&id| bl.arc(id).label() == 2)
            .copied()
            .unwrap();
        let left = bl.prev_arc(middle).unwrap();
        let right = bl.next_arc(middle).unwrap();
        assert_eq!(bl.next_arc(left).unwrap(), middle);
        assert_eq!(bl.prev_arc(right).unwrap(), middle);
    }
}
