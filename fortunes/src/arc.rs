//! Beachline node payloads: the two arc variants and the breakpoint
//! (internal-node) variant, per §3.3. Tree structure and navigation live in
//! `beachline`, keyed by the arena ids defined here.

use slotmap::new_key_type;

use crate::geometry::{PointSite, SegmentSite, Vec2};

new_key_type! {
    /// Stable id of a beachline tree node (arc leaf or breakpoint). Close
    /// events key on this id rather than a pointer, per the design note in
    /// §9: cancellation becomes an id-keyed scan/remove, safe even after the
    /// node it once referred to is detached.
    pub struct NodeId;
}

/// Arcs are keyed the same way as breakpoints; this alias documents intent
/// at call sites that specifically expect a leaf.
pub type ArcId = NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArcKind {
    /// ARC_PARA: the parabolic arc traced by a point site.
    Para(PointSite),
    /// ARC_V: the V-shaped arc traced by a segment site.
    V(SegmentSite),
}

impl ArcKind {
    pub fn label(&self) -> i64 {
        match self {
            ArcKind::Para(p) => p.label,
            ArcKind::V(s) => s.label,
        }
    }
}

/// EDGE: an active breakpoint between the subtree's rightmost arc and the
/// next subtree's leftmost arc.
#[derive(Copy, Clone, Debug)]
pub struct EdgeData {
    pub edge_start: Vec2,
    /// Marks an edge subsumed by a later subtree replacement (§4.3); such an
    /// edge must never be committed on removal (§4.4 step 1).
    pub overridden: bool,
}

impl EdgeData {
    pub fn new(edge_start: Vec2) -> Self {
        Self {
            edge_start,
            overridden: false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Arc(ArcKind),
    Edge(EdgeData),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub data: NodeData,
}

impl Node {
    pub fn leaf(data: ArcKind) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            data: NodeData::Arc(data),
        }
    }

    pub fn internal(left: NodeId, right: NodeId, edge: EdgeData) -> Self {
        Self {
            parent: None,
            left: Some(left),
            right: Some(right),
            data: NodeData::Edge(edge),
        }
    }

    pub fn as_arc(&self) -> Option<&ArcKind> {
        match &self.data {
            NodeData::Arc(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeData> {
        match &self.data {
            NodeData::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_edge_mut(&mut self) -> Option<&mut EdgeData> {
        match &mut self.data {
            NodeData::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.data, NodeData::Edge(_))
    }
}
