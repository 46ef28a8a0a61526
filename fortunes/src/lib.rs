//! A generalized Voronoi diagram over mixed point and segment sites,
//! computed with a generalized Fortune sweep (§1-§2).
//!
//! The sweep descends in y; [`beachline`] tracks the active arcs, [`event`]
//! defines what drives the sweep forward, and [`predictor`] decides when an
//! arc is about to vanish. [`GvdBuilder`] owns one sweep's worth of state.

pub mod arc;
pub mod beachline;
pub mod error;
pub mod event;
pub mod geometry;
pub mod predictor;
pub mod sample;
pub mod tolerances;

#[cfg(test)]
mod test_utils;

use std::collections::HashMap;

use log::{debug, trace};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::arc::ArcId;
use crate::beachline::{Beachline, EdgeShape};
use crate::error::GvdResult;
use crate::event::{merge_packet, CloseEvent, SiteEvent};
use crate::geometry::{sample_bisector, PointSite, SegmentSite, Vec2};
use crate::tolerances::Tolerances;

const CURVE_SAMPLES: usize = 16;

/// A straight Voronoi edge in the final diagram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub start: Vec2,
    pub end: Vec2,
}

/// A curved (point-vs-segment) Voronoi edge, pre-sampled into a polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct CurvedEdge {
    pub points: Vec<Vec2>,
}

/// A straight run of the beachline at the sweep's stop position.
pub use crate::sample::BeachlineEdge;
/// A curved run of the beachline at the sweep's stop position.
pub use crate::sample::BeachlineCurve;

/// Everything the sweep produces (§3.4).
#[derive(Default)]
pub struct ComputeResult {
    pub edges: Vec<Edge>,
    pub curved_edges: Vec<CurvedEdge>,
    pub b_edges: Vec<BeachlineEdge>,
    pub b_curved_edges: Vec<BeachlineCurve>,
    /// Close events still pending in the queue when the sweep stopped (§3.4's
    /// `b_closeEvents`), keyed by the arc they would collapse.
    pub b_close_events: Vec<CloseEvent>,
    pub stats: SweepStats,
}

/// Bookkeeping about the run, surfaced instead of the original's ad hoc
/// string-concatenated debug message (§9).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub site_events_processed: u64,
    pub close_events_processed: u64,
    pub beachline_para_count: u64,
    pub beachline_v_count: u64,
}

/// Owns one sweep's input and working state; construct, feed sites, call
/// [`GvdBuilder::run`] once.
pub struct GvdBuilder {
    site_queue: Vec<SiteEvent>,
    tol: Tolerances,
}

impl GvdBuilder {
    pub fn new() -> Self {
        Self {
            site_queue: vec![],
            tol: Tolerances::default(),
        }
    }

    pub fn with_tolerances(tol: Tolerances) -> Self {
        Self {
            site_queue: vec![],
            tol,
        }
    }

    pub fn add_point(&mut self, label: i64, point: Vec2) -> &mut Self {
        self.site_queue.push(SiteEvent::Point(PointSite::new(label, point)));
        self
    }

    pub fn add_segment(&mut self, label: i64, a: Vec2, b: Vec2) -> GvdResult<&mut Self> {
        let seg = SegmentSite::new(label, a, b)?;
        self.site_queue.push(SiteEvent::Seg(seg));
        Ok(self)
    }

    /// Runs the sweep down to `stop_y` (§1, §4.6): the most-advanced pending
    /// event is always processed next; once the next event's y would fall
    /// strictly below `stop_y`, the loop halts and the live beachline is
    /// sampled at `stop_y` instead. Pass `f64::NEG_INFINITY` to run to
    /// completion (every site consumed, every close event fired or
    /// discarded).
    pub fn run(mut self, stop_y: f64) -> GvdResult<ComputeResult> {
        // Ascending by y; within a tie, segment events sort before the point
        // event at the same vertex, so a polygon-vertex point (if present)
        // always ends up last and becomes the packet's primary (§3.2).
        self.site_queue.sort_by(|a, b| {
            a.y()
                .partial_cmp(&b.y())
                .unwrap()
                .then_with(|| is_point_event(a).cmp(&is_point_event(b)))
        });

        let mut beachline = Beachline::new();
        let mut close_events: PriorityQueue<ArcId, OrderedFloat<f64>> = PriorityQueue::new();
        let mut close_points: HashMap<ArcId, Vec2> = HashMap::new();
        let mut stats = SweepStats::default();
        let mut result = ComputeResult::default();

        loop {
            let next_site_y = self.site_queue.last().map(|e| e.y().into_inner());
            let next_close_y = close_events.peek().map(|(_, y)| y.into_inner());

            if next_site_y.is_none() && next_close_y.is_none() {
                break;
            }

            let take_close = match (next_site_y, next_close_y) {
                (_, None) => false,
                (None, Some(_)) => true,
                // ties favor the close event (§9 design note, §4.6 "close-event tie")
                (Some(sy), Some(cy)) => cy >= sy - self.tol.directrix_slack,
            };

            let candidate_y = if take_close { next_close_y.unwrap() } else { next_site_y.unwrap() };
            if candidate_y < stop_y {
                // the beachline is returned as-is (§4.6 step 2)
                break;
            }

            if take_close {
                let (arc, y) = close_events.pop().unwrap();
                let point = close_points.remove(&arc).unwrap_or_else(|| Vec2::new(0.0, y.into_inner()));
                self.process_close_event(
                    arc,
                    point,
                    &mut beachline,
                    &mut close_events,
                    &mut close_points,
                    &mut result,
                    &mut stats,
                )?;
            } else {
                let site = self.site_queue.pop().unwrap();
                self.process_site_event(site, &mut beachline, &mut close_events, &mut close_points, &mut stats)?;
            }
        }

        count_arcs(&beachline, &mut stats);

        if let Some(root) = beachline.root() {
            let snapshot = sample::sample_beachline(&beachline, root, stop_y, 1000.0, &self.tol);
            result.b_edges = snapshot.edges;
            result.b_curved_edges = snapshot.curves;
        }

        result.b_close_events = close_events
            .iter()
            .filter_map(|(arc, y)| {
                close_points.get(arc).map(|&point| CloseEvent {
                    yval: y.into_inner(),
                    arc: *arc,
                    point,
                })
            })
            .collect();

        result.stats = stats;
        Ok(result)
    }

    fn process_site_event(
        &mut self,
        site: SiteEvent,
        beachline: &mut Beachline,
        close_events: &mut PriorityQueue<ArcId, OrderedFloat<f64>>,
        close_points: &mut HashMap<ArcId, Vec2>,
        stats: &mut SweepStats,
    ) -> GvdResult<()> {
        let packet = merge_packet(site, &mut self.site_queue);
        let directrix = packet.directrix();
        trace!("processing site packet at y={directrix}");

        let outcome = beachline.insert(&packet, &self.tol)?;
        for id in &outcome.recheck {
            close_events.remove(id);
            close_points.remove(id);
        }
        self.repredict(&outcome.recheck, beachline, directrix, close_events, close_points)?;

        stats.site_events_processed += 1;
        Ok(())
    }

    fn process_close_event(
        &mut self,
        arc: ArcId,
        point: Vec2,
        beachline: &mut Beachline,
        close_events: &mut PriorityQueue<ArcId, OrderedFloat<f64>>,
        close_points: &mut HashMap<ArcId, Vec2>,
        result: &mut ComputeResult,
        stats: &mut SweepStats,
    ) -> GvdResult<()> {
        let outcome = beachline.remove(arc, point)?;
        debug!("commit_edge produced {} edges", outcome.committed.len());
        for committed in outcome.committed {
            match committed.shape {
                EdgeShape::Line => result.edges.push(Edge {
                    start: committed.start,
                    end: committed.end,
                }),
                EdgeShape::Curve(gp) => {
                    let points = sample_bisector(&gp, committed.start, committed.end, CURVE_SAMPLES);
                    result.curved_edges.push(CurvedEdge { points });
                }
            }
        }

        for id in &outcome.recheck {
            close_events.remove(id);
            close_points.remove(id);
        }
        self.repredict(&outcome.recheck, beachline, point.y(), close_events, close_points)?;

        stats.close_events_processed += 1;
        Ok(())
    }

    fn repredict(
        &self,
        arcs: &[ArcId],
        beachline: &Beachline,
        directrix: f64,
        close_events: &mut PriorityQueue<ArcId, OrderedFloat<f64>>,
        close_points: &mut HashMap<ArcId, Vec2>,
    ) -> GvdResult<()> {
        for &middle in arcs {
            let Some(left) = beachline.prev_arc(middle) else {
                continue;
            };
            let Some(right) = beachline.next_arc(middle) else {
                continue;
            };
            if let Some(CloseEvent { arc, point, yval }) =
                predictor::predict(beachline, left, middle, right, directrix, &self.tol)?
            {
                close_events.push(arc, OrderedFloat(yval));
                close_points.insert(arc, point);
            }
        }
        Ok(())
    }
}

impl Default for GvdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_point_event(e: &SiteEvent) -> bool {
    matches!(e, SiteEvent::Point(_))
}

fn count_arcs(bl: &Beachline, stats: &mut SweepStats) {
    if let Some(root) = bl.root() {
        count_arcs_rec(bl, root, stats);
    }
}

fn count_arcs_rec(bl: &Beachline, id: arc::NodeId, stats: &mut SweepStats) {
    let node = bl.node(id);
    match (node.left, node.right) {
        (Some(l), Some(r)) => {
            count_arcs_rec(bl, l, stats);
            count_arcs_rec(bl, r, stats);
        }
        _ => match bl.arc(id) {
            arc::ArcKind::Para(_) => stats.beachline_para_count += 1,
            arc::ArcKind::V(_) => stats.beachline_v_count += 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_sites_never_close_but_leave_one_open_breakpoint() {
        // With only two sites the beachline never holds three arcs at once,
        // so no close event ever fires; the single bisector only shows up
        // in the beachline snapshot, never as a committed edge.
        let mut builder = GvdBuilder::new();
        builder
            .add_point(0, Vec2::new(250.0, 500.0))
            .add_point(1, Vec2::new(750.0, 500.0));

        let result = builder.run(f64::NEG_INFINITY).unwrap();
        assert!(result.edges.is_empty());
        assert!(result.curved_edges.is_empty());
        assert_eq!(result.stats.site_events_processed, 2);
        assert!(!result.b_curved_edges.is_empty());
    }

    #[test]
    fn three_colinear_point_sites_have_no_circumcenter() {
        let mut builder = GvdBuilder::new();
        builder
            .add_point(0, Vec2::new(0.0, 10.0))
            .add_point(1, Vec2::new(0.0, 20.0))
            .add_point(2, Vec2::new(0.0, 30.0));
        let result = builder.run(f64::NEG_INFINITY).unwrap();
        assert_eq!(result.stats.close_events_processed, 0);
    }

    #[test]
    fn three_points_produce_a_single_voronoi_vertex() {
        // One close event commits the two edges adjacent to the vanishing
        // arc; the third (between the two outer arcs) stays open for the
        // rest of the sweep since nothing else ever closes it.
        let mut builder = GvdBuilder::new();
        builder
            .add_point(0, Vec2::new(250.0, 250.0))
            .add_point(1, Vec2::new(500.0, 750.0))
            .add_point(2, Vec2::new(750.0, 250.0));

        let result = builder.run(f64::NEG_INFINITY).unwrap();
        assert_eq!(result.stats.close_events_processed, 1);
        assert_eq!(result.edges.len(), 2);
    }

    #[test]
    fn a_single_segment_site_produces_no_edges() {
        let mut builder = GvdBuilder::new();
        builder
            .add_segment(0, Vec2::new(0.0, 10.0), Vec2::new(0.0, 0.0))
            .unwrap();
        let result = builder.run(f64::NEG_INFINITY).unwrap();
        assert!(result.edges.is_empty());
        assert!(result.curved_edges.is_empty());
    }

    #[test]
    fn point_and_segment_leave_an_open_curved_breakpoint() {
        let mut builder = GvdBuilder::new();
        builder
            .add_segment(0, Vec2::new(-5.0, 10.0), Vec2::new(-5.0, -10.0))
            .unwrap();
        builder.add_point(1, Vec2::new(5.0, 10.0));

        let result = builder.run(f64::NEG_INFINITY).unwrap();
        assert_eq!(result.stats.site_events_processed, 2);
        assert!(result.edges.is_empty());
        assert!(result.curved_edges.is_empty());
        assert!(!result.b_curved_edges.is_empty() || !result.b_edges.is_empty());
    }
}
