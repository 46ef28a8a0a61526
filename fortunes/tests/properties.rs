//! Invariant-style checks (§8): properties that should hold regardless of
//! the specific site configuration, rather than a single golden answer.

use fortunes::geometry::{
    create_parabola, pp_intersect, quadratic_roots, vv_intersect, PointSite, SegmentSite, Vec2,
};
use fortunes::GvdBuilder;

#[test]
fn pp_intersect_of_distinct_parabolas_has_exactly_two_roots() {
    let p1 = create_parabola(Vec2::new(0.0, 100.0), 0.0).unwrap();
    let p2 = create_parabola(Vec2::new(40.0, 60.0), 0.0).unwrap();
    let pts = pp_intersect(p1.h, p1.k, p1.p, p2.h, p2.k, p2.p);
    assert_eq!(pts.len(), 2);
}

#[test]
fn quadratic_roots_handles_the_degenerate_linear_case() {
    assert_eq!(quadratic_roots(0.0, 0.0, 5.0), Vec::<f64>::new());
    assert_eq!(quadratic_roots(0.0, 0.0, 0.0), Vec::<f64>::new());
}

#[test]
fn intersecting_v_arcs_are_symmetric_under_argument_swap() {
    let seg_a = SegmentSite::new(0, Vec2::new(-10.0, 50.0), Vec2::new(-10.0, -50.0)).unwrap();
    let seg_b = SegmentSite::new(1, Vec2::new(10.0, 50.0), Vec2::new(10.0, -50.0)).unwrap();

    let va = fortunes::geometry::create_v(seg_a.a, seg_a.b, 0.0).unwrap();
    let vb = fortunes::geometry::create_v(seg_b.a, seg_b.b, 0.0).unwrap();

    let mut forward = vv_intersect(&va, &vb);
    let mut backward = vv_intersect(&vb, &va);
    forward.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap());
    backward.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap());
    assert_eq!(forward.len(), backward.len());
}

#[test]
fn every_committed_edge_endpoint_is_finite() {
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(10.0, 400.0))
        .add_point(1, Vec2::new(200.0, 100.0))
        .add_point(2, Vec2::new(390.0, 400.0))
        .add_point(3, Vec2::new(200.0, 700.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    for edge in &result.edges {
        assert!(edge.start.x().is_finite() && edge.start.y().is_finite());
        assert!(edge.end.x().is_finite() && edge.end.y().is_finite());
    }
}

#[test]
fn four_cocircular_points_still_fully_resolve() {
    // A square: every Voronoi vertex candidate from any consecutive triple
    // is the same center point, exercising the diff/consolidation logic
    // rather than leaving dangling unresolved arcs.
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(0.0, 0.0))
        .add_point(1, Vec2::new(100.0, 0.0))
        .add_point(2, Vec2::new(100.0, 100.0))
        .add_point(3, Vec2::new(0.0, 100.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(!result.edges.is_empty());
    assert_eq!(result.stats.site_events_processed, 4);
}

#[test]
fn point_site_construction_is_label_preserving() {
    let p = PointSite::new(42, Vec2::new(1.0, 2.0));
    assert_eq!(p.label, 42);
}

#[test]
fn segment_packet_atomicity_for_a_polygon_vertex() {
    // A point site coincident with the shared upper endpoint of two
    // segments (a polygon vertex) must insert as a single atomic packet,
    // not three independent events racing each other.
    let shared = Vec2::new(0.0, 100.0);
    let mut b = GvdBuilder::new();
    b.add_point(0, shared);
    b.add_segment(1, shared, Vec2::new(-50.0, 0.0)).unwrap();
    b.add_segment(2, shared, Vec2::new(50.0, 0.0)).unwrap();

    let result = b.run(f64::NEG_INFINITY).unwrap();
    assert_eq!(result.stats.site_events_processed, 1);
}
