//! End-to-end sweep scenarios (§8): concrete site configurations with known
//! expected edge counts and, where practical, known geometry.

use fortunes::geometry::Vec2;
use fortunes::GvdBuilder;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn approx_vec2(a: Vec2, b: Vec2) -> bool {
    approx(a.x(), b.x()) && approx(a.y(), b.y())
}

#[test]
fn two_point_sites_alone_never_close_and_leave_one_open_bisector() {
    // Only two arcs ever coexist, so no close event fires; the bisector is
    // only visible via the beachline snapshot at the sweep's stop position.
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(250.0, 500.0))
        .add_point(1, Vec2::new(750.0, 500.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(result.edges.is_empty());
    // Two Para arcs: the live breakpoint is a parabola/parabola intercept,
    // surfaced as a curved beachline run, not a straight ARC_V one.
    assert!(!result.b_curved_edges.is_empty());
}

#[test]
fn two_point_sites_stacked_vertically_also_never_close() {
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(500.0, 250.0))
        .add_point(1, Vec2::new(500.0, 750.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(result.edges.is_empty());
    assert!(!result.b_curved_edges.is_empty());
}

#[test]
fn three_points_form_a_single_voronoi_vertex() {
    // One close event commits exactly the two edges adjacent to the
    // vanishing middle arc; the edge between the two outer arcs stays open.
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(250.0, 250.0))
        .add_point(1, Vec2::new(500.0, 750.0))
        .add_point(2, Vec2::new(750.0, 250.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert_eq!(result.edges.len(), 2);
    assert_eq!(result.stats.close_events_processed, 1);

    let vertex = Vec2::new(500.0, 437.5);
    assert!(result.edges.iter().any(|e| approx_vec2(e.start, vertex) || approx_vec2(e.end, vertex)));
}

#[test]
fn colinear_points_never_predict_a_close_event() {
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(100.0, 100.0))
        .add_point(1, Vec2::new(200.0, 200.0))
        .add_point(2, Vec2::new(300.0, 300.0));
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert_eq!(result.stats.close_events_processed, 0);
    assert_eq!(result.edges.len(), 0);
}

#[test]
fn a_single_segment_site_alone_produces_no_edges() {
    let mut b = GvdBuilder::new();
    b.add_segment(0, Vec2::new(0.0, 50.0), Vec2::new(0.0, -50.0)).unwrap();
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(result.edges.is_empty());
    assert!(result.curved_edges.is_empty());
    assert_eq!(result.stats.beachline_v_count, 1);
}

#[test]
fn segment_endpoints_must_not_be_horizontal() {
    let mut b = GvdBuilder::new();
    let err = b.add_segment(0, Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0));
    assert!(err.is_err());
}

#[test]
fn two_parallel_segment_sites_alone_leave_an_open_straight_bisector() {
    let mut b = GvdBuilder::new();
    b.add_segment(0, Vec2::new(-50.0, 100.0), Vec2::new(-50.0, -100.0))
        .unwrap();
    b.add_segment(1, Vec2::new(50.0, 100.0), Vec2::new(50.0, -100.0))
        .unwrap();
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(result.edges.is_empty());
    assert!(!result.b_curved_edges.is_empty() || !result.b_edges.is_empty());
}

#[test]
fn three_segment_sites_around_a_triangle_commit_real_edges() {
    let mut b = GvdBuilder::new();
    b.add_segment(0, Vec2::new(-100.0, 100.0), Vec2::new(-100.0, -100.0))
        .unwrap();
    b.add_segment(1, Vec2::new(100.0, 100.0), Vec2::new(100.0, -100.0))
        .unwrap();
    b.add_segment(2, Vec2::new(0.0, -150.0), Vec2::new(0.0, -300.0))
        .unwrap();
    let result = b.run(f64::NEG_INFINITY).unwrap();

    assert!(result.stats.close_events_processed >= 1);
    assert!(!result.edges.is_empty());
}

#[test]
fn point_flanked_by_two_segments_produces_curved_edges() {
    let mut b = GvdBuilder::new();
    b.add_segment(0, Vec2::new(-100.0, 200.0), Vec2::new(-100.0, -200.0))
        .unwrap();
    b.add_point(1, Vec2::new(0.0, 150.0));
    b.add_segment(2, Vec2::new(100.0, 200.0), Vec2::new(100.0, -200.0))
        .unwrap();

    let result = b.run(f64::NEG_INFINITY).unwrap();
    assert!(result.stats.close_events_processed >= 1);
    assert!(!result.curved_edges.is_empty());
}

fn triangle_builder() -> GvdBuilder {
    // circumcenter (500, 437.5), circumradius 312.5, so the close event for
    // the middle arc fires at y = 437.5 - 312.5 = 125.
    let mut b = GvdBuilder::new();
    b.add_point(0, Vec2::new(250.0, 250.0))
        .add_point(1, Vec2::new(500.0, 750.0))
        .add_point(2, Vec2::new(750.0, 250.0));
    b
}

#[test]
fn stop_y_above_every_site_yields_an_empty_beachline() {
    let result = triangle_builder().run(1000.0).unwrap();

    assert_eq!(result.stats.site_events_processed, 0);
    assert!(result.edges.is_empty());
    assert!(result.b_edges.is_empty());
    assert!(result.b_curved_edges.is_empty());
    assert!(result.b_close_events.is_empty());
}

#[test]
fn stop_y_before_the_close_event_leaves_it_pending() {
    // 130 is below both point sites' y (250, 750) but above the close
    // event's y=125, so every site is consumed but the close event never
    // fires: it must survive into `b_close_events` instead of `edges`.
    let result = triangle_builder().run(130.0).unwrap();

    assert_eq!(result.stats.site_events_processed, 3);
    assert_eq!(result.stats.close_events_processed, 0);
    assert!(result.edges.is_empty());
    assert_eq!(result.b_close_events.len(), 1);
    assert!((result.b_close_events[0].yval - 125.0).abs() < 1e-6);
}

#[test]
fn stop_y_after_the_close_event_commits_it() {
    let result = triangle_builder().run(100.0).unwrap();

    assert_eq!(result.stats.close_events_processed, 1);
    assert_eq!(result.edges.len(), 2);
    assert!(result.b_close_events.is_empty());
}
