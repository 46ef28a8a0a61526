//! Exercises `fortunes` against a few hard-coded site sets and prints the
//! resulting edges. Not a rendering tool; a thin driver for eyeballing the
//! sweep's output from the command line.

use fortunes::geometry::Vec2;
use fortunes::GvdBuilder;

fn main() {
    stderrlog::new()
        .module(module_path!())
        .verbosity(log::LevelFilter::Info)
        .init()
        .expect("logger already initialized");

    run_points();
    run_mixed_sites();
}

fn run_points() {
    log::info!("three point sites");
    let mut builder = GvdBuilder::new();
    builder
        .add_point(0, Vec2::new(250.0, 250.0))
        .add_point(1, Vec2::new(500.0, 750.0))
        .add_point(2, Vec2::new(750.0, 250.0));

    // Stop above the triangle's Voronoi vertex (y=125) on purpose, so this
    // run shows the close event still pending instead of committed.
    match builder.run(200.0) {
        Ok(result) => {
            log::info!(
                "{} straight edges, {} curved edges, {} pending close events, {} site events, {} close events",
                result.edges.len(),
                result.curved_edges.len(),
                result.b_close_events.len(),
                result.stats.site_events_processed,
                result.stats.close_events_processed,
            );
            for edge in &result.edges {
                println!("{:?} -> {:?}", edge.start, edge.end);
            }
        }
        Err(err) => log::error!("sweep failed: {err}"),
    }
}

fn run_mixed_sites() {
    log::info!("point site opposite a segment site");
    let mut builder = GvdBuilder::new();
    if let Err(err) = builder.add_segment(0, Vec2::new(-100.0, 200.0), Vec2::new(-100.0, -200.0)) {
        log::error!("rejected segment site: {err}");
        return;
    }
    builder.add_point(1, Vec2::new(100.0, 150.0));

    match builder.run(f64::NEG_INFINITY) {
        Ok(result) => {
            for edge in &result.edges {
                println!("line {:?} -> {:?}", edge.start, edge.end);
            }
            for curve in &result.curved_edges {
                println!("curve with {} samples", curve.points.len());
            }
        }
        Err(err) => log::error!("sweep failed: {err}"),
    }
}
