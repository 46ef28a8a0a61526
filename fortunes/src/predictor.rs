//! Close-event prediction (§4.5): given three consecutive arcs, decide
//! whether and where the middle one will disappear from the beachline.

use crate::arc::ArcKind;
use crate::beachline::Beachline;
use crate::error::GvdResult;
use crate::event::CloseEvent;
use crate::geometry::{
    bisect_line_line, bisect_point_line, bisect_point_point, cross, distance, intersect_bisectors,
    is_right_of_line, Vec2,
};
use crate::tolerances::Tolerances;

/// Predicts the close event for the arc at `middle`, given its immediate
/// neighbors `left`/`right`, at sweep position `directrix`. Returns `None`
/// when no valid, forward (y <= directrix) vertex exists.
pub fn predict(
    bl: &Beachline,
    left: crate::arc::ArcId,
    middle: crate::arc::ArcId,
    right: crate::arc::ArcId,
    directrix: f64,
    tol: &Tolerances,
) -> GvdResult<Option<CloseEvent>> {
    let l = *bl.arc(left);
    let m = *bl.arc(middle);
    let r = *bl.arc(right);

    if l.label() == r.label() {
        return Ok(None);
    }

    // §4.5 step 1: three point sites go through the circumcenter directly,
    // rejected outright when the triple can't converge downward.
    if let (ArcKind::Para(a), ArcKind::Para(b), ArcKind::Para(c)) = (l, m, r) {
        if cross(a.point - b.point, a.point - c.point) >= 0.0 {
            return Ok(None);
        }
        let Some(center) = circumcenter(a.point, b.point, c.point) else {
            return Ok(None);
        };
        let radius = distance(center, b.point);
        return Ok(Some(CloseEvent {
            yval: center.y() - radius,
            arc: middle,
            point: center,
        }));
    }

    let b_lm = bisector_of(l, m);
    let b_mr = bisector_of(m, r);
    let candidates = intersect_bisectors(&b_lm, &b_mr);
    let candidates = filter_visible_points(&candidates, l, m, r, tol);
    let candidates = filter_by_site_association(&candidates, l, m, r, tol);

    if candidates.is_empty() {
        return Ok(None);
    }

    // §4.5 steps 3/4: validate via the breakpoints the candidate implies at
    // y' = candidate.y - radius, accepting only the candidate (or, among
    // several, the minimum-diff candidate) whose diff clears the tolerance.
    let mut best: Option<(f64, Vec2, f64)> = None;
    for candidate in candidates {
        let radius = get_radius(candidate, m);
        let Some(diff) = diff_for_candidate(bl, left, middle, right, candidate, m, radius, directrix, tol) else {
            continue;
        };
        if best.as_ref().map_or(true, |&(best_diff, _, _)| diff < best_diff) {
            best = Some((diff, candidate, radius));
        }
    }

    let Some((diff, point, radius)) = best else {
        return Ok(None);
    };
    if diff >= tol.diff_acceptance {
        return Ok(None);
    }

    Ok(Some(CloseEvent {
        yval: point.y() - radius,
        arc: middle,
        point,
    }))
}

/// §4.5 steps 3/4's acceptance gate: the breakpoints `getIntercept` computes
/// for the (left,mid) and (mid,right) pairs at `y' = candidate.y - radius`
/// should coincide with `candidate`; `diff` is the worse of the two L¹
/// distances. `None` when `y'` is still ahead of the sweep, when either
/// breakpoint can't be computed, or (for a V mid-arc) when the two
/// breakpoints don't straddle the segment on opposite sides.
fn diff_for_candidate(
    bl: &Beachline,
    left: crate::arc::ArcId,
    middle: crate::arc::ArcId,
    right: crate::arc::ArcId,
    candidate: Vec2,
    mid: ArcKind,
    radius: f64,
    directrix: f64,
    tol: &Tolerances,
) -> Option<f64> {
    let y_prime = candidate.y() - radius;
    if y_prime > directrix + tol.directrix_slack {
        return None;
    }

    let left_bp = bl.get_intercept(left, middle, y_prime, tol).ok()?;
    let right_bp = bl.get_intercept(middle, right, y_prime, tol).ok()?;

    if let ArcKind::V(seg) = mid {
        let first_side = is_right_of_line(seg.a, seg.b, left_bp);
        let second_side = is_right_of_line(seg.a, seg.b, right_bp);
        if first_side == second_side {
            return None;
        }
    }

    let l1 = |p: Vec2, q: Vec2| (p.x() - q.x()).abs() + (p.y() - q.y()).abs();
    Some(l1(candidate, left_bp).max(l1(candidate, right_bp)))
}

fn bisector_of(a: ArcKind, b: ArcKind) -> crate::geometry::Bisector {
    match (a, b) {
        (ArcKind::Para(p), ArcKind::Para(q)) => bisect_point_point(p.point, q.point),
        (ArcKind::Para(p), ArcKind::V(s)) | (ArcKind::V(s), ArcKind::Para(p)) => {
            bisect_point_line(p.point, s.a, s.b)
        }
        (ArcKind::V(s1), ArcKind::V(s2)) => bisect_line_line(s1.a, s1.b, s2.a, s2.b),
    }
}

/// The circumcenter of three point sites, rejecting near-colinear triples.
fn circumcenter(a: Vec2, b: Vec2, c: Vec2) -> Option<Vec2> {
    let d = 2.0 * (a.x() * (b.y() - c.y()) + b.x() * (c.y() - a.y()) + c.x() * (a.y() - b.y()));
    if d.abs() < f64::EPSILON {
        return None;
    }
    let a2 = a.x() * a.x() + a.y() * a.y();
    let b2 = b.x() * b.x() + b.y() * b.y();
    let c2 = c.x() * c.x() + c.y() * c.y();
    let ux = (a2 * (b.y() - c.y()) + b2 * (c.y() - a.y()) + c2 * (a.y() - b.y())) / d;
    let uy = (a2 * (c.x() - b.x()) + b2 * (a.x() - c.x()) + c2 * (b.x() - a.x())) / d;
    Some(Vec2::new(ux, uy))
}

/// Drops candidates that fall on the wrong side of the left/right sites,
/// i.e. would not actually be visible on the beachline's middle arc (§4.5).
fn filter_visible_points(
    candidates: &[Vec2],
    l: ArcKind,
    _m: ArcKind,
    r: ArcKind,
    tol: &Tolerances,
) -> Vec<Vec2> {
    candidates
        .iter()
        .copied()
        .filter(|&p| {
            let (lu, ll) = site_endpoints(l);
            let (ru, rl) = site_endpoints(r);
            get_diff(p, lu, ll, tol) && get_diff(p, ru, rl, tol)
        })
        .collect()
}

fn site_endpoints(k: ArcKind) -> (Vec2, Vec2) {
    match k {
        ArcKind::Para(p) => (p.point, p.point),
        ArcKind::V(s) => (s.a, s.b),
    }
}

/// True when `p` sits on the side of the directed line `upper -> lower` that
/// keeps it a valid witness for this site (or the site degenerates to a
/// point, which has no side restriction).
fn get_diff(p: Vec2, upper: Vec2, lower: Vec2, tol: &Tolerances) -> bool {
    if upper == lower {
        return true;
    }
    let side = cross(lower - upper, p - upper);
    side <= tol.diff_acceptance * distance(upper, lower).max(1.0)
}

/// Drops candidates that are equidistant in formula only, but whose nearest
/// point on a segment site actually falls beyond its endpoints (§4.5).
fn filter_by_site_association(
    candidates: &[Vec2],
    l: ArcKind,
    _m: ArcKind,
    r: ArcKind,
    tol: &Tolerances,
) -> Vec<Vec2> {
    candidates
        .iter()
        .copied()
        .filter(|&p| within_segment_span(p, l, tol) && within_segment_span(p, r, tol))
        .collect()
}

fn within_segment_span(p: Vec2, k: ArcKind, tol: &Tolerances) -> bool {
    let ArcKind::V(s) = k else { return true };
    let dir = s.b - s.a;
    let len2 = dir.x() * dir.x() + dir.y() * dir.y();
    if len2 == 0.0 {
        return true;
    }
    let t = ((p.x() - s.a.x()) * dir.x() + (p.y() - s.a.y()) * dir.y()) / len2;
    t >= -tol.consolidation && t <= 1.0 + tol.consolidation
}

/// Distance from `p` to the site `m` traces (its defining circle's radius).
fn get_radius(p: Vec2, m: ArcKind) -> f64 {
    match m {
        ArcKind::Para(pt) => distance(p, pt.point),
        ArcKind::V(s) => {
            let dir = s.b - s.a;
            let len = (dir.x() * dir.x() + dir.y() * dir.y()).sqrt();
            if len == 0.0 {
                distance(p, s.a)
            } else {
                (cross(dir, p - s.a) / len).abs()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PointSite;

    #[test]
    fn circumcenter_of_right_triangle_points() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        let c = Vec2::new(0.0, 4.0);
        let center = circumcenter(a, b, c).unwrap();
        assert!((center.x() - 2.0).abs() < 1e-9);
        assert!((center.y() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn circumcenter_rejects_colinear_points() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 1.0);
        let c = Vec2::new(2.0, 2.0);
        assert!(circumcenter(a, b, c).is_none());
    }

    #[test]
    fn predict_returns_none_when_outer_arcs_share_label() {
        let mut bl = Beachline::new();
        let tol = Tolerances::default();
        let p1 = PointSite::new(0, Vec2::new(-5.0, 10.0));
        let p2 = PointSite::new(1, Vec2::new(5.0, 10.0));
        let p3 = PointSite::new(0, Vec2::new(0.0, 5.0));

        bl.insert(&crate::event::EventPacket::single(crate::event::SiteEvent::Point(p1)), &tol)
            .unwrap();
        bl.insert(&crate::event::EventPacket::single(crate::event::SiteEvent::Point(p2)), &tol)
            .unwrap();
        let outcome = bl
            .insert(&crate::event::EventPacket::single(crate::event::SiteEvent::Point(p3)), &tol)
            .unwrap();

        let middle = outcome
            .recheck
            .iter()
            .find(|&&id| bl.arc(id).label() == 0 && bl.prev_arc(id).is_some() && bl.next_arc(id).is_some())
            .copied();

        if let Some(middle) = middle {
            let left = bl.prev_arc(middle).unwrap();
            let right = bl.next_arc(middle).unwrap();
            let result = predict(&bl, left, middle, right, 5.0, &tol).unwrap();
            assert!(result.is_none());
        }
    }
}
