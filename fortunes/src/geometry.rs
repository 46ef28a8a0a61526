//! The geometric kernel: vectors, sites, parabolic/V-shaped arcs, and the
//! intersection and sampling primitives the beachline and predictor build on.

use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

use ordered_float::OrderedFloat;

use crate::error::{GvdError, GvdResult};
use crate::tolerances::Tolerances;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Vec2 {
    pub x: OrderedFloat<f64>,
    pub y: OrderedFloat<f64>,
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x.into_inner(), self.y.into_inner())
    }
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: OrderedFloat(x),
            y: OrderedFloat(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x.into_inner()
    }

    pub fn y(&self) -> f64 {
        self.y.into_inner()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        Vec2::new(self.x() + other.x(), self.y() + other.y())
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        Vec2::new(self.x() - other.x(), self.y() - other.y())
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Vec2::new(self.x() * rhs, self.y() * rhs)
    }
}

pub fn dot(a: Vec2, b: Vec2) -> f64 {
    a.x() * b.x() + a.y() * b.y()
}

pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x() * b.y() - a.y() * b.x()
}

pub fn length(v: Vec2) -> f64 {
    dot(v, v).sqrt()
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    length(a - b)
}

pub fn normalize(v: Vec2) -> Vec2 {
    let len = length(v);
    if len == 0.0 {
        v
    } else {
        v * (1.0 / len)
    }
}

pub fn equiv(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() < f64::EPSILON * a.abs().min(b.abs()).max(1.0)
}

pub fn equiv2(a: Vec2, b: Vec2) -> bool {
    equiv(a.x(), b.x()) && equiv(a.y(), b.y())
}

/// A labeled point site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PointSite {
    pub label: i64,
    pub point: Vec2,
}

impl PointSite {
    pub fn new(label: i64, point: Vec2) -> Self {
        Self { label, point }
    }
}

/// A labeled open line segment site. Invariant: `a.y > b.y` strictly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentSite {
    pub label: i64,
    pub a: Vec2,
    pub b: Vec2,
}

impl SegmentSite {
    pub fn new(label: i64, a: Vec2, b: Vec2) -> GvdResult<Self> {
        if a.y == b.y {
            return Err(GvdError::HorizontalSegment { a, b });
        }
        if a.y > b.y {
            Ok(Self { label, a, b })
        } else {
            Ok(Self { label, a: b, b: a })
        }
    }
}

/// A line through two points, stored as a point and a unit direction vector.
#[derive(Copy, Clone, Debug)]
pub struct Line {
    pub p: Vec2,
    pub dir: Vec2,
}

impl Line {
    pub fn through(a: Vec2, b: Vec2) -> Self {
        Self {
            p: a,
            dir: normalize(b - a),
        }
    }

    pub fn horizontal(y: f64) -> Self {
        Self {
            p: Vec2::new(0.0, y),
            dir: Vec2::new(1.0, 0.0),
        }
    }
}

/// y = (x - h)^2 / (4p) + k, with p = (focus.y - directrix) / 2.
#[derive(Copy, Clone, Debug)]
pub struct Parabola {
    pub focus: Vec2,
    pub directrix: f64,
    pub h: f64,
    pub k: f64,
    pub p: f64,
}

pub fn create_parabola(focus: Vec2, directrix: f64) -> GvdResult<Parabola> {
    if focus.y() <= directrix {
        return Err(GvdError::NoIntercept {
            context: "createParabola: focus at or below directrix",
        });
    }
    let p = (focus.y() - directrix) / 2.0;
    let k = (focus.y() + directrix) / 2.0;
    Ok(Parabola {
        focus,
        directrix,
        h: focus.x(),
        k,
        p,
    })
}

pub fn parabola_f(x: f64, h: f64, k: f64, p: f64) -> f64 {
    let dx = x - h;
    dx * dx / (4.0 * p) + k
}

/// The point on the arc traced by `focus` at the given sweep position and x.
pub fn point_on_arc_at_x(focus: Vec2, directrix: f64, x: f64) -> Vec2 {
    let dy = focus.y() - directrix;
    if dy == 0.0 {
        Vec2::new((focus.x() + x) / 2.0, directrix)
    } else {
        let dx = x - focus.x();
        Vec2::new(x, dx * dx / (2.0 * dy) + (focus.y() + directrix) / 2.0)
    }
}

/// The V-shaped locus equidistant from the (extended) segment [a,b] and the
/// directrix, restricted to the upper half-plane. Stored as an apex and two
/// ray directions, both normalized with non-negative y-component.
#[derive(Copy, Clone, Debug)]
pub struct VArc {
    pub a: Vec2,
    pub b: Vec2,
    pub apex: Vec2,
    pub dir1: Vec2,
    pub dir2: Vec2,
}

pub fn create_v(a: Vec2, b: Vec2, directrix: f64) -> GvdResult<VArc> {
    let d = b - a;
    if d.y() == 0.0 {
        return Err(GvdError::HorizontalSegment { a, b });
    }
    let t = (directrix - a.y()) / d.y();
    let apex = Vec2::new(a.x() + t * d.x(), directrix);

    let n = normalize(Vec2::new(-d.y(), d.x()));

    let mut dir1 = Vec2::new(1.0 - n.y(), n.x());
    if dir1.y() < 0.0 {
        dir1 = dir1 * -1.0;
    }
    let mut dir2 = Vec2::new(1.0 + n.y(), -n.x());
    if dir2.y() < 0.0 {
        dir2 = dir2 * -1.0;
    }

    Ok(VArc {
        a,
        b,
        apex,
        dir1: normalize(dir1),
        dir2: normalize(dir2),
    })
}

/// Value of the V-arc's upper envelope at a given x (max of the two rays'
/// y at that x, mirroring a parabola's single-valued `f_x`).
pub fn v_f(v: &VArc, x: f64) -> Option<f64> {
    let y1 = ray_y_at_x(v.apex, v.dir1, x);
    let y2 = ray_y_at_x(v.apex, v.dir2, x);
    match (y1, y2) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn ray_y_at_x(origin: Vec2, dir: Vec2, x: f64) -> Option<f64> {
    if dir.x() == 0.0 {
        return None;
    }
    let t = (x - origin.x()) / dir.x();
    if t < 0.0 {
        return None;
    }
    Some(origin.y() + t * dir.y())
}

/// Real roots of `a*x^2 + b*x + c = 0`.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return vec![];
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return vec![];
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    let sq = discriminant.sqrt();
    vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
}

/// Intersection of two infinite lines, each given as point + direction.
/// `None` for parallel lines.
pub fn intersect_lines(l1: Line, l2: Line) -> Option<Vec2> {
    let det = cross(l1.dir, l2.dir);
    if det == 0.0 {
        return None;
    }
    let diff = l2.p - l1.p;
    let t = cross(diff, l2.dir) / det;
    Some(l1.p + l1.dir * t)
}

/// Intersection of a ray (t >= 0) with an infinite line.
pub fn intersect_ray_line(origin: Vec2, dir: Vec2, line: Line) -> Option<Vec2> {
    let det = cross(dir, line.dir);
    if det == 0.0 {
        return None;
    }
    let diff = line.p - origin;
    let t = cross(diff, line.dir) / det;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

/// All x-values where two parabolas (sharing a directrix, but expressed via
/// their own (h, k, p)) coincide.
pub fn pp_intersect(h1: f64, k1: f64, p1: f64, h2: f64, k2: f64, p2: f64) -> Vec<Vec2> {
    let a = 1.0 / (4.0 * p1) - 1.0 / (4.0 * p2);
    let b = -h1 / (2.0 * p1) + h2 / (2.0 * p2);
    let c = (h1 * h1) / (4.0 * p1) + k1 - (h2 * h2) / (4.0 * p2) - k2;

    quadratic_roots(a, b, c)
        .into_iter()
        .map(|x| Vec2::new(x, parabola_f(x, h1, k1, p1)))
        .collect()
}

/// All real intersections between the (up to) four rays of two V-arcs.
pub fn vv_intersect(l: &VArc, r: &VArc) -> Vec<Vec2> {
    let mut out = vec![];
    for ld in [l.dir1, l.dir2] {
        for rd in [r.dir1, r.dir2] {
            if let Some(p) = intersect_two_rays(l.apex, ld, r.apex, rd) {
                out.push(p);
            }
        }
    }
    out
}

fn intersect_two_rays(o1: Vec2, d1: Vec2, o2: Vec2, d2: Vec2) -> Option<Vec2> {
    let det = cross(d1, d2);
    if det == 0.0 {
        return None;
    }
    let diff = o2 - o1;
    let t1 = cross(diff, d2) / det;
    let t2 = cross(diff, d1) / det;
    if t1 < 0.0 || t2 < 0.0 {
        return None;
    }
    Some(o1 + d1 * t1)
}

/// Intersections of a V-arc's rays with a parabola, restricted to t >= 0 on the ray.
pub fn vp_intersect(v: &VArc, p: &Parabola) -> Vec<Vec2> {
    let mut out = vec![];
    for dir in [v.dir1, v.dir2] {
        out.extend(ray_parabola_intersect(v.apex, dir, p));
    }
    out
}

fn ray_parabola_intersect(origin: Vec2, dir: Vec2, p: &Parabola) -> Vec<Vec2> {
    // x(t) = origin.x + t*dir.x, y(t) = origin.y + t*dir.y
    // y(t) = (x(t) - h)^2 / (4p) + k
    let dx0 = origin.x() - p.h;
    let a = dir.x() * dir.x() / (4.0 * p.p);
    let b = (2.0 * dx0 * dir.x()) / (4.0 * p.p) - dir.y();
    let c = dx0 * dx0 / (4.0 * p.p) + p.k - origin.y();

    quadratic_roots(a, b, c)
        .into_iter()
        .filter(|&t| t >= 0.0)
        .map(|t| origin + dir * t)
        .collect()
}

/// Intersections of a V-arc's rays with an infinite line.
pub fn vb_intersect(v: &VArc, line: Line) -> Vec<Vec2> {
    let mut out = vec![];
    if let Some(p) = intersect_ray_line(v.apex, v.dir1, line) {
        out.push(p);
    }
    if let Some(p) = intersect_ray_line(v.apex, v.dir2, line) {
        out.push(p);
    }
    out
}

/// One of the two kinds of bisector between a pair of sites.
pub enum Bisector {
    Line(Line),
    /// Angle bisector of two non-parallel lines: two perpendicular lines.
    Lines2([Line; 2]),
    Parabola(GeneralParabola),
}

/// A parabola whose axis need not be vertical: focus plus an arbitrary directrix line.
#[derive(Copy, Clone, Debug)]
pub struct GeneralParabola {
    pub focus: Vec2,
    pub directrix: Line,
}

fn signed_distance_to_line(p: Vec2, line: Line) -> f64 {
    cross(line.dir, p - line.p)
}

/// The bisector between two point sites: the full perpendicular bisector line.
pub fn bisect_point_point(a: Vec2, b: Vec2) -> Bisector {
    let mid = (a + b) * 0.5;
    let d = b - a;
    Bisector::Line(Line {
        p: mid,
        dir: normalize(Vec2::new(-d.y(), d.x())),
    })
}

/// The bisector between a point site and the (extended) line through a
/// segment site: a parabola with focus at the point and directrix the line.
pub fn bisect_point_line(focus: Vec2, line_a: Vec2, line_b: Vec2) -> Bisector {
    Bisector::Parabola(GeneralParabola {
        focus,
        directrix: Line::through(line_a, line_b),
    })
}

/// The bisector between the (extended) lines of two segment sites: the two
/// angle bisectors of the lines, which are full lines (no half-plane
/// restriction, unlike the sweep-time V-arc).
pub fn bisect_line_line(a1: Vec2, b1: Vec2, a2: Vec2, b2: Vec2) -> Bisector {
    let l1 = Line::through(a1, b1);
    let l2 = Line::through(a2, b2);
    let Some(isect) = intersect_lines(l1, l2) else {
        let offset = (l1.p - l2.p) * 0.5;
        return Bisector::Line(Line {
            p: l1.p - offset,
            dir: l1.dir,
        });
    };
    let bis1 = normalize(l1.dir + l2.dir);
    let bis2 = normalize(l1.dir - l2.dir);
    Bisector::Lines2([
        Line { p: isect, dir: bis1 },
        Line { p: isect, dir: bis2 },
    ])
}

/// Intersection points between two bisector curves, used by `equidistant`.
pub fn intersect_bisectors(b1: &Bisector, b2: &Bisector) -> Vec<Vec2> {
    match (b1, b2) {
        (Bisector::Line(l1), Bisector::Line(l2)) => intersect_lines(*l1, *l2).into_iter().collect(),
        (Bisector::Line(l), Bisector::Lines2(ls)) | (Bisector::Lines2(ls), Bisector::Line(l)) => {
            ls.iter().filter_map(|l2| intersect_lines(*l, *l2)).collect()
        }
        (Bisector::Lines2(a), Bisector::Lines2(b)) => {
            let mut out = vec![];
            for la in a {
                for lb in b {
                    if let Some(p) = intersect_lines(*la, *lb) {
                        out.push(p);
                    }
                }
            }
            out
        }
        (Bisector::Parabola(p), Bisector::Line(l)) | (Bisector::Line(l), Bisector::Parabola(p)) => {
            parabola_line_intersect(p, *l)
        }
        (Bisector::Parabola(p), Bisector::Lines2(ls)) | (Bisector::Lines2(ls), Bisector::Parabola(p)) => {
            ls.iter().flat_map(|l| parabola_line_intersect(p, *l)).collect()
        }
        (Bisector::Parabola(p1), Bisector::Parabola(p2)) => parabola_parabola_intersect(p1, p2),
    }
}

/// Equidistant-from-point-and-line curve intersected with a line, by rotating
/// into the directrix's own frame (so the directrix is "horizontal" there)
/// and reusing the ray/parabola quadratic.
fn local_frame(directrix: Line) -> (Vec2, Vec2, Vec2) {
    (directrix.p, directrix.dir, Vec2::new(-directrix.dir.y(), directrix.dir.x()))
}

fn to_local_frame(p: Vec2, origin: Vec2, u: Vec2, v: Vec2) -> Vec2 {
    Vec2::new(dot(p - origin, u), dot(p - origin, v))
}

fn from_local_frame(p: Vec2, origin: Vec2, u: Vec2, v: Vec2) -> Vec2 {
    origin + u * p.x() + v * p.y()
}

/// Samples a curved (point-vs-line) bisector between two points already
/// known to lie on it, by rotating into the directrix's own frame.
pub fn sample_bisector(gp: &GeneralParabola, start: Vec2, end: Vec2, samples: usize) -> Vec<Vec2> {
    let (origin, u, v) = local_frame(gp.directrix);
    let focus_local = to_local_frame(gp.focus, origin, u, v);
    let Ok(parab) = create_parabola(focus_local, 0.0) else {
        return vec![start, end];
    };
    let start_local = to_local_frame(start, origin, u, v);
    let end_local = to_local_frame(end, origin, u, v);
    if samples < 2 {
        return vec![start, end];
    }
    (0..samples)
        .map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            let x = start_local.x() + t * (end_local.x() - start_local.x());
            let y = parabola_f(x, parab.h, parab.k, parab.p);
            from_local_frame(Vec2::new(x, y), origin, u, v)
        })
        .collect()
}

fn parabola_line_intersect(gp: &GeneralParabola, line: Line) -> Vec<Vec2> {
    let (origin, u, v) = local_frame(gp.directrix);
    let to_local = |p: Vec2| to_local_frame(p, origin, u, v);
    let from_local = |p: Vec2| from_local_frame(p, origin, u, v);

    let focus_local = to_local(gp.focus);
    let Ok(parab) = create_parabola(focus_local, 0.0) else {
        return vec![];
    };

    let line_origin_local = to_local(line.p);
    let line_dir_local = normalize(to_local(line.p + line.dir) - line_origin_local);

    let dx0 = line_origin_local.x() - parab.h;
    let a = line_dir_local.x() * line_dir_local.x() / (4.0 * parab.p);
    let b = (2.0 * dx0 * line_dir_local.x()) / (4.0 * parab.p) - line_dir_local.y();
    let c = dx0 * dx0 / (4.0 * parab.p) + parab.k - line_origin_local.y();

    quadratic_roots(a, b, c)
        .into_iter()
        .map(|t| from_local(line_origin_local + line_dir_local * t))
        .collect()
}

fn parabola_parabola_intersect(p1: &GeneralParabola, p2: &GeneralParabola) -> Vec<Vec2> {
    // Intersect p1's curve against p2's directrix, keep the points that also
    // satisfy p2's own distance equality, and vice versa; dedupe isn't
    // needed since a true common point will surface from both passes but is
    // accepted by the `equiv` check only once the caller consolidates.
    let mut out = vec![];
    for pt in parabola_line_intersect(p1, p2.directrix) {
        if equiv(distance(pt, p2.focus), signed_distance_to_line(pt, p2.directrix).abs()) {
            out.push(pt);
        }
    }
    for pt in parabola_line_intersect(p2, p1.directrix) {
        if equiv(distance(pt, p1.focus), signed_distance_to_line(pt, p1.directrix).abs()) {
            out.push(pt);
        }
    }
    out
}

/// The side of a directed line `upper -> lower` that `p` falls on.
pub fn is_right_of_line(upper: Vec2, lower: Vec2, p: Vec2) -> bool {
    cross(lower - upper, p - upper) < 0.0
}

/// A polyline sampling of a parabola over [xl, xr].
pub fn prep_draw_parabola(p: &Parabola, xl: f64, xr: f64, samples: usize) -> Vec<Vec2> {
    if xl >= xr || samples < 2 {
        return vec![];
    }
    (0..samples)
        .map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            let x = xl + t * (xr - xl);
            Vec2::new(x, parabola_f(x, p.h, p.k, p.p))
        })
        .collect()
}

/// A polyline sampling of a V-arc over [xl, xr].
pub fn prep_draw_v(v: &VArc, xl: f64, xr: f64, samples: usize) -> Vec<Vec2> {
    if xl >= xr || samples < 2 {
        return vec![];
    }
    (0..samples)
        .filter_map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            let x = xl + t * (xr - xl);
            v_f(v, x).map(|y| Vec2::new(x, y))
        })
        .collect()
}

/// Removes consolidated duplicate candidates straddling `pivot_x`, per §4.2/§4.5:
/// split by side of the pivot, and within each side drop one of a
/// near-coincident pair. Candidates exactly at the pivot are never kept.
pub fn consolidate(points: &[Vec2], pivot_x: f64, tol: &Tolerances) -> Vec<Vec2> {
    let mut left = vec![];
    let mut right = vec![];
    for &p in points {
        if p.x() < pivot_x {
            left.push(p);
        } else if p.x() > pivot_x {
            right.push(p);
        }
    }
    let mut out = vec![];
    consolidate_side(&mut out, &left, tol);
    consolidate_side(&mut out, &right, tol);
    out
}

fn consolidate_side(out: &mut Vec<Vec2>, side: &[Vec2], tol: &Tolerances) {
    match side.len() {
        0 => {}
        1 => out.push(side[0]),
        2 => {
            if distance(side[0], side[1]) < tol.consolidation {
                out.push(side[0]);
            } else {
                out.push(side[0]);
                out.push(side[1]);
            }
        }
        _ => out.extend_from_slice(side),
    }
}
