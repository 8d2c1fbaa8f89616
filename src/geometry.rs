use std::f64::consts::{FRAC_PI_2, PI};

use tiny_skia::{Path, PathBuilder};

use crate::path::{ArcSize, EllipticalArc, PathToken, Position, SweepDirection};
use crate::types::{Point, Transform};

/// Drawing primitive in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    MoveTo(Point),
    LineTo(Point),
    CubicTo {
        c1: Point,
        c2: Point,
        to: Point,
    },
    QuadTo {
        c: Point,
        to: Point,
    },
    /// Circular arc of `radius` about the origin, mapped through `transform`.
    /// Angles are radians; a positive sweep runs counterclockwise.
    Arc {
        transform: Transform,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
        end: Point,
    },
    Close,
}

impl DrawOp {
    /// Point the pen rests on after this op. `None` for `Close`, which depends on the subpath.
    pub fn end(&self) -> Option<Point> {
        match self {
            DrawOp::MoveTo(p) | DrawOp::LineTo(p) => Some(*p),
            DrawOp::CubicTo { to, .. } | DrawOp::QuadTo { to, .. } => Some(*to),
            DrawOp::Arc { end, .. } => Some(*end),
            DrawOp::Close => None,
        }
    }
}

/// Compile path tokens into absolute drawing primitives. `Bad` tokens are skipped.
pub fn compile_path_tokens(tokens: &[PathToken]) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(tokens.len());
    let mut current = Point::ORIGIN;
    let mut subpath_start = Point::ORIGIN;
    let mut last_cubic_c2: Option<Point> = None;
    let mut last_quad_c: Option<Point> = None;

    for token in tokens {
        let base = match token.position() {
            Some(Position::Relative) => current,
            _ => Point::ORIGIN,
        };
        let abs = |p: Point| p.offset(base.x, base.y);
        let mut cubic_c2 = None;
        let mut quad_c = None;

        match token {
            PathToken::MoveTo { to, .. } => {
                let to = abs(*to);
                ops.push(DrawOp::MoveTo(to));
                subpath_start = to;
                current = to;
            }
            PathToken::LineTo { to, .. } => {
                current = abs(*to);
                ops.push(DrawOp::LineTo(current));
            }
            PathToken::HorizontalLineTo { x, .. } => {
                current = Point::new(base.x + x, current.y);
                ops.push(DrawOp::LineTo(current));
            }
            PathToken::VerticalLineTo { y, .. } => {
                current = Point::new(current.x, base.y + y);
                ops.push(DrawOp::LineTo(current));
            }
            PathToken::CubicTo { c1, c2, to, .. } => {
                let c2 = abs(*c2);
                let to = abs(*to);
                ops.push(DrawOp::CubicTo { c1: abs(*c1), c2, to });
                cubic_c2 = Some(c2);
                current = to;
            }
            PathToken::SmoothCubicTo { c2, to, .. } => {
                let c1 = last_cubic_c2
                    .map(|prev| prev.reflect_about(current))
                    .unwrap_or(current);
                let c2 = abs(*c2);
                let to = abs(*to);
                ops.push(DrawOp::CubicTo { c1, c2, to });
                cubic_c2 = Some(c2);
                current = to;
            }
            PathToken::QuadraticTo { c, to, .. } => {
                let c = abs(*c);
                let to = abs(*to);
                ops.push(DrawOp::QuadTo { c, to });
                quad_c = Some(c);
                current = to;
            }
            PathToken::SmoothQuadraticTo { to, .. } => {
                let c = last_quad_c
                    .map(|prev| prev.reflect_about(current))
                    .unwrap_or(current);
                let to = abs(*to);
                ops.push(DrawOp::QuadTo { c, to });
                quad_c = Some(c);
                current = to;
            }
            PathToken::ArcTo { arc, .. } => {
                let to = abs(arc.to);
                if let Some(op) = arc_to_draw_op(current, &EllipticalArc { to, ..*arc }) {
                    ops.push(op);
                }
                current = to;
            }
            PathToken::Close => {
                ops.push(DrawOp::Close);
                current = subpath_start;
            }
            PathToken::Bad(_) => continue,
        }

        last_cubic_c2 = cubic_c2;
        last_quad_c = quad_c;
    }

    ops
}

// Applied when rounding leaves the scaled radii fractionally too small.
const RADII_EPSILON: f64 = 1e-10;

fn vector_angle(u: Point, v: Point) -> f64 {
    let dot = u.x * v.x + u.y * v.y;
    let cross = u.x * v.y - u.y * v.x;
    libm::atan2(cross, dot)
}

/// Endpoint-to-center conversion of an SVG elliptical arc starting at `from`.
///
/// Returns `None` when the endpoints coincide and a line when either radius is zero.
/// Otherwise the arc is a circle of radius `max(rx, ry)` drawn through a transform
/// that translates to the center, rotates by the tilt and scales the circle back
/// into the ellipse.
pub fn arc_to_draw_op(from: Point, arc: &EllipticalArc) -> Option<DrawOp> {
    let to = arc.to;
    if from == to {
        return None;
    }
    let mut rx = arc.rx.abs();
    let mut ry = arc.ry.abs();
    if rx == 0.0 || ry == 0.0 {
        return Some(DrawOp::LineTo(to));
    }

    let phi = arc.tilt_degrees.to_radians();
    let sin_phi = libm::sin(phi);
    let cos_phi = libm::cos(phi);

    // Half-chord in the unrotated frame.
    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;
    let x1p2 = x1p * x1p;
    let y1p2 = y1p * y1p;

    let ratio = |rx: f64, ry: f64| x1p2 / (rx * rx) + y1p2 / (ry * ry);
    let lambda = ratio(rx, ry);
    if lambda > 1.0 {
        let s = libm::sqrt(lambda);
        rx *= s;
        ry *= s;
        let remaining = ratio(rx, ry);
        if remaining > 1.0 {
            let s = libm::sqrt(remaining) + RADII_EPSILON;
            rx *= s;
            ry *= s;
        }
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p2 - ry2 * x1p2;
    let den = rx2 * y1p2 + ry2 * x1p2;
    let large = arc.size == ArcSize::Large;
    let counterclockwise = arc.sweep == SweepDirection::Counterclockwise;
    let sign = if large == counterclockwise { -1.0 } else { 1.0 };
    let root = libm::sqrt(num / den);
    let coef = sign * if root.is_nan() { 0.0 } else { root };
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let center = Point::new(
        cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
        sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
    );

    let u = Point::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = Point::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let start_angle = vector_angle(Point::new(1.0, 0.0), u);
    let mut sweep_angle = vector_angle(u, v);
    if !counterclockwise && sweep_angle > 0.0 {
        sweep_angle -= 2.0 * PI;
    } else if counterclockwise && sweep_angle < 0.0 {
        sweep_angle += 2.0 * PI;
    }

    let radius = rx.max(ry);
    let transform = Transform::translate(center.x, center.y)
        .concat(Transform::rotate_radians(phi))
        .concat(Transform::scale(rx / radius, ry / radius));

    Some(DrawOp::Arc {
        transform,
        radius,
        start_angle,
        sweep_angle,
        end: to,
    })
}

/// Point at `angle` on an arc primitive's circle, in path coordinates.
pub fn arc_point(transform: Transform, radius: f64, angle: f64) -> Point {
    transform.apply(Point::new(
        radius * libm::cos(angle),
        radius * libm::sin(angle),
    ))
}

// Cubic approximating the circle of `radius` from `t1` to `t2`, mapped through `transform`.
fn arc_segment_to_cubic(transform: Transform, radius: f64, t1: f64, t2: f64) -> [Point; 3] {
    let k = (4.0 / 3.0) * libm::tan((t2 - t1) / 4.0);
    let (s1, c1) = (libm::sin(t1), libm::cos(t1));
    let (s2, c2) = (libm::sin(t2), libm::cos(t2));
    let map = |x: f64, y: f64| transform.apply(Point::new(radius * x, radius * y));
    [
        map(c1 - k * s1, s1 + k * c1),
        map(c2 + k * s2, s2 - k * c2),
        map(c2, s2),
    ]
}

/// Replace every arc with cubics spanning at most `max_sweep` radians each.
///
/// `max_sweep` outside `(0, π/2]` falls back to `π/2`.
pub fn flatten_arcs(ops: &[DrawOp], max_sweep: f64) -> Vec<DrawOp> {
    let max_sweep = if max_sweep > 0.0 && max_sweep <= FRAC_PI_2 {
        max_sweep
    } else {
        FRAC_PI_2
    };
    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        let DrawOp::Arc {
            transform,
            radius,
            start_angle,
            sweep_angle,
            end,
        } = *op
        else {
            out.push(*op);
            continue;
        };
        let count = libm::ceil(sweep_angle.abs() / max_sweep).max(1.0) as usize;
        let delta = sweep_angle / count as f64;
        let mut t1 = start_angle;
        for i in 0..count {
            let t2 = t1 + delta;
            let [c1, c2, mut to] = arc_segment_to_cubic(transform, radius, t1, t2);
            if i + 1 == count {
                to = end;
            }
            out.push(DrawOp::CubicTo { c1, c2, to });
            t1 = t2;
        }
    }
    out
}

/// Where the pen rests after the last op.
pub fn end_point(ops: &[DrawOp]) -> Option<Point> {
    let mut current = None;
    let mut subpath_start = None;
    for op in ops {
        match op {
            DrawOp::MoveTo(p) => {
                subpath_start = Some(*p);
                current = Some(*p);
            }
            DrawOp::Close => current = subpath_start,
            other => current = other.end(),
        }
    }
    current
}

/// Bounding box `(min, max)` of the ops' control hull; arcs are flattened first.
pub fn bounds(ops: &[DrawOp]) -> Option<(Point, Point)> {
    let mut extent: Option<(Point, Point)> = None;
    let mut include = |p: Point| {
        extent = Some(match extent {
            None => (p, p),
            Some((min, max)) => (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            ),
        });
    };
    for op in flatten_arcs(ops, FRAC_PI_2) {
        match op {
            DrawOp::MoveTo(p) | DrawOp::LineTo(p) => include(p),
            DrawOp::CubicTo { c1, c2, to } => {
                include(c1);
                include(c2);
                include(to);
            }
            DrawOp::QuadTo { c, to } => {
                include(c);
                include(to);
            }
            DrawOp::Arc { end, .. } => include(end),
            DrawOp::Close => {}
        }
    }
    extent
}

/// Build a `tiny_skia::Path`. Returns `None` for an empty or degenerate path.
pub fn to_tiny_skia_path(ops: &[DrawOp], max_sweep: f64) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for op in flatten_arcs(ops, max_sweep) {
        match op {
            DrawOp::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            DrawOp::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            DrawOp::CubicTo { c1, c2, to } => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                to.x as f32,
                to.y as f32,
            ),
            DrawOp::QuadTo { c, to } => {
                builder.quad_to(c.x as f32, c.y as f32, to.x as f32, to.y as f32)
            }
            DrawOp::Arc { end, .. } => builder.line_to(end.x as f32, end.y as f32),
            DrawOp::Close => builder.close(),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{parse_svg_path, to_absolute, tokens_to_string};

    fn compile(source: &str) -> Vec<DrawOp> {
        compile_path_tokens(&parse_svg_path(source).expect("parse"))
    }

    fn arc_parts(op: &DrawOp) -> (Transform, f64, f64, f64) {
        match op {
            DrawOp::Arc {
                transform,
                radius,
                start_angle,
                sweep_angle,
                ..
            } => (*transform, *radius, *start_angle, *sweep_angle),
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn horizontal_and_vertical_keep_the_other_coordinate() {
        let ops = compile("M1 2 H5 v3 h-1 V0");
        assert_eq!(
            ops,
            vec![
                DrawOp::MoveTo(Point::new(1.0, 2.0)),
                DrawOp::LineTo(Point::new(5.0, 2.0)),
                DrawOp::LineTo(Point::new(5.0, 5.0)),
                DrawOp::LineTo(Point::new(4.0, 5.0)),
                DrawOp::LineTo(Point::new(4.0, 0.0)),
            ]
        );
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let ops = compile("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
        let DrawOp::CubicTo { c1, .. } = ops[2] else {
            panic!("expected cubic");
        };
        assert_eq!(c1, Point::new(10.0, -10.0));
    }

    #[test]
    fn smooth_curve_without_same_family_predecessor_uses_current_point() {
        let ops = compile("M3 4 Q0 0 5 5 S7 7 9 9");
        let DrawOp::CubicTo { c1, .. } = ops[2] else {
            panic!("expected cubic");
        };
        assert_eq!(c1, Point::new(5.0, 5.0));

        let ops = compile("M3 4 C0 0 1 1 5 5 T9 9");
        let DrawOp::QuadTo { c, .. } = ops[2] else {
            panic!("expected quad");
        };
        assert_eq!(c, Point::new(5.0, 5.0));
    }

    #[test]
    fn smooth_quadratic_chains_reflections() {
        let ops = compile("M0 0 Q5 10 10 0 T20 0 T30 0");
        let controls: Vec<Point> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::QuadTo { c, .. } => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(
            controls,
            vec![
                Point::new(5.0, 10.0),
                Point::new(15.0, -10.0),
                Point::new(25.0, 10.0)
            ]
        );
    }

    #[test]
    fn close_returns_to_subpath_start_and_resets_smoothing() {
        let ops = compile("M5 5 C5 9 9 9 9 5 Z l1 1 s1 1 2 2");
        assert_eq!(ops[3], DrawOp::LineTo(Point::new(6.0, 6.0)));
        let DrawOp::CubicTo { c1, .. } = ops[4] else {
            panic!("expected cubic");
        };
        assert_eq!(c1, Point::new(6.0, 6.0));
        assert_eq!(end_point(&ops), Some(Point::new(8.0, 8.0)));
    }

    #[test]
    fn degenerate_arcs() {
        assert_eq!(compile("M1 1 A5 5 0 0 1 1 1").len(), 1);
        assert_eq!(
            compile("M1 1 A0 5 0 0 1 4 4")[1],
            DrawOp::LineTo(Point::new(4.0, 4.0))
        );
    }

    #[test]
    fn semicircle_sweep_follows_flag() {
        let ops = compile("M0 0 A10 10 0 0 1 20 0");
        let (transform, radius, start, sweep) = arc_parts(&ops[1]);
        assert!((radius - 10.0).abs() < 1e-9);
        assert!((sweep - PI).abs() < 1e-9, "sweep {sweep}");
        assert!(arc_point(transform, radius, start).approx_eq(Point::new(0.0, 0.0), 1e-9));
        assert!(
            arc_point(transform, radius, start + sweep).approx_eq(Point::new(20.0, 0.0), 1e-9)
        );
        assert!(arc_point(transform, radius, start + sweep / 2.0).approx_eq(
            Point::new(10.0, -10.0),
            1e-9
        ));

        let ops = compile("M0 0 A10 10 0 0 0 20 0");
        let (_, _, _, sweep) = arc_parts(&ops[1]);
        assert!((sweep + PI).abs() < 1e-9, "sweep {sweep}");
    }

    #[test]
    fn undersized_radii_are_scaled_up() {
        let ops = compile("M0 0 A1 1 0 0 1 20 0");
        let (_, radius, _, sweep) = arc_parts(&ops[1]);
        assert!((radius - 10.0).abs() < 1e-9);
        assert!((sweep.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn large_arc_flag_selects_the_long_way_round() {
        for (flags, large) in [("0 1", false), ("1 1", true), ("0 0", false), ("1 0", true)] {
            let ops = compile(&format!("M0 0 A10 10 0 {flags} 10 10"));
            let (_, _, _, sweep) = arc_parts(&ops[1]);
            assert_eq!(sweep.abs() > PI, large, "{flags}: {sweep}");
        }
    }

    #[test]
    fn tilted_ellipse_hits_both_endpoints() {
        let ops = compile("M10 20 A30 15 25 1 0 50 40");
        let (transform, radius, start, sweep) = arc_parts(&ops[1]);
        assert!(radius >= 30.0);
        assert!(sweep <= 0.0);
        assert!(arc_point(transform, radius, start).approx_eq(Point::new(10.0, 20.0), 1e-6));
        assert!(
            arc_point(transform, radius, start + sweep).approx_eq(Point::new(50.0, 40.0), 1e-6)
        );
    }

    #[test]
    fn flattened_arcs_end_exactly_on_the_endpoint() {
        let ops = compile("M0 0 A10 10 0 1 1 10 10");
        let flat = flatten_arcs(&ops, 0.3);
        assert!(flat.len() > 4);
        assert!(flat.iter().all(|op| !matches!(op, DrawOp::Arc { .. })));
        assert_eq!(end_point(&flat), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn tiny_skia_export_covers_the_arc() {
        let ops = compile("M0 0 A10 10 0 0 1 20 0 Z");
        let path = to_tiny_skia_path(&ops, FRAC_PI_2).expect("path");
        let rect = path.bounds();
        assert!((rect.width() - 20.0).abs() < 1e-3, "{rect:?}");
        assert!((rect.height() - 10.0).abs() < 0.1, "{rect:?}");
        assert!(to_tiny_skia_path(&[], FRAC_PI_2).is_none());
    }

    #[test]
    fn bounds_include_control_points() {
        let ops = compile("M0 0 C0 10 10 10 10 0");
        assert_eq!(
            bounds(&ops),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 10.0)))
        );
        assert_eq!(bounds(&[]), None);
    }

    #[test]
    fn absolute_round_trip_reaches_the_same_points() {
        for source in [
            "m10 10 h5 v5 l-5 0 z m1 1 l1 1",
            "M0 0 c1 2 3 4 5 6 s1 1 2 2 q0 1 2 3 t4 4 a5 6 30 1 0 7 8 Z",
            "M0,0L.1.2.1.2ZM0,0 L1.2 3 .4 5.6 z",
            "m1 1 a3 2 -10 0 1 4 4 v-3 h2 z",
        ] {
            let tokens = parse_svg_path(source).expect("parse");
            let rewritten = tokens_to_string(&to_absolute(&tokens));
            let direct = compile_path_tokens(&tokens);
            let round = compile(&rewritten);
            assert_eq!(direct.len(), round.len(), "{source} -> {rewritten}");
            for (a, b) in direct.iter().zip(&round) {
                match (a.end(), b.end()) {
                    (Some(pa), Some(pb)) => {
                        assert!(pa.approx_eq(pb, 1e-9), "{source}: {pa:?} vs {pb:?}")
                    }
                    (None, None) => {}
                    _ => panic!("{source}: {a:?} vs {b:?}"),
                }
            }
        }
    }
}
