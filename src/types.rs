#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Mirror `self` through `center`; used for smooth-curve control points.
    pub fn reflect_about(self, center: Point) -> Self {
        Self {
            x: 2.0 * center.x - self.x,
            y: 2.0 * center.y - self.y,
        }
    }

    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

/// 2D affine transform `[a c e; b d f; 0 0 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    pub fn rotate_radians(rad: f64) -> Self {
        let s = libm::sin(rad);
        let c = libm::cos(rad);
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn rotate(deg: f64) -> Self {
        Self::rotate_radians(deg.to_radians())
    }

    // [self] * [other]: `other` applies first.
    pub fn concat(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_applies_right_operand_first() {
        let t = Transform::translate(10.0, 0.0).concat(Transform::scale(2.0, 2.0));
        let p = t.apply(Point::new(1.0, 1.0));
        assert!(p.approx_eq(Point::new(12.0, 2.0), 1e-12));
    }

    #[test]
    fn rotation_is_counterclockwise_in_y_up_frame() {
        let p = Transform::rotate(90.0).apply(Point::new(1.0, 0.0));
        assert!(p.approx_eq(Point::new(0.0, 1.0), 1e-12));
    }

    #[test]
    fn reflection_mirrors_through_center() {
        let p = Point::new(1.0, 2.0).reflect_about(Point::new(3.0, 3.0));
        assert_eq!(p, Point::new(5.0, 4.0));
    }
}
