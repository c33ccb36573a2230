use crate::angle::Angle;
use approx::ulps_eq;
use serde::{Deserialize, Serialize};

// POINTS AND VECTORS ------------------------------------------------------------------------------
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub fn new(x: f64, y: f64) -> Point2d {
        Point2d { x, y }
    }
    pub fn as_vector2d(&self) -> Vector2d {
        Vector2d {
            dx: self.x,
            dy: self.y,
        }
    }
    pub fn shift(&self, other: &Vector2d) -> Point2d {
        self.as_vector2d().add(other).as_point2d()
    }
    /// vector_to returns the vector pointing from self to other.
    pub fn vector_to(&self, other: &Point2d) -> Vector2d {
        other.as_vector2d().sub(&self.as_vector2d())
    }
    pub fn dist(&self, other: &Point2d) -> f64 {
        self.vector_to(other).abs()
    }
}

impl PartialEq for Point2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.x, other.x) && ulps_eq!(self.y, other.y)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub struct Vector2d {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2d {
    pub fn new(dx: f64, dy: f64) -> Vector2d {
        Vector2d { dx, dy }
    }
    /// from_angle returns the unit vector that points into the direction of the angle (measured
    /// from the positive x axis towards the positive y axis).
    pub fn from_angle(angle: Angle) -> Vector2d {
        let rad = angle.to_radians();
        Vector2d {
            dx: rad.cos(),
            dy: rad.sin(),
        }
    }
    pub fn as_point2d(&self) -> Point2d {
        Point2d {
            x: self.dx,
            y: self.dy,
        }
    }
    pub fn sub(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
        }
    }
    pub fn add(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
    pub fn mult(&self, k: f64) -> Vector2d {
        Vector2d {
            dx: self.dx * k,
            dy: self.dy * k,
        }
    }
    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }
    /// convenience function (strictly speaking, the cross product is not defined in a 2D space,
    /// this is the z component of the 3D cross product)
    pub fn cross(&self, other: &Self) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }
    pub fn abs(&self) -> f64 {
        (self.dx.powf(2.0) + self.dy.powf(2.0)).sqrt()
    }
    pub fn normal_vector(&self) -> Vector2d {
        Vector2d {
            dx: -self.dy,
            dy: self.dx,
        }
    }
    pub fn normalized(&self) -> Vector2d {
        self.mult(1.0 / self.abs())
    }
    /// angle returns the direction of the vector as an angle in [0, 360) deg.
    pub fn angle(&self) -> Angle {
        Angle::from_radians(self.dy.atan2(self.dx)).normalized()
    }
    /// reflect mirrors the vector at the line that is perpendicular to the inserted unit normal,
    /// i.e. v - 2 * (v . n) * n.
    pub fn reflect(&self, unit_normal: &Vector2d) -> Vector2d {
        self.sub(&unit_normal.mult(2.0 * self.dot(unit_normal)))
    }
}

impl PartialEq for Vector2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.dx, other.dx) && ulps_eq!(self.dy, other.dy)
    }
}

// SEGMENTS ----------------------------------------------------------------------------------------
/// LineSegment2d is a straight line between the points p and q.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct LineSegment2d {
    pub p: Point2d,
    pub q: Point2d,
}

impl LineSegment2d {
    pub fn new(p: Point2d, q: Point2d) -> LineSegment2d {
        LineSegment2d { p, q }
    }
    pub fn direction(&self) -> Vector2d {
        self.p.vector_to(&self.q)
    }
    pub fn length(&self) -> f64 {
        self.direction().abs()
    }
    /// point_side returns a positive value if the point is located left of the line (looking from
    /// p to q in a coordinate system with the y axis pointing upwards), a negative value if it is
    /// located right of it, and zero if it is located on it.
    pub fn point_side(&self, point: &Point2d) -> f64 {
        self.direction().cross(&self.p.vector_to(point))
    }
    /// point_at returns the point at the relative position t in [0.0, 1.0] along the segment.
    pub fn point_at(&self, t: f64) -> Point2d {
        self.p.shift(&self.direction().mult(t))
    }
    /// closest_point returns the point on the segment that is closest to the inserted point.
    pub fn closest_point(&self, point: &Point2d) -> Point2d {
        let dir = self.direction();
        let len_sq = dir.dot(&dir);

        if len_sq <= f64::EPSILON {
            return self.p;
        }

        let t = (self.p.vector_to(point).dot(&dir) / len_sq).clamp(0.0, 1.0);
        self.point_at(t)
    }
    pub fn dist_to_point(&self, point: &Point2d) -> f64 {
        self.closest_point(point).dist(point)
    }
    /// intersects checks whether two segments share at least one point (touching counts).
    pub fn intersects(&self, other: &LineSegment2d) -> bool {
        let d1 = self.point_side(&other.p);
        let d2 = self.point_side(&other.q);
        let d3 = other.point_side(&self.p);
        let d4 = other.point_side(&self.q);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        // collinear special cases
        (d1 == 0.0 && self.contains_collinear(&other.p))
            || (d2 == 0.0 && self.contains_collinear(&other.q))
            || (d3 == 0.0 && other.contains_collinear(&self.p))
            || (d4 == 0.0 && other.contains_collinear(&self.q))
    }
    fn contains_collinear(&self, point: &Point2d) -> bool {
        point.x >= self.p.x.min(self.q.x)
            && point.x <= self.p.x.max(self.q.x)
            && point.y >= self.p.y.min(self.q.y)
            && point.y <= self.p.y.max(self.q.y)
    }
}
