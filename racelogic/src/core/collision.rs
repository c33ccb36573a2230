use crate::core::car::Car;
use crate::core::level::{Bound, Level};
use helpers::angle::Angle;
use helpers::geometry::{LineSegment2d, Point2d, Vector2d};

/// (px) Width of the car body.
pub const CAR_WIDTH: f64 = 18.0;
/// (px) Length of the car body (along the corpse heading).
pub const CAR_LENGTH: f64 = 24.0;

/// car_outline returns the corners of the car body (front left, front right, rear right, rear
/// left) for the inserted center position and corpse heading.
pub fn car_outline(position: &Point2d, rotation: Angle) -> [Point2d; 4] {
    let forward = Vector2d::from_angle(rotation).mult(CAR_LENGTH / 2.0);
    let side = Vector2d::from_angle(rotation).normal_vector().mult(CAR_WIDTH / 2.0);

    [
        position.shift(&forward.sub(&side)),
        position.shift(&forward.add(&side)),
        position.shift(&forward.mult(-1.0).add(&side)),
        position.shift(&forward.mult(-1.0).sub(&side)),
    ]
}

/// collides_with_bound checks whether the bound crosses the car body or lies completely inside it.
pub fn collides_with_bound(car: &Car, bound: &Bound) -> bool {
    let outline = car_outline(&car.position(), car.rotation());

    let crosses = (0..outline.len()).any(|i| {
        LineSegment2d::new(outline[i], outline[(i + 1) % outline.len()]).intersects(&bound.segment)
    });

    crosses || is_inside_outline(&outline, &bound.segment.p)
}

/// colliding_bounds returns all bounds of the level the car currently collides with.
pub fn colliding_bounds<'a>(car: &Car, level: &'a dyn Level) -> Vec<&'a Bound> {
    level
        .bounds()
        .iter()
        .filter(|bound| collides_with_bound(car, bound))
        .collect()
}

/// is_inside_outline checks whether the point is located inside the convex outline.
fn is_inside_outline(outline: &[Point2d; 4], point: &Point2d) -> bool {
    let sides: Vec<f64> = (0..outline.len())
        .map(|i| LineSegment2d::new(outline[i], outline[(i + 1) % outline.len()]).point_side(point))
        .collect();

    sides.iter().all(|&s| s >= 0.0) || sides.iter().all(|&s| s <= 0.0)
}
