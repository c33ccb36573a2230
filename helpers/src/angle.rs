use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Angle stores a rotation in radians. Positive angles rotate from the positive x axis towards
/// the positive y axis (clockwise on a screen with the y axis pointing downwards).
///
/// Two normalizations are provided:
/// * `normalized` -> [0, 360) deg, used for all stored headings
/// * `normalized_180` -> [-180, 180) deg, used for shortest-path differences
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Angle {
    rad: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { rad: 0.0 };

    pub fn from_radians(rad: f64) -> Angle {
        Angle { rad }
    }
    pub fn from_degrees(deg: f64) -> Angle {
        Angle {
            rad: deg.to_radians(),
        }
    }
    pub fn to_radians(self) -> f64 {
        self.rad
    }
    pub fn to_degrees(self) -> f64 {
        self.rad.to_degrees()
    }
    /// normalized wraps the angle into [0, 360) deg.
    pub fn normalized(self) -> Angle {
        Angle {
            rad: normalize_rad(self.rad),
        }
    }
    /// normalized_180 wraps the angle into [-180, 180) deg.
    pub fn normalized_180(self) -> Angle {
        Angle {
            rad: normalize_rad_180(self.rad),
        }
    }
    /// diff_180 returns the signed shortest difference self - other in [-180, 180) deg.
    pub fn diff_180(self, other: Angle) -> Angle {
        (self.normalized() - other.normalized()).normalized_180()
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, other: Angle) -> Angle {
        Angle {
            rad: self.rad + other.rad,
        }
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, other: Angle) {
        self.rad += other.rad
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, other: Angle) -> Angle {
        Angle {
            rad: self.rad - other.rad,
        }
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, other: Angle) {
        self.rad -= other.rad
    }
}

/// normalize_rad wraps an angle in radians into [0, 2 pi).
pub fn normalize_rad(rad: f64) -> f64 {
    let wrapped = rad.rem_euclid(TAU);

    // rem_euclid can round up to exactly 2 pi for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// normalize_rad_180 wraps an angle in radians into [-pi, pi).
pub fn normalize_rad_180(rad: f64) -> f64 {
    let wrapped = normalize_rad(rad);

    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
