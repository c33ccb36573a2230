use helpers::angle::Angle;
use helpers::geometry::{LineSegment2d, Point2d};
use serde::Deserialize;
use std::fmt;

/// Start position used for slots the level does not define.
pub const DEFAULT_START_POSITION: Point2d = Point2d { x: 200.0, y: 200.0 };

/// * `slot` - Start slot number (1 = pole position, 0 = parking spot of remote cars until their
/// first state arrives)
/// * `x`, `y` - (px) Position of the slot
/// * `heading` - (deg) Heading of a car placed in the slot
#[derive(Debug, Deserialize, Clone)]
pub struct StartPositionPars {
    pub slot: u32,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// * `center` - (px) Center of the sandpit circle
/// * `radius` - (px) Radius of the sandpit circle
/// * `resistance` - (1/s) Ground resistance inside the sandpit
#[derive(Debug, Deserialize, Clone)]
pub struct SandpitPars {
    pub center: Point2d,
    pub radius: f64,
    pub resistance: f64,
}

/// * `name` - Name of the level
/// * `centerline` - (px) Points of the closed track centerline in driving direction
/// * `track_width` - (px) Width of the track around the centerline
/// * `checkpoint_spacing` - (px) Maximum distance between two consecutive checkpoints
/// * `grass_resistance` - (1/s) Ground resistance off the track
/// * `bounds` - (px) Walls the cars collide with
/// * `start_positions` - Start slots of the level
/// * `sandpits` - Circular areas with an increased ground resistance
#[derive(Debug, Deserialize, Clone)]
pub struct LevelPars {
    pub name: String,
    pub centerline: Vec<Point2d>,
    pub track_width: f64,
    pub checkpoint_spacing: f64,
    pub grass_resistance: f64,
    pub bounds: Vec<LineSegment2d>,
    pub start_positions: Vec<StartPositionPars>,
    #[serde(default)]
    pub sandpits: Vec<SandpitPars>,
}

/// Bound is a wall segment of the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub segment: LineSegment2d,
}

impl Bound {
    pub fn new(p: Point2d, q: Point2d) -> Bound {
        Bound {
            segment: LineSegment2d::new(p, q),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub idx: usize,
    pub position: Point2d,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPosition {
    pub position: Point2d,
    pub heading: Angle,
}

/// Level is everything the race core needs to know about the map it is driven on.
pub trait Level: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    /// resistance returns the ground resistance (1/s) at the inserted point.
    fn resistance(&self, point: &Point2d) -> f64;
    fn bounds(&self) -> &[Bound];
    /// checkpoints returns the ordered checkpoints along the track, index i at position i.
    fn checkpoints(&self) -> &[Checkpoint];
    fn start_position(&self, slot: u32) -> StartPosition;
}

#[derive(Debug)]
pub struct TrackLevel {
    name: String,
    centerline: Vec<LineSegment2d>,
    track_width: f64,
    grass_resistance: f64,
    sandpits: Vec<SandpitPars>,
    bounds: Vec<Bound>,
    checkpoints: Vec<Checkpoint>,
    start_positions: Vec<StartPositionPars>,
}

impl TrackLevel {
    pub fn new(level_pars: &LevelPars) -> TrackLevel {
        let centerline = closed_polyline(&level_pars.centerline);
        let checkpoints = generate_checkpoints(&centerline, level_pars.checkpoint_spacing);

        log::debug!(
            "Level {} has {} centerline segments and {} checkpoints",
            level_pars.name,
            centerline.len(),
            checkpoints.len()
        );

        TrackLevel {
            name: level_pars.name.to_owned(),
            centerline,
            track_width: level_pars.track_width,
            grass_resistance: level_pars.grass_resistance,
            sandpits: level_pars.sandpits.to_owned(),
            bounds: level_pars
                .bounds
                .iter()
                .map(|seg| Bound { segment: *seg })
                .collect(),
            checkpoints,
            start_positions: level_pars.start_positions.to_owned(),
        }
    }

    /// The method checks whether the point lies within half the track width of the centerline.
    pub fn is_on_track(&self, point: &Point2d) -> bool {
        self.centerline
            .iter()
            .any(|seg| seg.dist_to_point(point) <= self.track_width / 2.0)
    }
}

impl Level for TrackLevel {
    fn name(&self) -> &str {
        &self.name
    }

    fn resistance(&self, point: &Point2d) -> f64 {
        if let Some(sandpit) = self
            .sandpits
            .iter()
            .find(|s| s.center.dist(point) <= s.radius)
        {
            sandpit.resistance
        } else if self.is_on_track(point) {
            0.0
        } else {
            self.grass_resistance
        }
    }

    fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    fn start_position(&self, slot: u32) -> StartPosition {
        match self.start_positions.iter().find(|s| s.slot == slot) {
            Some(s) => StartPosition {
                position: Point2d::new(s.x, s.y),
                heading: Angle::from_degrees(s.heading).normalized(),
            },
            None => StartPosition {
                position: DEFAULT_START_POSITION,
                heading: Angle::ZERO,
            },
        }
    }
}

/// closed_polyline connects the inserted points to a closed loop of segments.
fn closed_polyline(points: &[Point2d]) -> Vec<LineSegment2d> {
    if points.len() < 2 {
        return vec![];
    }

    (0..points.len())
        .map(|i| LineSegment2d::new(points[i], points[(i + 1) % points.len()]))
        .collect()
}

/// generate_checkpoints places checkpoints along the centerline, segment by segment. Every segment
/// is split into the smallest number of equal parts that are not longer than the inserted spacing,
/// and a checkpoint is put at the start of each part. The result is deterministic for a given
/// centerline.
pub fn generate_checkpoints(centerline: &[LineSegment2d], spacing: f64) -> Vec<Checkpoint> {
    let mut checkpoints = vec![];

    for seg in centerline.iter() {
        let no_parts = if spacing > 0.0 {
            ((seg.length() / spacing).ceil() as usize).max(1)
        } else {
            1
        };

        for j in 0..no_parts {
            checkpoints.push(Checkpoint {
                idx: checkpoints.len(),
                position: seg.point_at(j as f64 / no_parts as f64),
            });
        }
    }

    checkpoints
}
