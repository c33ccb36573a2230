use helpers::geometry::Point2d;

pub const MAX_RENDER_UPDATE_FREQUENCY: f64 = 20.0;

/// CarView is what a renderer needs to know about a single car.
#[derive(Debug, Clone, Default)]
pub struct CarView {
    pub owner: String,
    pub position: Point2d,
    pub rotation_deg: f64,
    pub speed_kmh: f64,
    pub drifting: bool,
    pub lap_num: u32,
    pub race_prog: f64,
    pub finished: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RaceState {
    pub racetime: f64,
    pub tot_no_laps: u32,
    pub countdown: Option<f64>,
    pub car_views: Vec<CarView>,
}
