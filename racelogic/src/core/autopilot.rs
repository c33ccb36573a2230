use crate::core::car::Car;
use crate::core::progress::Progress;
use serde::Deserialize;

/// * `lookahead` - Number of checkpoints ahead of the current one that are targeted
/// * `full_turn_angle` - (deg) Heading error at which the wheels are turned completely
/// * `turn_resolution` - Commanded turns are rounded to multiples of this value, which reduces
/// the number of input changes and therefore of state messages
/// * `brake_angle` - (deg) Heading error above which the car brakes instead of accelerating
/// * `brake_min_speed` - (px/step) Braking is only used above this speed
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AutopilotPars {
    pub lookahead: usize,
    pub full_turn_angle: f64,
    pub turn_resolution: f64,
    pub brake_angle: f64,
    pub brake_min_speed: f64,
}

impl Default for AutopilotPars {
    fn default() -> Self {
        AutopilotPars {
            lookahead: 2,
            full_turn_angle: 30.0,
            turn_resolution: 0.25,
            brake_angle: 60.0,
            brake_min_speed: 6.0,
        }
    }
}

/// Autopilot drives a car along the checkpoints of the track.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    pars: AutopilotPars,
}

impl Autopilot {
    pub fn new(pars: &AutopilotPars) -> Autopilot {
        Autopilot {
            pars: pars.to_owned(),
        }
    }

    /// The method sets the inputs of the car such that it heads for the checkpoint `lookahead`
    /// positions after its current one.
    pub fn drive(&self, car: &mut Car, progress: &Progress) {
        let no_checkpoints = progress.checkpoint_count();
        let cur_idx = progress.checkpoint(car).idx;
        let target = progress.checkpoint_at((cur_idx + self.pars.lookahead) % no_checkpoints);

        let to_target = car.position().vector_to(&target.position);

        if to_target.abs() <= f64::EPSILON {
            car.set_turn(0.0);
            car.set_acceleration(true);
            return;
        }

        // positive error -> target is located right of the car
        let heading_error = to_target.angle().diff_180(car.rotation()).to_degrees();

        let mut turn = (heading_error / self.pars.full_turn_angle).clamp(-1.0, 1.0);

        if self.pars.turn_resolution > 0.0 {
            turn = (turn / self.pars.turn_resolution).round() * self.pars.turn_resolution;
        }

        let brake =
            heading_error.abs() > self.pars.brake_angle && car.speed() > self.pars.brake_min_speed;

        car.set_turn(turn);
        car.set_brake(brake);
        car.set_acceleration(!brake);
    }
}
