use crate::core::level::{Bound, Level};
use crate::network::car_state::{CarSnapshot, SnapshotError};
use crate::network::event::EventValue;
use flume::Sender;
use helpers::angle::Angle;
use helpers::general::step_towards;
use helpers::geometry::{Point2d, Vector2d};
use serde::Deserialize;

/// (us) Duration of one fixed physics step (1/60 s).
pub const STEP_DURATION_US: u64 = 1_000_000 / 60;
/// (steps/s)
pub const STEPS_PER_SECOND: f64 = 60.0;

/// (rad) Heading differences below this value are not aligned any further.
const ALIGN_TOLERANCE: f64 = 0.01;
/// Minimum change of the turn input that counts as an input change.
const TURN_CHANGE_THRESHOLD: f64 = 0.1;
/// (deg) Heading differences below this value do not cause cornering scrub.
const SCRUB_TOLERANCE: f64 = 0.1;

/// Default start position of a car that was not placed yet.
const DEFAULT_POSITION: Point2d = Point2d { x: 300.0, y: 300.0 };

/// * `brake_power` - (px/step^2) Speed reduction per step while braking
/// * `accel_power` - (px/step^2) Speed increase per step while accelerating
/// * `wheel_turn_speed` - (1/step) Maximum change of the wheel turn per step
/// * `turn_power` - (deg/step) Corpse rotation per step at full wheel turn
/// * `mov_align_power` - (deg/step) Rate at which the corpse is turned back towards the movement
/// heading when the wheels are straight
/// * `rot_align_power` - (deg/step) Rate at which the movement heading follows the corpse
/// * `air_resistance` - (-) Relative speed loss per step
/// * `drift_speed_reduction` - (px/step^2) Speed loss per step at a heading difference of 90 deg
/// * `lower_speed_align_reduction` - (px/step) Below this speed the movement heading follows the
/// corpse more slowly
/// * `lower_speed_rotation_reduction` - (px/step) Below this speed the corpse is turned back
/// towards the movement heading more slowly
/// * `lower_speed_turn_reduction` - (px/step) Below this speed the turn power is reduced
/// * `drift_angle` - (deg) Heading difference from which on the car counts as drifting
/// * `drift_speed_delta` - (px/step^2) Speed change from which on the car counts as drifting
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CarPhysicsPars {
    pub brake_power: f64,
    pub accel_power: f64,
    pub wheel_turn_speed: f64,
    pub turn_power: f64,
    pub mov_align_power: f64,
    pub rot_align_power: f64,
    pub air_resistance: f64,
    pub drift_speed_reduction: f64,
    pub lower_speed_align_reduction: f64,
    pub lower_speed_rotation_reduction: f64,
    pub lower_speed_turn_reduction: f64,
    pub drift_angle: f64,
    pub drift_speed_delta: f64,
}

impl Default for CarPhysicsPars {
    fn default() -> Self {
        let turn_power = 2.5;

        CarPhysicsPars {
            brake_power: 0.1,
            accel_power: 0.14,
            wheel_turn_speed: 0.1,
            turn_power,
            mov_align_power: turn_power / 2.0,
            rot_align_power: turn_power * 0.7,
            air_resistance: 0.01,
            drift_speed_reduction: 0.1,
            lower_speed_align_reduction: 6.0,
            lower_speed_rotation_reduction: 6.0,
            lower_speed_turn_reduction: 2.0,
            drift_angle: 6.0,
            drift_speed_delta: 0.05,
        }
    }
}

impl CarPhysicsPars {
    /// The method returns the terminal speed (px/step) of a car that accelerates straight ahead,
    /// i.e. the speed at which the acceleration is balanced by the air resistance.
    pub fn max_speed(&self) -> f64 {
        self.accel_power * (1.0 - self.air_resistance) / self.air_resistance
    }
}

/// CarEvent is emitted by a car towards its registered observer.
#[derive(Debug, Clone, PartialEq)]
pub enum CarEvent {
    /// The inputs of the car changed since the last step (emitted once per change).
    InputChanged { owner: String },
}

#[derive(Debug)]
pub struct Car {
    owner: String,
    pars: CarPhysicsPars,
    t_accumulated_us: u64,
    position: Point2d,
    rotation: Angle,
    speed: f64,
    input_accel: bool,
    input_brake: bool,
    input_turn: f64,
    input_locked: bool,
    input_changed: bool,
    move_rotation: Angle,
    move_vec: Vector2d,
    speed_delta: f64,
    wheels_turn: f64,
    ground_resistance: f64,
    observer: Option<Sender<CarEvent>>,
}

impl Car {
    pub fn new(owner: &str, pars: &CarPhysicsPars) -> Car {
        Car {
            owner: owner.to_owned(),
            pars: pars.to_owned(),
            t_accumulated_us: 0,
            position: DEFAULT_POSITION,
            rotation: Angle::ZERO,
            speed: 0.0,
            input_accel: false,
            input_brake: false,
            input_turn: 0.0,
            input_locked: false,
            input_changed: false,
            move_rotation: Angle::ZERO,
            move_vec: Vector2d::default(),
            speed_delta: 0.0,
            wheels_turn: 0.0,
            ground_resistance: 0.0,
            observer: None,
        }
    }

    /// The method registers the observer that receives the car's events. A previously registered
    /// observer is replaced.
    pub fn subscribe(&mut self, observer: Sender<CarEvent>) {
        self.observer = Some(observer);
    }

    // UPDATE --------------------------------------------------------------------------------------
    /// The method accumulates the elapsed time and executes one fixed step for each complete step
    /// duration. The remainder is carried over to the next call. The number of executed steps is
    /// returned.
    pub fn update(&mut self, elapsed_ms: u32) -> u32 {
        self.t_accumulated_us += elapsed_ms as u64 * 1000;

        let mut no_steps = 0;

        while self.t_accumulated_us >= STEP_DURATION_US {
            self.step();
            self.t_accumulated_us -= STEP_DURATION_US;
            no_steps += 1;
        }

        no_steps
    }

    /// The method executes a single physics step.
    pub fn step(&mut self) {
        if self.input_locked {
            return;
        }

        let speed_before = self.speed;

        // accelerate or brake
        if self.input_brake {
            self.speed -= self.pars.brake_power;
        } else if self.input_accel {
            self.speed += self.pars.accel_power;
        }

        // steering wheels follow the commanded turn with a limited rate
        self.wheels_turn = step_towards(
            self.wheels_turn,
            self.input_turn,
            self.pars.wheel_turn_speed,
        );

        let abs_speed = self.speed.abs();

        if self.wheels_turn != 0.0 {
            // rotate corpse, reduced at low speed to prevent turning on the spot
            let mut turn = self.pars.turn_power * self.wheels_turn;

            if abs_speed < self.pars.lower_speed_turn_reduction {
                turn *= abs_speed / self.pars.lower_speed_turn_reduction;
            }

            if self.speed >= 0.0 {
                self.rotation += Angle::from_degrees(turn);
            } else {
                self.rotation -= Angle::from_degrees(turn);
            }

            self.move_rotation = align_rotation(
                self.move_rotation,
                self.rotation,
                self.align_step(self.pars.rot_align_power, self.pars.lower_speed_align_reduction),
            );
        } else {
            // wheels straight -> corpse and movement heading converge
            self.rotation = align_rotation(
                self.rotation,
                self.move_rotation,
                self.align_step(
                    self.pars.mov_align_power,
                    self.pars.lower_speed_rotation_reduction,
                ),
            );
            self.move_rotation = align_rotation(
                self.move_rotation,
                self.rotation,
                self.align_step(self.pars.rot_align_power, self.pars.lower_speed_align_reduction),
            );
        }

        self.rotation = self.rotation.normalized();
        self.move_rotation = self.move_rotation.normalized();

        // cornering scrub, cannot push the speed beyond zero
        let heading_diff = self.rotation.diff_180(self.move_rotation).to_degrees().abs();

        if heading_diff > SCRUB_TOLERANCE {
            let reduction = self.pars.drift_speed_reduction * heading_diff / 90.0;

            if self.speed.abs() > reduction {
                self.speed -= reduction.copysign(self.speed);
            } else {
                self.speed = 0.0;
            }
        }

        // air and ground resistance
        self.speed -= self.speed * self.pars.air_resistance;
        self.speed -= self.speed * self.ground_resistance / STEPS_PER_SECOND;

        // integrate position
        self.move_vec = Vector2d::from_angle(self.move_rotation).mult(self.speed);
        self.position = self.position.shift(&self.move_vec);

        self.speed_delta = self.speed - speed_before;

        if self.input_changed {
            self.input_changed = false;
            self.notify_input_changed();
        }
    }

    /// The method returns the alignment step for the current speed. Above the inserted speed
    /// threshold the full power is used, below it the power fades out towards zero speed.
    fn align_step(&self, power: f64, speed_threshold: f64) -> Angle {
        let abs_speed = self.speed.abs();

        let factor = if abs_speed >= speed_threshold {
            1.0
        } else {
            (abs_speed + 1.0) / (speed_threshold + 1.0)
        };

        Angle::from_degrees(power * factor)
    }

    fn notify_input_changed(&mut self) {
        if let Some(observer) = &self.observer {
            if observer
                .send(CarEvent::InputChanged {
                    owner: self.owner.to_owned(),
                })
                .is_err()
            {
                log::debug!("Observer of car {} is gone", self.owner);
                self.observer = None;
            }
        }
    }

    // COLLISION -----------------------------------------------------------------------------------
    /// The method handles a collision with the inserted bound. The car is pushed out along the
    /// normal of the bound by its absolute speed, its speed is reduced according to how head-on
    /// the impact was, and its movement is mirrored at the bound.
    pub fn perform_bound_collision(&mut self, bound: &Bound) {
        let seg = &bound.segment;
        let dir = seg.direction();

        if dir.abs() <= f64::EPSILON {
            return;
        }

        // unit normal pointing from the bound towards the car
        let mut normal = dir.normal_vector().normalized();

        if normal.dot(&seg.p.vector_to(&self.position)) < 0.0 {
            normal = normal.mult(-1.0);
        }

        self.position = self.position.shift(&normal.mult(self.speed.abs()));

        // 0 when grazing, 1 for a perpendicular impact
        let heading = Vector2d::from_angle(self.move_rotation);
        let impact = heading.dot(&normal).abs();
        self.speed -= self.speed * impact;

        let reflected = heading.reflect(&normal);
        self.move_rotation = reflected.angle();
        self.move_vec = reflected.mult(self.speed);
    }

    // DRIFT ---------------------------------------------------------------------------------------
    pub fn is_drifting(&self) -> bool {
        self.rotation.diff_180(self.move_rotation).to_degrees().abs() > self.pars.drift_angle
            || self.speed_delta.abs() > self.pars.drift_speed_delta
    }

    // SERIALIZATION -------------------------------------------------------------------------------
    pub fn prepare_car_state(&self) -> CarSnapshot {
        CarSnapshot {
            accel: self.input_accel,
            brake: self.input_brake,
            turn: self.input_turn,
            locked: self.input_locked,
            pos_x: self.position.x,
            pos_y: self.position.y,
            rotation: self.rotation.to_radians(),
            speed: self.speed,
            move_rotation: self.move_rotation.to_radians(),
            move_x: self.move_vec.dx,
            move_y: self.move_vec.dy,
            speed_delta: self.speed_delta,
            wheels_turn: self.wheels_turn,
        }
    }

    /// The method overwrites the complete physics state with the inserted snapshot. Pending
    /// input changes and the time accumulator are not affected.
    pub fn apply_car_state(&mut self, state: &CarSnapshot) {
        self.input_accel = state.accel;
        self.input_brake = state.brake;
        self.input_turn = state.turn.clamp(-1.0, 1.0);
        self.input_locked = state.locked;
        self.apply_motion_state(state);
    }

    /// The method corrects the motion of the car with the inserted snapshot but keeps the
    /// inputs. Used for the echo of the own car, whose inputs are never older than the snapshot.
    pub fn correct_car_state(&mut self, state: &CarSnapshot) {
        self.apply_motion_state(state);
    }

    fn apply_motion_state(&mut self, state: &CarSnapshot) {
        self.position = Point2d::new(state.pos_x, state.pos_y);
        self.rotation = Angle::from_radians(state.rotation).normalized();
        self.speed = state.speed;
        self.move_rotation = Angle::from_radians(state.move_rotation).normalized();
        self.move_vec = Vector2d::new(state.move_x, state.move_y);
        self.speed_delta = state.speed_delta;
        self.wheels_turn = state.wheels_turn.clamp(-1.0, 1.0);
    }

    pub fn serialize(&self) -> Vec<EventValue> {
        self.prepare_car_state().to_args()
    }

    /// The method applies a serialized state. Invalid data is rejected as a whole and the car is
    /// left untouched.
    pub fn deserialize(&mut self, args: &[EventValue]) -> Result<(), SnapshotError> {
        let state = self.parse_car_state(args)?;
        self.apply_car_state(&state);
        Ok(())
    }

    /// The method applies the echo of a serialized state of this car, see `correct_car_state`.
    pub fn deserialize_echo(&mut self, args: &[EventValue]) -> Result<(), SnapshotError> {
        let state = self.parse_car_state(args)?;
        self.correct_car_state(&state);
        Ok(())
    }

    fn parse_car_state(&self, args: &[EventValue]) -> Result<CarSnapshot, SnapshotError> {
        CarSnapshot::from_args(args).map_err(|e| {
            log::warn!("Ignoring car state for {}: {}", self.owner, e);
            e
        })
    }

    // INPUTS --------------------------------------------------------------------------------------
    pub fn set_acceleration(&mut self, accel: bool) {
        if self.input_accel != accel {
            self.input_accel = accel;
            self.input_changed = true;
        }
    }

    pub fn set_brake(&mut self, brake: bool) {
        if self.input_brake != brake {
            self.input_brake = brake;
            self.input_changed = true;
        }
    }

    /// The method sets the commanded turn (negative left, positive right), clamped to
    /// [-1.0, 1.0]. Only changes larger than a small threshold count as input change.
    pub fn set_turn(&mut self, turn: f64) {
        let turn = if turn.is_nan() {
            0.0
        } else {
            turn.clamp(-1.0, 1.0)
        };

        if (turn - self.input_turn).abs() > TURN_CHANGE_THRESHOLD {
            self.input_changed = true;
        }

        self.input_turn = turn;
    }

    /// The method (un)freezes the car. A locked car loses its movement.
    pub fn set_locked(&mut self, locked: bool) {
        if self.input_locked != locked {
            self.input_locked = locked;
            self.input_changed = true;
        }

        if locked {
            self.move_vec = Vector2d::default();
        }
    }

    pub fn set_ground_resistance(&mut self, resistance: f64) {
        self.ground_resistance = resistance.max(0.0);
    }

    // PLACEMENT -----------------------------------------------------------------------------------
    pub fn set_position(&mut self, position: Point2d) {
        self.position = position;
    }

    /// The method sets corpse and movement heading at once.
    pub fn set_angle(&mut self, angle: Angle) {
        self.rotation = angle.normalized();
        self.move_rotation = self.rotation;
    }

    /// The method places the car at the level's start slot and stops it.
    pub fn set_start_position(&mut self, level: &dyn Level, slot: u32) {
        let start = level.start_position(slot);

        self.set_position(start.position);
        self.set_angle(start.heading);
        self.speed = 0.0;
        self.speed_delta = 0.0;
        self.wheels_turn = 0.0;
        self.move_vec = Vector2d::default();
    }

    // GETTERS -------------------------------------------------------------------------------------
    pub fn owner(&self) -> &str {
        &self.owner
    }
    pub fn position(&self) -> Point2d {
        self.position
    }
    pub fn rotation(&self) -> Angle {
        self.rotation
    }
    pub fn move_rotation(&self) -> Angle {
        self.move_rotation
    }
    pub fn movement(&self) -> Vector2d {
        self.move_vec
    }
    pub fn speed(&self) -> f64 {
        self.speed
    }
    /// The method returns the speed in km/h (assuming 15 px = 1 m).
    pub fn speed_kmh(&self) -> f64 {
        self.speed / 15.0 * STEPS_PER_SECOND * 3600.0 / 1000.0
    }
    pub fn speed_delta(&self) -> f64 {
        self.speed_delta
    }
    pub fn wheels_turn(&self) -> f64 {
        self.wheels_turn
    }
    pub fn turn(&self) -> f64 {
        self.input_turn
    }
    pub fn is_accelerating(&self) -> bool {
        self.input_accel
    }
    pub fn is_braking(&self) -> bool {
        self.input_brake
    }
    pub fn is_locked(&self) -> bool {
        self.input_locked
    }
    pub fn has_input_changed(&self) -> bool {
        self.input_changed
    }
}

/// align_rotation turns `what` towards `to` by at most `step` along the shorter direction.
/// Differences within a small tolerance are left as they are.
fn align_rotation(what: Angle, to: Angle, step: Angle) -> Angle {
    let diff = what.diff_180(to).to_radians();

    if diff.abs() <= ALIGN_TOLERANCE {
        what
    } else if diff.abs() > step.to_radians() {
        if diff > 0.0 {
            what - step
        } else {
            what + step
        }
    } else {
        to
    }
}
