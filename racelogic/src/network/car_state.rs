use crate::network::event::EventValue;

/// Number of values a serialized car state consists of.
pub const CAR_STATE_ARGUMENT_COUNT: usize = 13;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error(
        "invalid car state argument count {0} (expected {expected})",
        expected = CAR_STATE_ARGUMENT_COUNT
    )]
    ArgumentCount(usize),
    #[error("car state argument {idx} is a {found}, expected a {expected}")]
    ArgumentType {
        idx: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// CarSnapshot is the plain-data copy of a car's physics state as it travels over the wire.
///
/// * `accel` - Accelerate input
/// * `brake` - Brake input
/// * `turn` - Commanded turn in [-1.0, 1.0]
/// * `locked` - Locked flag (car is frozen)
/// * `pos_x`, `pos_y` - (px) Position
/// * `rotation` - (rad) Corpse heading
/// * `speed` - (px/step) Scalar speed, negative when reversing
/// * `move_rotation` - (rad) Movement heading
/// * `move_x`, `move_y` - (px/step) Movement vector
/// * `speed_delta` - (px/step) Speed change of the last step
/// * `wheels_turn` - Current wheel turn in [-1.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarSnapshot {
    pub accel: bool,
    pub brake: bool,
    pub turn: f64,
    pub locked: bool,
    pub pos_x: f64,
    pub pos_y: f64,
    pub rotation: f64,
    pub speed: f64,
    pub move_rotation: f64,
    pub move_x: f64,
    pub move_y: f64,
    pub speed_delta: f64,
    pub wheels_turn: f64,
}

impl CarSnapshot {
    /// The method returns the snapshot as argument list in wire order.
    pub fn to_args(&self) -> Vec<EventValue> {
        vec![
            EventValue::Bool(self.accel),
            EventValue::Bool(self.brake),
            EventValue::Float(self.turn),
            EventValue::Bool(self.locked),
            EventValue::Float(self.pos_x),
            EventValue::Float(self.pos_y),
            EventValue::Float(self.rotation),
            EventValue::Float(self.speed),
            EventValue::Float(self.move_rotation),
            EventValue::Float(self.move_x),
            EventValue::Float(self.move_y),
            EventValue::Float(self.speed_delta),
            EventValue::Float(self.wheels_turn),
        ]
    }

    /// The method parses an argument list in wire order. Either every value is valid and a
    /// snapshot is returned, or nothing is.
    pub fn from_args(args: &[EventValue]) -> Result<CarSnapshot, SnapshotError> {
        if args.len() != CAR_STATE_ARGUMENT_COUNT {
            return Err(SnapshotError::ArgumentCount(args.len()));
        }

        let bool_at = |idx: usize| {
            args[idx].as_bool().ok_or(SnapshotError::ArgumentType {
                idx,
                expected: "bool",
                found: args[idx].type_name(),
            })
        };
        let float_at = |idx: usize| {
            args[idx].as_float().ok_or(SnapshotError::ArgumentType {
                idx,
                expected: "float",
                found: args[idx].type_name(),
            })
        };

        Ok(CarSnapshot {
            accel: bool_at(0)?,
            brake: bool_at(1)?,
            turn: float_at(2)?,
            locked: bool_at(3)?,
            pos_x: float_at(4)?,
            pos_y: float_at(5)?,
            rotation: float_at(6)?,
            speed: float_at(7)?,
            move_rotation: float_at(8)?,
            move_x: float_at(9)?,
            move_y: float_at(10)?,
            speed_delta: float_at(11)?,
            wheels_turn: float_at(12)?,
        })
    }
}
