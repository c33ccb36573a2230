use crate::network::car_state::CAR_STATE_ARGUMENT_COUNT;
use crate::network::event::Event;

// GENERAL -----------------------------------------------------------------------------------------
/// client -> server: `[player name]`
pub const GENERAL_HI: &str = "general:hi";
/// server -> client: `[]`
pub const GENERAL_WELCOME: &str = "general:welcome";
/// server -> clients: `[player name]`
pub const GENERAL_PLAYER_CONNECTED: &str = "general:player_connected";
/// server -> clients: `[player name]`
pub const GENERAL_PLAYER_DISCONNECTED: &str = "general:player_disconnected";
/// host -> server -> clients: `[level name]`
pub const GENERAL_INIT_RACE: &str = "general:init_race";

// RACE --------------------------------------------------------------------------------------------
/// `[player name, 13 car state values]`
pub const RACE_CAR_STATE_CHANGE: &str = "race:car_state_change";
/// `[countdown duration in s]`
pub const RACE_TRIGGER_RACE_START: &str = "race:trigger_race_start";
/// `[]`
pub const RACE_LOCK_CAR: &str = "race:lock_car";
/// `[]`
pub const RACE_START_COUNTDOWN: &str = "race:start_countdown";
/// `[total number of laps]`
pub const RACE_RACE_STATE: &str = "race:race_state";
/// `[player name, race time in ms]`
pub const RACE_PLAYER_FINISHED: &str = "race:player_finished";

pub const SCOPE_GENERAL: &str = "general";
pub const SCOPE_RACE: &str = "race";

/// expected_arg_count returns the fixed number of arguments of a known event kind (None for
/// unknown kinds).
pub fn expected_arg_count(name: &str) -> Option<usize> {
    match name {
        GENERAL_HI => Some(1),
        GENERAL_WELCOME => Some(0),
        GENERAL_PLAYER_CONNECTED => Some(1),
        GENERAL_PLAYER_DISCONNECTED => Some(1),
        GENERAL_INIT_RACE => Some(1),
        RACE_CAR_STATE_CHANGE => Some(1 + CAR_STATE_ARGUMENT_COUNT),
        RACE_TRIGGER_RACE_START => Some(1),
        RACE_LOCK_CAR => Some(0),
        RACE_START_COUNTDOWN => Some(0),
        RACE_RACE_STATE => Some(1),
        RACE_PLAYER_FINISHED => Some(2),
        _ => None,
    }
}

/// has_expected_arg_count checks a received event against the layout of its kind. Unknown kinds
/// are reported as not matching.
pub fn has_expected_arg_count(event: &Event) -> bool {
    expected_arg_count(event.name()) == Some(event.arg_count())
}
