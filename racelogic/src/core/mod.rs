pub mod autopilot;
pub mod car;
pub mod collision;
pub mod handle_race;
pub mod level;
pub mod progress;
pub mod race;
