use crate::pre::race_opts::RaceOpts;
use crate::pre::read_race_pars::RacePars;
use anyhow::Context;
use helpers::general::InputValueError;
use std::collections::HashSet;

/// check_race_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_race_opts_pars(race_opts: &RaceOpts, race_pars: &RacePars) -> anyhow::Result<()> {
    // PART 1: RACE OPTIONS
    if race_opts.watch && !(0.1 <= race_opts.realtime_factor && race_opts.realtime_factor <= 100.0)
    {
        return Err(InputValueError).context(format!(
            "realtime_factor is {:.3}, which is not within the reasonable range of [0.1, 100.0]!",
            race_opts.realtime_factor
        ));
    }

    if race_opts.max_frames < 1 {
        return Err(InputValueError).context("max_frames must be at least equal to one!");
    }

    // PART 2: RACE PARAMETERS
    check_race_pars(race_pars)
}

/// check_race_pars assures that the race parameters describe a drivable race.
pub fn check_race_pars(race_pars: &RacePars) -> anyhow::Result<()> {
    // RACE ----------------------------------------------------------------------------------------
    if race_pars.tot_no_laps < 1 {
        return Err(InputValueError).context("tot_no_laps must be at least equal to one!");
    }

    if race_pars.tot_no_laps > i32::MAX as u32 {
        return Err(InputValueError).context("tot_no_laps does not fit into a race event!");
    }

    // DRIVERS -------------------------------------------------------------------------------------
    if race_pars.drivers.is_empty() {
        return Err(InputValueError).context("There must be at least one driver!");
    }

    if race_pars.drivers.iter().any(|name| name.trim().is_empty()) {
        return Err(InputValueError).context("Driver names must not be empty!");
    }

    let mut names = HashSet::with_capacity(race_pars.drivers.len());

    for name in race_pars.drivers.iter() {
        if !names.insert(name) {
            return Err(InputValueError)
                .context(format!("Driver name {} is used more than once!", name));
        }
    }

    // LEVEL ---------------------------------------------------------------------------------------
    let level_pars = &race_pars.level;

    if level_pars.centerline.len() < 3 {
        return Err(InputValueError).context(format!(
            "The centerline of level {} must consist of at least three points!",
            level_pars.name
        ));
    }

    if level_pars.track_width <= 0.0 {
        return Err(InputValueError).context("track_width must be positive!");
    }

    if level_pars.checkpoint_spacing <= 0.0 {
        return Err(InputValueError).context("checkpoint_spacing must be positive!");
    }

    if level_pars.grass_resistance < 0.0 || level_pars.sandpits.iter().any(|s| s.resistance < 0.0)
    {
        return Err(InputValueError).context("Ground resistances must not be negative!");
    }

    if level_pars.sandpits.iter().any(|s| s.radius <= 0.0) {
        return Err(InputValueError).context("Sandpit radii must be positive!");
    }

    for slot in 1..race_pars.drivers.len() as u32 + 1 {
        if !level_pars.start_positions.iter().any(|s| s.slot == slot) {
            return Err(InputValueError).context(format!(
                "Level {} does not provide start slot {}, but {} drivers are registered!",
                level_pars.name,
                slot,
                race_pars.drivers.len()
            ));
        }
    }

    // CAR PHYSICS ---------------------------------------------------------------------------------
    let phy = &race_pars.car_physics;

    if !(0.0 < phy.air_resistance && phy.air_resistance < 1.0) {
        return Err(InputValueError).context(format!(
            "air_resistance is {:.3}, which is not within the required range (0.0, 1.0)!",
            phy.air_resistance
        ));
    }

    if phy.accel_power <= 0.0 || phy.brake_power <= 0.0 {
        return Err(InputValueError).context("accel_power and brake_power must be positive!");
    }

    if !(0.0 < phy.wheel_turn_speed && phy.wheel_turn_speed <= 1.0) {
        return Err(InputValueError)
            .context("wheel_turn_speed is not within the required range (0.0, 1.0]!");
    }

    if phy.turn_power < 0.0
        || phy.mov_align_power < 0.0
        || phy.rot_align_power < 0.0
        || phy.drift_speed_reduction < 0.0
    {
        return Err(InputValueError)
            .context("Turn, alignment and drift parameters must not be negative!");
    }

    if phy.lower_speed_align_reduction <= 0.0
        || phy.lower_speed_rotation_reduction <= 0.0
        || phy.lower_speed_turn_reduction <= 0.0
    {
        return Err(InputValueError).context("Low speed thresholds must be positive!");
    }

    // AUTOPILOT -----------------------------------------------------------------------------------
    if race_pars.autopilot.full_turn_angle <= 0.0 {
        return Err(InputValueError).context("full_turn_angle of the autopilot must be positive!");
    }

    Ok(())
}
