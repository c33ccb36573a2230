use crate::core::autopilot::AutopilotPars;
use crate::core::car::CarPhysicsPars;
use crate::core::level::LevelPars;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

fn default_countdown_s() -> u32 {
    3
}

/// * `tot_no_laps` - Total number of laps in the race
/// * `countdown_s` - (s) Countdown before the race starts
/// * `drivers` - Names of the participating players, the n-th driver starts from slot n
/// * `level` - Level the race is driven on
/// * `car_physics` - Physics tuning of the cars (optional)
/// * `autopilot` - Tuning of the autopilot that drives the cars (optional)
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    pub tot_no_laps: u32,
    #[serde(default = "default_countdown_s")]
    pub countdown_s: u32,
    pub drivers: Vec<String>,
    pub level: LevelPars,
    #[serde(default)]
    pub car_physics: CarPhysicsPars,
    #[serde(default)]
    pub autopilot: AutopilotPars,
}

/// read_race_pars reads the JSON file and decodes the JSON string into the race parameters
/// struct.
pub fn read_race_pars(filepath: &Path) -> anyhow::Result<RacePars> {
    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
