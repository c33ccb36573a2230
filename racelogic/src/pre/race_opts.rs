use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    version,
    name = "RACE-CORE",
    about = "Headless runner for networked top-down races"
)]
pub struct RaceOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing
    #[arg(short, long)]
    pub debug: bool,

    /// Run every driver on its own, without the relay server
    #[arg(short, long)]
    pub offline: bool,

    /// Watch the race (race is then simulated in real-time with the inserted real-time factor)
    #[arg(short, long)]
    pub watch: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the race parameter file
    #[arg(short, long)]
    pub parfile_path: PathBuf,

    /// Set real-time factor (only relevant if the race is watched)
    #[arg(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set maximum number of frames (60 per second) after which the race is aborted
    #[arg(short, long, default_value = "36000")]
    pub max_frames: u32,

    /// Set log filter, e.g. "debug" or "racelogic=trace" (overrides RUST_LOG)
    #[arg(short, long)]
    pub log_level: Option<String>,
}
