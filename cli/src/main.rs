use clap::Parser;
use flume::Receiver;
use racelogic::interfaces::render_interface::RaceState;
use racelogic::post::race_result::RaceResult;
use racelogic::pre::check_race_pars::check_race_opts_pars;
use racelogic::pre::race_opts::RaceOpts;
use racelogic::pre::read_race_pars::read_race_pars;
use std::thread;
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// (s) Minimum race time between two printed standings in watch mode.
const STANDINGS_PRINT_INTERVAL: f64 = 1.0;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get race options from the command line arguments and set up logging
    let race_opts: RaceOpts = RaceOpts::parse();
    init_logging(race_opts.log_level.as_deref());

    // read and check race parameters
    let race_pars = read_race_pars(race_opts.parfile_path.as_path())?;
    check_race_opts_pars(&race_opts, &race_pars)?;

    log::info!(
        "Racing {} laps on level {} with {} drivers ({})",
        race_pars.tot_no_laps,
        race_pars.level.name,
        race_pars.drivers.len(),
        if race_opts.offline {
            "offline"
        } else {
            "via relay"
        }
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    let race_result: RaceResult = if !race_opts.watch {
        // HEADLESS CASE ---------------------------------------------------------------------------
        racelogic::core::handle_race::handle_race(
            &race_pars,
            race_opts.debug,
            None,
            1.0,
            race_opts.max_frames,
            race_opts.offline,
        )?
    } else {
        // WATCH CASE ------------------------------------------------------------------------------
        // create channel for communication between console renderer and race
        let (tx, rx) = flume::unbounded();

        // the race runs in real-time on a separate thread -> options and parameters are moved
        let race_opts_thread = race_opts.clone();
        let race_pars_thread = race_pars.clone();

        let race_thread = thread::Builder::new()
            .name("race".to_owned())
            .spawn(move || {
                racelogic::core::handle_race::handle_race(
                    &race_pars_thread,
                    race_opts_thread.debug,
                    Some(&tx),
                    race_opts_thread.realtime_factor,
                    race_opts_thread.max_frames,
                    race_opts_thread.offline,
                )
            })?;

        // render until the race drops its sender
        print_standings(&rx);

        race_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Race thread panicked!"))??
    };

    log::info!(
        "Execution time (total): {}ms",
        t_start.elapsed().as_millis()
    );

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_lap_and_race_times();

    Ok(())
}

/// init_logging installs the console subscriber. The filter is taken from the command line,
/// then from RUST_LOG, and falls back to "info".
fn init_logging(log_level: Option<&str>) {
    let env_filter = match log_level {
        Some(filter_str) => EnvFilter::new(filter_str),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .init();
}

/// print_standings is a minimal console renderer: it prints the countdown and the order of the
/// cars by race progress.
fn print_standings(rx: &Receiver<RaceState>) {
    let mut t_last_print: Option<f64> = None;
    let mut countdown_last_print: Option<u32> = None;

    for race_state in rx.iter() {
        if let Some(countdown) = race_state.countdown {
            if let Some(countdown_s) = countdown_to_print(countdown, countdown_last_print) {
                println!("COUNTDOWN: {}", countdown_s);
                countdown_last_print = Some(countdown_s);
            }
            continue;
        }

        if t_last_print.map_or(false, |t| race_state.racetime < t + STANDINGS_PRINT_INTERVAL) {
            continue;
        }
        t_last_print = Some(race_state.racetime);

        let mut car_views = race_state.car_views.to_owned();
        car_views.sort_by(|a, b| {
            b.race_prog
                .partial_cmp(&a.race_prog)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        println!(
            "STANDINGS: {:.1}s (race over {} laps)",
            race_state.racetime, race_state.tot_no_laps
        );

        for (pos, car_view) in car_views.iter().enumerate() {
            println!(
                "{:3}. {:<12} lap {:>2}, {:6.1}km/h{}{}",
                pos + 1,
                car_view.owner,
                (car_view.lap_num + 1).min(race_state.tot_no_laps),
                car_view.speed_kmh,
                if car_view.drifting { ", drifting" } else { "" },
                if car_view.finished { ", finished" } else { "" },
            );
        }
    }
}

/// countdown_to_print returns the whole seconds left if they differ from the last printed value.
fn countdown_to_print(countdown: f64, last_printed: Option<u32>) -> Option<u32> {
    let countdown_s = countdown.max(0.0).ceil() as u32;

    if last_printed == Some(countdown_s) {
        None
    } else {
        Some(countdown_s)
    }
}

#[cfg(test)]
mod cli_tests {
    use crate::countdown_to_print;

    #[test]
    fn test_countdown_printed_once_per_second() {
        let mut printed = vec![];
        let mut last = None;

        // render updates at 20 Hz during a three second countdown
        for i in 0..60 {
            if let Some(countdown_s) = countdown_to_print(3.0 - i as f64 * 0.05, last) {
                printed.push(countdown_s);
                last = Some(countdown_s);
            }
        }

        assert_eq!(printed, vec![3, 2, 1]);
    }
}
