use crate::core::autopilot::Autopilot;
use crate::core::level::{Level, TrackLevel};
use crate::core::race::Race;
use crate::interfaces::render_interface::RaceState;
use crate::network::client::Client;
use crate::network::loopback::LoopbackServer;
use crate::post::race_result::RaceResult;
use crate::pre::read_race_pars::RacePars;
use anyhow::Context;
use flume::Sender;
use helpers::general::InputValueError;
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

/// (1/s) Frame rate of the game loop.
pub const FRAME_RATE: f64 = 60.0;

/// Maximum number of polling rounds while waiting for all participants to meet at the relay.
const MAX_NO_MEETING_ROUNDS: u32 = 2000;

/// handle_race creates one participant per driver, lets the autopilot drive all cars until the
/// race is finished for everybody (or the frame limit is reached), and returns the results for
/// post-processing. Unless `offline` is set, the participants are connected via an in-process
/// relay running on its own thread.
pub fn handle_race(
    race_pars: &RacePars,
    print_debug: bool,
    tx: Option<&Sender<RaceState>>,
    realtime_factor: f64,
    max_frames: u32,
    offline: bool,
) -> anyhow::Result<RaceResult> {
    if race_pars.drivers.is_empty() {
        return Err(InputValueError).context("A race needs at least one driver!");
    }

    let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&race_pars.level));
    let autopilot = Autopilot::new(&race_pars.autopilot);

    // create participants
    let mut relay = if offline {
        None
    } else {
        Some(LoopbackServer::new())
    };
    let mut races: Vec<Race> = Vec::with_capacity(race_pars.drivers.len());

    for (i, driver) in race_pars.drivers.iter().enumerate() {
        let client = relay
            .as_mut()
            .map(|relay| Client::new(Box::new(relay.endpoint()), driver));

        races.push(Race::new(
            Arc::clone(&level),
            &race_pars.car_physics,
            race_pars.tot_no_laps,
            driver,
            i as u32 + 1,
            client,
        ));
    }

    let relay_thread: Option<JoinHandle<()>> = match relay {
        Some(relay) => Some(
            thread::Builder::new()
                .name("relay".to_owned())
                .spawn(move || relay.run())
                .context("Failed to start the relay thread!")?,
        ),
        None => None,
    };

    // connect and wait until everybody knows everybody
    for race in races.iter_mut() {
        race.connect();
    }

    if races.iter().any(|race| race.is_online()) {
        let no_online = races.iter().filter(|race| race.is_online()).count();

        meet_at_relay(&mut races, "met at the relay", |race| {
            race.is_welcomed() && race.player_names().len() == no_online
        });

        // the first participant hosts and initializes everybody with its level
        if races[0].init_race() {
            meet_at_relay(&mut races, "initialized the level", |race| {
                race.is_level_confirmed()
            });
        }
    }

    // start the race -> the host triggers the start, everybody offline starts on its own
    if races[0].is_welcomed() {
        races[0].announce_race_state();
        races[0].request_start(race_pars.countdown_s);
    }

    for race in races.iter_mut().filter(|race| !race.is_welcomed()) {
        race.request_start(race_pars.countdown_s);
    }

    if let Some(tx) = tx {
        races[0].set_render_channel(tx.to_owned());
    }

    // check if sender was inserted -> in that case use real-time simulation
    let sim_realtime = tx.is_some();

    // GAME LOOP -----------------------------------------------------------------------------------
    let mut frame: u32 = 0;
    let mut t_prev_frame_ms: u64 = 0;
    let mut t_race_update_print = 0.0;

    while !races.iter().all(|race| race.all_finished()) {
        if frame >= max_frames {
            log::warn!(
                "Race aborted after {} frames, not all players finished",
                max_frames
            );
            break;
        }

        let t_start = Instant::now();

        // frame durations alternate such that they add up to exactly 1/60 s on average
        frame += 1;
        let t_frame_ms = (frame as f64 * 1000.0 / FRAME_RATE).round() as u64;
        let elapsed_ms = (t_frame_ms - t_prev_frame_ms) as u32;
        t_prev_frame_ms = t_frame_ms;

        for race in races.iter_mut() {
            if race.is_started() {
                let finished = race.local_finished();

                race.with_local_car(|car, progress| {
                    if finished {
                        car.set_acceleration(false);
                        car.set_turn(0.0);
                    } else {
                        autopilot.drive(car, progress);
                    }
                });
            }

            race.update(elapsed_ms);
        }

        // print status (with a maximum of 1 Hz)
        let racetime = races[0].racetime();

        if racetime > t_race_update_print + 0.9999 {
            let laps: Vec<String> = races
                .iter()
                .map(|race| {
                    format!(
                        "{} {}",
                        race.local_name(),
                        race.lap_number(race.local_name()).unwrap_or(0)
                    )
                })
                .collect();

            log::info!(
                "Simulating... Current race time is {:.3}s, completed laps: {}",
                racetime,
                laps.join(", ")
            );
            t_race_update_print = racetime;
        }

        // sleep until frame is finished in real-time as well (calculation in ms)
        if sim_realtime {
            let t_sleep =
                (elapsed_ms as f64 / realtime_factor) as i64 - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                log::warn!("Could not keep up with real-time!")
            }
        }
    }

    // print debug information if indicated
    if print_debug {
        for race in races.iter() {
            log::info!(
                "DEBUG: {} ran {} frames, saw players [{}] on level {} with {} checkpoints",
                race.local_name(),
                frame,
                race.player_names().join(", "),
                race.level().name(),
                race.level().checkpoints().len()
            );
        }
    }

    // every participant is the authority for its own lap times
    let lap_racetimes: Vec<Vec<f64>> = races.iter().map(|race| race.local_lap_racetimes()).collect();
    let result = RaceResult::new(
        race_pars.tot_no_laps,
        race_pars.drivers.to_owned(),
        &lap_racetimes,
    );

    // shut down, the relay stops as soon as all endpoints are gone
    for race in races.iter_mut() {
        race.disconnect();
    }
    drop(races);

    if let Some(relay_thread) = relay_thread {
        relay_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Relay thread panicked!"))?;
    }

    Ok(result)
}

/// meet_at_relay processes incoming events until the inserted condition holds for every online
/// participant (or the maximum number of rounds is reached).
fn meet_at_relay(races: &mut [Race], what: &str, condition: impl Fn(&Race) -> bool) {
    for _ in 0..MAX_NO_MEETING_ROUNDS {
        for race in races.iter_mut() {
            race.update(0);
        }

        if races
            .iter()
            .filter(|race| race.is_online())
            .all(|race| condition(race))
        {
            log::info!("All online participants {}", what);
            return;
        }

        sleep(Duration::from_millis(1));
    }

    log::warn!("Not all online participants {}, starting anyway", what);
}
