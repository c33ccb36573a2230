use crate::core::car::{Car, CarEvent, CarPhysicsPars};
use crate::core::collision::colliding_bounds;
use crate::core::level::Level;
use crate::core::progress::{Progress, ProgressUpdate};
use crate::interfaces::render_interface::{CarView, RaceState, MAX_RENDER_UPDATE_FREQUENCY};
use crate::network::car_state::CarSnapshot;
use crate::network::client::{Client, ClientEvent};
use crate::network::event::{Event, EventValue};
use crate::network::events;
use crate::post::race_result::RaceResult;
use flume::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// (ms) Countdown duration if the start request does not contain one.
pub const DEFAULT_COUNTDOWN_MS: u32 = 3000;

/// Start slot used for remote cars until their first state arrives.
const REMOTE_START_SLOT: u32 = 0;

#[derive(Debug)]
pub struct RacePlayer {
    pub name: String,
    pub car: Car,
    pub is_local: bool,
    pub finished: bool,
    pub finish_time_ms: Option<u64>,
    lap_racetimes_ms: Vec<u64>,
}

impl RacePlayer {
    fn new(car: Car, is_local: bool) -> RacePlayer {
        RacePlayer {
            name: car.owner().to_owned(),
            car,
            is_local,
            finished: false,
            finish_time_ms: None,
            lap_racetimes_ms: vec![],
        }
    }
}

/// RaceWorld contains everything that is guarded by the race lock.
#[derive(Debug)]
struct RaceWorld {
    players: Vec<RacePlayer>,
    progress: Progress,
}

impl RaceWorld {
    fn find_player_mut(&mut self, name: &str) -> Option<&mut RacePlayer> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    fn join(&mut self, name: &str, car_pars: &CarPhysicsPars, level: &dyn Level) -> bool {
        if self.players.iter().any(|p| p.name == name) {
            return false;
        }

        let mut car = Car::new(name, car_pars);
        car.set_start_position(level, REMOTE_START_SLOT);
        self.progress.add_car(&car);
        self.players.push(RacePlayer::new(car, false));

        log::info!("Player {} joined the race", name);
        true
    }

    fn leave(&mut self, name: &str) -> bool {
        let idx = match self.players.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => return false,
        };

        if self.players[idx].is_local {
            log::warn!("The local player {} cannot leave its own race", name);
            return false;
        }

        let player = self.players.remove(idx);
        self.progress.remove_car(&player.car);

        log::info!("Player {} left the race", name);
        true
    }
}

fn lock_world(world: &Mutex<RaceWorld>) -> MutexGuard<'_, RaceWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// RaceHandle allows other threads (e.g. a transport thread) to change the player collection of
/// a race. It uses the same lock as the frame update.
#[derive(Debug, Clone)]
pub struct RaceHandle {
    world: Arc<Mutex<RaceWorld>>,
    level: Arc<dyn Level>,
    car_pars: CarPhysicsPars,
}

impl RaceHandle {
    pub fn join_player(&self, name: &str) -> bool {
        lock_world(&self.world).join(name, &self.car_pars, self.level.as_ref())
    }

    pub fn leave_player(&self, name: &str) -> bool {
        lock_world(&self.world).leave(name)
    }

    pub fn player_names(&self) -> Vec<String> {
        lock_world(&self.world)
            .players
            .iter()
            .map(|p| p.name.to_owned())
            .collect()
    }
}

/// Race is the view of a single participant: its local car, the replicas of all remote cars,
/// and the progress of everybody. It is updated once per frame by the game loop.
#[derive(Debug)]
pub struct Race {
    level: Arc<dyn Level>,
    world: Arc<Mutex<RaceWorld>>,
    car_pars: CarPhysicsPars,
    local_name: String,
    client: Option<Client>,
    car_events_rx: Receiver<CarEvent>,
    render_tx: Option<Sender<RaceState>>,
    pub tot_no_laps: u32,
    cur_racetime_ms: u64,
    countdown_ms: Option<u32>,
    level_confirmed: bool,
    started: bool,
    t_total_ms: u64,
    t_last_render_ms: Option<u64>,
}

impl Race {
    pub fn new(
        level: Arc<dyn Level>,
        car_pars: &CarPhysicsPars,
        tot_no_laps: u32,
        local_name: &str,
        start_slot: u32,
        client: Option<Client>,
    ) -> Race {
        let mut progress = Progress::new();
        progress.initialize(level.as_ref());

        // local car waits locked for the race start
        let (car_events_tx, car_events_rx) = flume::unbounded();
        let mut car = Car::new(local_name, car_pars);
        car.set_start_position(level.as_ref(), start_slot);
        car.subscribe(car_events_tx);
        car.set_locked(true);
        progress.add_car(&car);

        Race {
            level,
            world: Arc::new(Mutex::new(RaceWorld {
                players: vec![RacePlayer::new(car, true)],
                progress,
            })),
            car_pars: car_pars.to_owned(),
            local_name: local_name.to_owned(),
            client,
            car_events_rx,
            render_tx: None,
            tot_no_laps,
            cur_racetime_ms: 0,
            countdown_ms: None,
            level_confirmed: false,
            started: false,
            t_total_ms: 0,
            t_last_render_ms: None,
        }
    }

    pub fn handle(&self) -> RaceHandle {
        RaceHandle {
            world: Arc::clone(&self.world),
            level: Arc::clone(&self.level),
            car_pars: self.car_pars.to_owned(),
        }
    }

    /// The method registers a channel that receives the race state for rendering.
    pub fn set_render_channel(&mut self, tx: Sender<RaceState>) {
        self.render_tx = Some(tx);
    }

    // CONNECTION ----------------------------------------------------------------------------------
    /// connect starts the connection attempt of the client. If it fails, the race continues
    /// offline and false is returned.
    pub fn connect(&mut self) -> bool {
        let connected = match self.client.as_mut() {
            Some(client) => client.connect(),
            None => false,
        };

        if !connected && self.client.is_some() {
            log::warn!("{} continues offline", self.local_name);
            self.client = None;
        }

        connected
    }

    pub fn disconnect(&mut self) {
        if let Some(client) = self.client.as_mut() {
            client.disconnect();
        }
    }

    pub fn is_online(&self) -> bool {
        self.client.as_ref().map_or(false, |c| c.is_connected())
    }

    pub fn is_welcomed(&self) -> bool {
        self.client.as_ref().map_or(false, |c| c.is_welcomed())
    }

    fn send_event(&self, event: &Event) -> bool {
        match &self.client {
            Some(client) => client.send(event),
            None => false,
        }
    }

    // RACE CONTROL --------------------------------------------------------------------------------
    /// The method asks the server to initialize all participants with the own level.
    pub fn init_race(&self) -> bool {
        let mut event = Event::new(events::GENERAL_INIT_RACE);
        event.add_arg(self.level.name());
        self.send_event(&event)
    }

    /// The method returns whether the server confirmed the level of this participant.
    pub fn is_level_confirmed(&self) -> bool {
        self.level_confirmed
    }

    /// The method asks all participants to start the race after the inserted countdown. Offline,
    /// the countdown is started directly.
    pub fn request_start(&mut self, countdown_s: u32) {
        if self.is_welcomed() {
            let mut event = Event::new(events::RACE_TRIGGER_RACE_START);
            event.add_arg(countdown_s as i32);
            self.send_event(&event);
        } else {
            self.start_countdown(countdown_s * 1000);
        }
    }

    /// The method publishes the number of laps to all participants.
    pub fn announce_race_state(&self) -> bool {
        let mut event = Event::new(events::RACE_RACE_STATE);
        event.add_arg(self.tot_no_laps as i32);
        self.send_event(&event)
    }

    pub fn start_countdown(&mut self, duration_ms: u32) {
        log::info!("{}: countdown of {}ms started", self.local_name, duration_ms);
        self.countdown_ms = Some(duration_ms);
    }

    fn lock_input(&mut self, world: &mut RaceWorld) {
        self.started = false;
        self.countdown_ms = None;

        if let Some(player) = world.find_player_mut(&self.local_name) {
            player.car.set_locked(true);
        }
    }

    fn update_countdown(&mut self, world: &mut RaceWorld, elapsed_ms: u32) {
        if let Some(left_ms) = self.countdown_ms {
            if elapsed_ms >= left_ms {
                self.countdown_ms = None;
                self.started = true;

                if let Some(player) = world.find_player_mut(&self.local_name) {
                    player.car.set_locked(false);
                }
                log::info!("{}: race started", self.local_name);
            } else {
                self.countdown_ms = Some(left_ms - elapsed_ms);
            }
        }
    }

    // UPDATE --------------------------------------------------------------------------------------
    /// The method advances the race by the inserted time. Incoming events are processed first,
    /// then all cars are stepped, collided and tracked, and finally the own state changes are
    /// sent and the renderer is fed.
    pub fn update(&mut self, elapsed_ms: u32) {
        let world = Arc::clone(&self.world);
        let mut world = lock_world(&world);

        // inbound events
        let inbound = match self.client.as_mut() {
            Some(client) => client.poll(),
            None => vec![],
        };

        for client_event in inbound {
            self.handle_client_event(&mut world, client_event);
        }

        self.update_countdown(&mut world, elapsed_ms);
        self.t_total_ms += elapsed_ms as u64;

        if self.started {
            self.cur_racetime_ms += elapsed_ms as u64;
        }

        let mut local_finished = false;

        {
            let RaceWorld { players, progress } = &mut *world;

            // physics
            for player in players.iter_mut() {
                let resistance = self.level.resistance(&player.car.position());
                player.car.set_ground_resistance(resistance);
                player.car.update(elapsed_ms);

                for bound in colliding_bounds(&player.car, self.level.as_ref()) {
                    player.car.perform_bound_collision(bound);
                }
            }

            // progress and finish
            for player in players.iter_mut() {
                if progress.update(&player.car) == ProgressUpdate::NewLap {
                    player.lap_racetimes_ms.push(self.cur_racetime_ms);
                    log::debug!(
                        "{}: {} completed lap {} at {:.3}s",
                        self.local_name,
                        player.name,
                        progress.lap_number(&player.car),
                        self.cur_racetime_ms as f64 / 1000.0
                    );
                }

                if !player.finished && progress.lap_number(&player.car) >= self.tot_no_laps {
                    player.finished = true;
                    player.finish_time_ms = Some(self.cur_racetime_ms);
                    local_finished |= player.is_local;
                }
            }
        }

        // outgoing state changes
        let car_events: Vec<CarEvent> = self.car_events_rx.try_iter().collect();

        for car_event in car_events {
            match car_event {
                CarEvent::InputChanged { owner } => {
                    if owner == self.local_name {
                        self.send_local_car_state(&mut world);
                    }
                }
            }
        }

        if local_finished {
            log::info!(
                "{} finished after {:.3}s",
                self.local_name,
                self.cur_racetime_ms as f64 / 1000.0
            );

            let mut event = Event::new(events::RACE_PLAYER_FINISHED);
            event.add_arg(self.local_name.as_str());
            event.add_arg(self.cur_racetime_ms.min(i32::MAX as u64) as i32);
            self.send_event(&event);
        }

        // render
        self.feed_renderer(&world);
    }

    fn feed_renderer(&mut self, world: &RaceWorld) {
        let tx = match &self.render_tx {
            Some(tx) => tx,
            None => return,
        };

        let min_interval_ms = (1000.0 / MAX_RENDER_UPDATE_FREQUENCY) as u64;

        if let Some(t_last) = self.t_last_render_ms {
            if self.t_total_ms < t_last + min_interval_ms {
                return;
            }
        }

        if tx.send(self.race_state_of(world)).is_err() {
            log::warn!("Renderer is gone, stop sending race states");
            self.render_tx = None;
        }

        self.t_last_render_ms = Some(self.t_total_ms);
    }

    // EVENTS --------------------------------------------------------------------------------------
    fn handle_client_event(&mut self, world: &mut RaceWorld, client_event: ClientEvent) {
        match client_event {
            ClientEvent::Welcomed => {
                // announce own start position
                self.send_local_car_state(world);
            }
            ClientEvent::PlayerConnected(name) => {
                if name != self.local_name {
                    world.join(&name, &self.car_pars, self.level.as_ref());
                    self.send_local_car_state(world);
                }
            }
            ClientEvent::PlayerDisconnected(name) => {
                world.leave(&name);
            }
            ClientEvent::InitRace(level_name) => {
                self.level_confirmed = level_name == self.level.name();

                if self.level_confirmed {
                    log::info!("{}: race initialized with level {}", self.local_name, level_name);
                } else {
                    log::warn!(
                        "{}: server initialized level {}, but {} is loaded",
                        self.local_name,
                        level_name,
                        self.level.name()
                    );
                }
            }
            ClientEvent::Race(event) => self.handle_race_event(world, &event),
            ClientEvent::ConnectionLost => {
                log::warn!("{}: connection lost, continuing offline", self.local_name);
                self.client = None;
            }
        }
    }

    fn handle_race_event(&mut self, world: &mut RaceWorld, event: &Event) {
        match event.name() {
            events::RACE_CAR_STATE_CHANGE => apply_car_state_event(world, event),
            events::RACE_LOCK_CAR => self.lock_input(world),
            events::RACE_START_COUNTDOWN => self.start_countdown(DEFAULT_COUNTDOWN_MS),
            events::RACE_TRIGGER_RACE_START => match event.arg(0).and_then(EventValue::as_int) {
                Some(countdown_s) if countdown_s >= 0 => {
                    self.start_countdown(countdown_s as u32 * 1000)
                }
                _ => log::warn!("Dropping {}, invalid countdown", event),
            },
            events::RACE_RACE_STATE => match event.arg(0).and_then(EventValue::as_int) {
                Some(laps) if laps >= 1 => self.tot_no_laps = laps as u32,
                _ => log::warn!("Dropping {}, invalid number of laps", event),
            },
            events::RACE_PLAYER_FINISHED => {
                let name = event.arg(0).and_then(EventValue::as_str);
                let time_ms = event.arg(1).and_then(EventValue::as_int);

                match (name, time_ms) {
                    (Some(name), Some(time_ms)) if name != self.local_name => {
                        match world.find_player_mut(name) {
                            Some(player) => {
                                player.finished = true;
                                player.finish_time_ms = Some(time_ms.max(0) as u64);
                            }
                            None => log::warn!("Finished player {} not found", name),
                        }
                    }
                    (Some(_), Some(_)) => {}
                    _ => log::warn!("Dropping malformed event {}", event),
                }
            }
            _ => log::warn!("{}: unhandled race event {}", self.local_name, event),
        }
    }

    fn send_local_car_state(&self, world: &mut RaceWorld) {
        if let Some(player) = world.find_player_mut(&self.local_name) {
            self.send_event(&build_car_state_event(&player.car));
        }
    }

    // LOCAL CAR -----------------------------------------------------------------------------------
    /// The method gives access to the local car (e.g. for applying inputs) under the race lock.
    pub fn with_local_car<R>(&self, f: impl FnOnce(&mut Car, &Progress) -> R) -> Option<R> {
        let mut world = lock_world(&self.world);
        let RaceWorld { players, progress } = &mut *world;

        players
            .iter_mut()
            .find(|p| p.is_local)
            .map(|p| f(&mut p.car, progress))
    }

    // GETTERS -------------------------------------------------------------------------------------
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn level(&self) -> &dyn Level {
        self.level.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// (s)
    pub fn racetime(&self) -> f64 {
        self.cur_racetime_ms as f64 / 1000.0
    }

    pub fn player_names(&self) -> Vec<String> {
        self.handle().player_names()
    }

    pub fn car_snapshot(&self, name: &str) -> Option<CarSnapshot> {
        lock_world(&self.world)
            .players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.car.prepare_car_state())
    }

    pub fn lap_number(&self, name: &str) -> Option<u32> {
        let world = lock_world(&self.world);
        world
            .players
            .iter()
            .find(|p| p.name == name)
            .map(|p| world.progress.lap_number(&p.car))
    }

    pub fn local_finished(&self) -> bool {
        lock_world(&self.world)
            .players
            .iter()
            .any(|p| p.is_local && p.finished)
    }

    pub fn all_finished(&self) -> bool {
        let world = lock_world(&self.world);
        !world.players.is_empty() && world.players.iter().all(|p| p.finished)
    }

    pub fn race_state(&self) -> RaceState {
        self.race_state_of(&lock_world(&self.world))
    }

    fn race_state_of(&self, world: &RaceWorld) -> RaceState {
        RaceState {
            racetime: self.racetime(),
            tot_no_laps: self.tot_no_laps,
            countdown: self.countdown_ms.map(|ms| ms as f64 / 1000.0),
            car_views: world
                .players
                .iter()
                .map(|p| CarView {
                    owner: p.name.to_owned(),
                    position: p.car.position(),
                    rotation_deg: p.car.rotation().to_degrees(),
                    speed_kmh: p.car.speed_kmh(),
                    drifting: p.car.is_drifting(),
                    lap_num: world.progress.lap_number(&p.car),
                    race_prog: world.progress.race_progress(&p.car),
                    finished: p.finished,
                })
                .collect(),
        }
    }

    /// (s) Race times at which the local player completed its laps.
    pub fn local_lap_racetimes(&self) -> Vec<f64> {
        lock_world(&self.world)
            .players
            .iter()
            .find(|p| p.is_local)
            .map(|p| {
                p.lap_racetimes_ms
                    .iter()
                    .map(|&t| t as f64 / 1000.0)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The method returns the lap and race times of all players as seen by this participant.
    pub fn race_result(&self) -> RaceResult {
        let world = lock_world(&self.world);

        let names = world.players.iter().map(|p| p.name.to_owned()).collect();
        let lap_racetimes: Vec<Vec<f64>> = world
            .players
            .iter()
            .map(|p| {
                p.lap_racetimes_ms
                    .iter()
                    .map(|&t| t as f64 / 1000.0)
                    .collect()
            })
            .collect();

        RaceResult::new(self.tot_no_laps, names, &lap_racetimes)
    }
}

/// build_car_state_event creates the state change event of the car, tagged with its owner.
pub fn build_car_state_event(car: &Car) -> Event {
    let mut args = vec![EventValue::from(car.owner())];
    args.extend(car.serialize());
    Event::with_args(events::RACE_CAR_STATE_CHANGE, args)
}

/// apply_car_state_event applies a received state change to the car of the named player. The
/// echo of the local car only corrects its motion, the local inputs stay as they are. Unknown
/// players and malformed states are logged and ignored.
fn apply_car_state_event(world: &mut RaceWorld, event: &Event) {
    let name = match event.arg(0).and_then(EventValue::as_str) {
        Some(name) => name,
        None => {
            log::warn!("Dropping car state without player name: {}", event);
            return;
        }
    };

    match world.find_player_mut(name) {
        Some(player) => {
            // errors are logged by the car, nothing was applied in that case
            let _ = if player.is_local {
                player.car.deserialize_echo(&event.args()[1..])
            } else {
                player.car.deserialize(&event.args()[1..])
            };
        }
        None => log::warn!("Remote player {} not found, ignoring its car state", name),
    }
}
