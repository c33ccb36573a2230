pub mod core;
pub mod interfaces;
pub mod network;
pub mod post;
pub mod pre;

#[cfg(test)]
mod test_support {
    use crate::core::level::{Bound, Checkpoint, Level, LevelPars, StartPosition};
    use crate::network::loopback::LoopbackServer;
    use crate::pre::read_race_pars::{read_race_pars, RacePars};
    use helpers::angle::Angle;
    use helpers::geometry::Point2d;
    use std::path::Path;

    /// LineLevel has n checkpoints on the x axis, 100 px apart, and no resistance anywhere.
    #[derive(Debug)]
    pub struct LineLevel {
        pub checkpoints: Vec<Checkpoint>,
        pub bounds: Vec<Bound>,
    }

    impl LineLevel {
        pub fn new(no_checkpoints: usize) -> LineLevel {
            LineLevel {
                checkpoints: (0..no_checkpoints)
                    .map(|idx| Checkpoint {
                        idx,
                        position: Point2d::new(idx as f64 * 100.0, 0.0),
                    })
                    .collect(),
                bounds: vec![],
            }
        }
    }

    impl Level for LineLevel {
        fn name(&self) -> &str {
            "line"
        }
        fn resistance(&self, _point: &Point2d) -> f64 {
            0.0
        }
        fn bounds(&self) -> &[Bound] {
            &self.bounds
        }
        fn checkpoints(&self) -> &[Checkpoint] {
            &self.checkpoints
        }
        fn start_position(&self, slot: u32) -> StartPosition {
            StartPosition {
                position: Point2d::new(0.0, slot as f64 * 50.0),
                heading: Angle::ZERO,
            }
        }
    }

    pub fn oval_race_pars() -> RacePars {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../input/parameters/race_pars_oval.json");
        read_race_pars(&path).unwrap()
    }

    pub fn oval_level_pars() -> LevelPars {
        oval_race_pars().level
    }

    /// pump_all lets relay and participants exchange messages until nothing is left to do.
    pub fn pump_all(relay: &mut LoopbackServer, races: &mut [&mut crate::core::race::Race]) {
        for _ in 0..20 {
            for race in races.iter_mut() {
                race.update(0);
            }
            if relay.pump() == 0 {
                for race in races.iter_mut() {
                    race.update(0);
                }
                if relay.pump() == 0 {
                    return;
                }
            }
        }
    }
}





#[cfg(test)]
mod network_tests {
    use crate::core::car::{Car, CarPhysicsPars};
    use crate::network::car_state::{CarSnapshot, SnapshotError};
    use crate::network::client::{Client, ClientEvent, ConnectionState};
    use crate::network::event::{Event, EventValue};
    use crate::network::events;
    use crate::network::loopback::LoopbackServer;
    use crate::network::transport::{
        ChannelTransport, ClientMessage, ServerMessage, Transport, TransportError, TransportSignal,
    };
    use helpers::geometry::Point2d;

    fn welcomed_client(relay: &mut LoopbackServer, name: &str) -> Client {
        let mut client = Client::new(Box::new(relay.endpoint()), name);
        assert!(client.connect());
        relay.pump();
        client.poll();
        relay.pump();
        assert_eq!(client.poll().first(), Some(&ClientEvent::Welcomed));
        client
    }

    #[test]
    fn test_event_codec_keeps_floats() {
        let mut car = Car::new("a", &CarPhysicsPars::default());
        car.set_position(Point2d::new(0.1 + 0.2, 1.0 / 3.0));
        car.set_acceleration(true);
        car.set_turn(0.3);
        car.update(500);

        let mut args = vec![EventValue::from("a")];
        args.extend(car.serialize());
        let event = Event::with_args(events::RACE_CAR_STATE_CHANGE, args);

        let decoded = Event::decode(&event.encode().unwrap()).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.scope(), "race");
        assert!(events::has_expected_arg_count(&decoded));
    }

    #[test]
    fn test_event_decode_errors() {
        assert!(Event::decode("{not json").is_err());
        assert!(Event::decode(r#"{"name": "hello", "args": []}"#).is_err());

        let event = Event::decode(r#"{"name": "race:lock_car"}"#).unwrap();
        assert_eq!(event.arg_count(), 0);
    }

    #[test]
    fn test_expected_arg_count() {
        let mut event = Event::new(events::RACE_PLAYER_FINISHED);
        event.add_arg("a");
        assert!(!events::has_expected_arg_count(&event));
        event.add_arg(1234);
        assert!(events::has_expected_arg_count(&event));

        assert!(!events::has_expected_arg_count(&Event::new("race:unknown")));
    }

    #[test]
    fn test_snapshot_type_check() {
        let mut args = CarSnapshot::default().to_args();
        args[0] = EventValue::Float(1.0);

        assert_eq!(
            CarSnapshot::from_args(&args),
            Err(SnapshotError::ArgumentType {
                idx: 0,
                expected: "bool",
                found: "float"
            })
        );
    }

    #[test]
    fn test_client_lifecycle() {
        let mut relay = LoopbackServer::new();
        let mut client = Client::new(Box::new(relay.endpoint()), "a");
        assert_eq!(client.state(), ConnectionState::Disconnected);

        assert!(client.connect());
        assert_eq!(client.state(), ConnectionState::Connecting);

        // not welcomed yet -> nothing is sent
        assert!(!client.send(&Event::new(events::RACE_LOCK_CAR)));

        relay.pump();
        assert!(client.poll().is_empty());
        relay.pump();
        assert_eq!(client.poll(), vec![ClientEvent::Welcomed]);
        assert!(client.is_welcomed());
        assert_eq!(relay.player_names(), vec!["a".to_owned()]);

        client.disconnect();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        relay.pump();
        assert!(relay.player_names().is_empty());
    }

    #[test]
    fn test_connect_without_relay() {
        let mut relay = LoopbackServer::new();
        let mut endpoint = relay.endpoint();
        let endpoint_2 = relay.endpoint();
        drop(relay);

        assert!(endpoint.connect().is_err());

        let mut client = Client::new(Box::new(endpoint_2), "a");
        assert!(!client.connect());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connection_lost() {
        let mut relay = LoopbackServer::new();
        let mut client = welcomed_client(&mut relay, "a");
        drop(relay);

        assert_eq!(client.poll(), vec![ClientEvent::ConnectionLost]);
        assert!(!client.is_connected());
        assert!(!client.send(&Event::new(events::RACE_LOCK_CAR)));
    }

    #[test]
    fn test_relay_announces_players() {
        let mut relay = LoopbackServer::new();
        let mut client_a = welcomed_client(&mut relay, "a");
        let mut client_b = Client::new(Box::new(relay.endpoint()), "b");
        client_b.connect();
        relay.pump();
        client_b.poll();
        relay.pump();

        assert_eq!(
            client_b.poll(),
            vec![
                ClientEvent::Welcomed,
                ClientEvent::PlayerConnected("a".to_owned())
            ]
        );
        assert_eq!(
            client_a.poll(),
            vec![ClientEvent::PlayerConnected("b".to_owned())]
        );

        // race events are echoed to everybody, including the sender
        let mut event = Event::new(events::RACE_RACE_STATE);
        event.add_arg(5);
        assert!(client_a.send(&event));
        relay.pump();
        assert_eq!(client_a.poll(), vec![ClientEvent::Race(event.clone())]);
        assert_eq!(client_b.poll(), vec![ClientEvent::Race(event)]);

        client_b.disconnect();
        relay.pump();
        assert_eq!(
            client_a.poll(),
            vec![ClientEvent::PlayerDisconnected("b".to_owned())]
        );
    }

    #[test]
    fn test_relay_broadcasts_init_race() {
        let mut relay = LoopbackServer::new();
        let client_a = welcomed_client(&mut relay, "a");
        let mut client_b = welcomed_client(&mut relay, "b");

        let mut event = Event::new(events::GENERAL_INIT_RACE);
        event.add_arg("oval");
        assert!(client_a.send(&event));
        relay.pump();

        assert_eq!(
            client_b.poll(),
            vec![ClientEvent::InitRace("oval".to_owned())]
        );
    }

    #[test]
    fn test_relay_drops_malformed_events() {
        let mut relay = LoopbackServer::new();
        let mut client_a = welcomed_client(&mut relay, "a");

        // car state without its values
        let mut event = Event::new(events::RACE_CAR_STATE_CHANGE);
        event.add_arg("a");
        assert!(client_a.send(&event));
        relay.pump();

        assert!(client_a.poll().is_empty());
    }

    #[test]
    fn test_relay_refuses_duplicate_names() {
        let mut relay = LoopbackServer::new();
        let _client_a = welcomed_client(&mut relay, "a");

        let mut client_b = Client::new(Box::new(relay.endpoint()), "a");
        assert!(client_b.connect());
        relay.pump();
        client_b.poll();
        relay.pump();

        // the relay closes the connection -> the client can continue offline
        assert_eq!(client_b.poll(), vec![ClientEvent::ConnectionLost]);
        assert!(!client_b.is_welcomed());
        assert_eq!(client_b.state(), ConnectionState::Disconnected);
        assert_eq!(relay.player_names(), vec!["a".to_owned()]);
    }

    #[test]
    fn test_relay_only_forwards_own_car_states() {
        let mut relay = LoopbackServer::new();
        let mut client_a = welcomed_client(&mut relay, "a");
        let mut client_b = welcomed_client(&mut relay, "b");
        client_a.poll();

        let mut forged_car = Car::new("a", &CarPhysicsPars::default());
        forged_car.set_position(Point2d::new(-9999.0, -9999.0));
        let mut forged = Event::with_args(
            events::RACE_CAR_STATE_CHANGE,
            vec![EventValue::from("a")],
        );
        for arg in forged_car.serialize() {
            forged.add_arg(arg);
        }
        assert!(client_b.send(&forged));

        let mut finished = Event::new(events::RACE_PLAYER_FINISHED);
        finished.add_arg("a");
        finished.add_arg(1000);
        assert!(client_b.send(&finished));
        relay.pump();

        assert!(client_a.poll().is_empty());
        assert!(client_b.poll().is_empty());

        // the same events for the own player are relayed
        let mut own = Event::new(events::RACE_PLAYER_FINISHED);
        own.add_arg("b");
        own.add_arg(1000);
        assert!(client_b.send(&own));
        relay.pump();

        assert_eq!(client_a.poll(), vec![ClientEvent::Race(own)]);
    }

    #[test]
    fn test_channel_transport_uses_codec() {
        let (to_server, server_rx) = flume::unbounded();
        let mut transport = ChannelTransport::new(7, to_server);
        transport.connect().unwrap();

        let client_tx = match server_rx.try_recv().unwrap() {
            ServerMessage::Connect { client_id, tx } => {
                assert_eq!(client_id, 7);
                tx
            }
            msg => panic!("Unexpected message {:?}", msg),
        };

        // outgoing events are encoded
        let mut event = Event::new(events::RACE_RACE_STATE);
        event.add_arg(3);
        transport.send(&event).unwrap();

        match server_rx.try_recv().unwrap() {
            ServerMessage::Data { client_id, data } => {
                assert_eq!(client_id, 7);
                assert_eq!(Event::decode(&data).unwrap(), event);
            }
            msg => panic!("Unexpected message {:?}", msg),
        }

        // undecodable data is skipped
        client_tx.send(ClientMessage::Data("{not json".to_owned())).unwrap();
        client_tx
            .send(ClientMessage::Data(event.encode().unwrap()))
            .unwrap();
        assert_eq!(transport.poll(), Some(TransportSignal::EventReceived(event)));
        assert_eq!(transport.poll(), None);

        // a refusal closes the connection
        client_tx
            .send(ClientMessage::Refused("name in use".to_owned()))
            .unwrap();
        assert_eq!(transport.poll(), Some(TransportSignal::Disconnected));
        assert_eq!(
            transport.send(&Event::new(events::RACE_LOCK_CAR)),
            Err(TransportError::NotConnected)
        );
    }
}

#[cfg(test)]
mod race_tests {
    use crate::core::car::CarPhysicsPars;
    use crate::core::handle_race::handle_race;
    use crate::core::level::{Level, TrackLevel};
    use crate::core::race::{build_car_state_event, Race};
    use crate::network::client::Client;
    use crate::network::event::Event;
    use crate::network::events;
    use crate::network::loopback::LoopbackServer;
    use crate::test_support::{oval_level_pars, oval_race_pars, pump_all, LineLevel};
    use std::sync::Arc;
    use std::thread;

    fn online_race(relay: &mut LoopbackServer, level: &Arc<dyn Level>, name: &str, slot: u32) -> Race {
        let client = Client::new(Box::new(relay.endpoint()), name);
        let mut race = Race::new(
            Arc::clone(level),
            &CarPhysicsPars::default(),
            3,
            name,
            slot,
            Some(client),
        );
        assert!(race.connect());
        race
    }

    #[test]
    fn test_two_peers_exchange_car_state() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        let mut race_b = online_race(&mut relay, &level, "b", 2);

        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);
        assert!(race_a.is_welcomed() && race_b.is_welcomed());
        assert_eq!(race_a.player_names().len(), 2);
        assert_eq!(race_b.player_names().len(), 2);

        // start positions were exchanged on welcome
        assert_eq!(race_b.car_snapshot("a"), race_a.car_snapshot("a"));

        // input edge on a -> one state change event
        race_a.start_countdown(0);
        race_a.with_local_car(|car, _| {
            car.set_acceleration(true);
            car.set_turn(0.5);
        });
        race_a.update(17);
        relay.pump();
        race_b.update(0);

        let state_a = race_a.car_snapshot("a").unwrap();
        assert!(state_a.accel);
        assert!(!state_a.locked);
        assert_eq!(race_b.car_snapshot("a"), Some(state_a));

        // and the other way round
        race_b.start_countdown(0);
        race_b.with_local_car(|car, _| car.set_brake(true));
        race_b.update(17);
        relay.pump();
        race_a.update(0);

        let state_b = race_b.car_snapshot("b").unwrap();
        assert!(state_b.brake);
        assert_eq!(race_a.car_snapshot("b"), Some(state_b));

        let result = race_a.race_result();
        assert_eq!(result.player_names, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(race_a.race_state().car_views.len(), 2);
    }

    #[test]
    fn test_init_race_confirms_level() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        let mut race_b = online_race(&mut relay, &level, "b", 2);
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        assert!(!race_b.is_level_confirmed());
        assert!(race_a.init_race());
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        assert!(race_a.is_level_confirmed());
        assert!(race_b.is_level_confirmed());

        // another level name is not confirmed
        let mut event = Event::new(events::GENERAL_INIT_RACE);
        event.add_arg("desert");
        let mut rogue = Client::new(Box::new(relay.endpoint()), "rogue");
        rogue.connect();
        relay.pump();
        rogue.poll();
        relay.pump();
        rogue.poll();
        assert!(rogue.send(&event));
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        assert!(!race_b.is_level_confirmed());
    }

    #[test]
    fn test_unknown_and_malformed_car_states_are_ignored() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        pump_all(&mut relay, &mut [&mut race_a]);

        let before = race_a.car_snapshot("a");

        // a second participant that talks raw events
        let mut rogue = Client::new(Box::new(relay.endpoint()), "rogue");
        rogue.connect();
        relay.pump();
        rogue.poll();
        relay.pump();
        rogue.poll();
        race_a.update(0);
        assert_eq!(race_a.player_names().len(), 2);

        let mut state_event = build_car_state_event(&crate::core::car::Car::new(
            "nobody",
            &CarPhysicsPars::default(),
        ));
        assert!(rogue.send(&state_event));

        let mut short_event = Event::new(events::RACE_CAR_STATE_CHANGE);
        short_event.add_arg("a");
        short_event.add_arg(true);
        assert!(rogue.send(&short_event));

        // wrong type in an otherwise complete state for a known player
        state_event = build_car_state_event(&crate::core::car::Car::new(
            "a",
            &CarPhysicsPars::default(),
        ));
        let mut args = state_event.args().to_vec();
        args[5] = "oops".into();
        assert!(rogue.send(&Event::with_args(events::RACE_CAR_STATE_CHANGE, args)));

        relay.pump();
        race_a.update(0);

        assert_eq!(race_a.car_snapshot("a"), before);
        assert_eq!(race_a.car_snapshot("nobody"), None);
    }

    #[test]
    fn test_echo_keeps_fresh_local_input() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        let mut race_b = online_race(&mut relay, &level, "b", 2);
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        race_a.start_countdown(0);
        race_a.with_local_car(|car, _| car.set_turn(0.5));
        race_a.update(17);
        relay.pump();

        // the echo of the 0.5 state arrives after the next input was set
        race_a.with_local_car(|car, _| {
            car.set_turn(1.0);
            car.set_acceleration(true);
        });

        for _ in 0..6 {
            race_a.update(17);
            relay.pump();
            race_b.update(0);
        }

        let state_a = race_a.car_snapshot("a").unwrap();
        assert_eq!(state_a.turn, 1.0);
        assert!(state_a.accel);
        assert!(!state_a.locked);
        assert!(race_a.is_started());

        let replica = race_b.car_snapshot("a").unwrap();
        assert_eq!(replica.turn, 1.0);
        assert!(replica.accel);
    }

    #[test]
    fn test_foreign_car_states_are_not_relayed() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        let mut race_b = online_race(&mut relay, &level, "b", 2);
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        let own_before = race_a.car_snapshot("a");
        let replica_before = race_b.car_snapshot("a");

        let mut rogue = Client::new(Box::new(relay.endpoint()), "rogue");
        rogue.connect();
        relay.pump();
        rogue.poll();
        relay.pump();
        rogue.poll();

        let mut forged_car = crate::core::car::Car::new("a", &CarPhysicsPars::default());
        forged_car.set_position(helpers::geometry::Point2d::new(-9999.0, -9999.0));
        assert!(rogue.send(&build_car_state_event(&forged_car)));
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);

        assert_eq!(race_a.car_snapshot("a"), own_before);
        assert_eq!(race_b.car_snapshot("a"), replica_before);
    }

    #[test]
    fn test_player_leaves() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut relay = LoopbackServer::new();
        let mut race_a = online_race(&mut relay, &level, "a", 1);
        let mut race_b = online_race(&mut relay, &level, "b", 2);
        pump_all(&mut relay, &mut [&mut race_a, &mut race_b]);
        assert_eq!(race_a.player_names().len(), 2);

        race_b.disconnect();
        relay.pump();
        race_a.update(0);

        assert_eq!(race_a.player_names(), vec!["a".to_owned()]);
    }

    #[test]
    fn test_race_handle_joins_from_other_thread() {
        let level: Arc<dyn Level> = Arc::new(LineLevel::new(4));
        let mut race = Race::new(level, &CarPhysicsPars::default(), 1, "local", 1, None);
        let handle = race.handle();

        let joiner = thread::spawn(move || {
            for i in 0..50 {
                handle.join_player(&format!("remote {}", i));
            }
            handle.leave_player("remote 0");
            handle.leave_player("local");
        });

        for _ in 0..50 {
            race.update(17);
        }
        joiner.join().unwrap();

        let names = race.player_names();
        assert_eq!(names.len(), 50);
        assert!(names.contains(&"local".to_owned()));
        assert!(!names.contains(&"remote 0".to_owned()));
    }

    #[test]
    fn test_locked_until_countdown_ends() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut race = Race::new(level, &CarPhysicsPars::default(), 1, "a", 1, None);
        race.with_local_car(|car, _| car.set_acceleration(true));

        let start = race.car_snapshot("a").unwrap();
        race.request_start(1);

        for _ in 0..30 {
            race.update(17);
        }
        assert!(!race.is_started());
        assert_eq!(race.car_snapshot("a").unwrap().pos_y, start.pos_y);

        for _ in 0..60 {
            race.update(17);
        }
        assert!(race.is_started());
        assert!(race.car_snapshot("a").unwrap().pos_y > start.pos_y);
        assert!(race.racetime() > 0.0);
    }

    #[test]
    fn test_render_channel() {
        let level: Arc<dyn Level> = Arc::new(TrackLevel::new(&oval_level_pars()));
        let mut race = Race::new(level, &CarPhysicsPars::default(), 2, "a", 1, None);
        let (tx, rx) = flume::unbounded();
        race.set_render_channel(tx);

        for _ in 0..60 {
            race.update(17);
        }

        let states: Vec<_> = rx.try_iter().collect();
        assert!(!states.is_empty() && states.len() <= 21);
        assert_eq!(states[0].tot_no_laps, 2);
        assert_eq!(states[0].car_views[0].owner, "a");
    }

    #[test]
    fn test_offline_race_finishes() {
        let mut race_pars = oval_race_pars();
        race_pars.tot_no_laps = 1;
        race_pars.countdown_s = 0;

        let result = handle_race(&race_pars, true, None, 1.0, 36000, true).unwrap();

        assert_eq!(result.player_names.len(), 3);
        for i in 0..3 {
            assert!(result.has_finished(i));
            assert!(result.racetimes[i][1] > 0.0);
        }
    }

    #[test]
    fn test_online_race_finishes() {
        let mut race_pars = oval_race_pars();
        race_pars.tot_no_laps = 1;
        race_pars.countdown_s = 0;
        race_pars.drivers.truncate(2);

        let result = handle_race(&race_pars, false, None, 1.0, 36000, false).unwrap();

        assert!(result.has_finished(0));
        assert!(result.has_finished(1));
        assert_eq!(result.finishing_order().len(), 2);
    }
}


#[cfg(test)]
mod pre_tests {
    use crate::pre::check_race_pars::check_race_pars;
    use crate::pre::read_race_pars::read_race_pars;
    use crate::test_support::oval_race_pars;
    use std::path::Path;

    #[test]
    fn test_read_race_pars() {
        let race_pars = oval_race_pars();
        assert_eq!(race_pars.tot_no_laps, 3);
        assert_eq!(race_pars.drivers.len(), 3);
        // not set in the file -> default tuning
        assert_eq!(race_pars.car_physics.wheel_turn_speed, 0.1);
        assert!(check_race_pars(&race_pars).is_ok());
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_race_pars(Path::new("does/not/exist.json")).is_err());
    }

    #[test]
    fn test_check_race_pars_rejects() {
        let mut race_pars = oval_race_pars();
        race_pars.tot_no_laps = 0;
        assert!(check_race_pars(&race_pars).is_err());

        let mut race_pars = oval_race_pars();
        race_pars.drivers.push("red".to_owned());
        assert!(check_race_pars(&race_pars).is_err());

        let mut race_pars = oval_race_pars();
        race_pars.drivers = (0..5).map(|i| format!("driver {}", i)).collect();
        assert!(check_race_pars(&race_pars).is_err());

        let mut race_pars = oval_race_pars();
        race_pars.car_physics.air_resistance = 0.0;
        assert!(check_race_pars(&race_pars).is_err());

        let mut race_pars = oval_race_pars();
        race_pars.level.centerline.truncate(2);
        assert!(check_race_pars(&race_pars).is_err());
    }
}

#[cfg(test)]
mod post_tests {
    use crate::post::race_result::RaceResult;
    use approx::assert_ulps_eq;

    #[test]
    fn test_race_result() {
        let result = RaceResult::new(
            2,
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            &[vec![10.0, 21.0], vec![9.0, 19.5, 30.0], vec![12.0]],
        );

        assert_ulps_eq!(result.laptimes[0][2], 11.0);
        // laps beyond the race distance are cut off
        assert_eq!(result.racetimes[1].len(), 3);
        assert!(result.has_finished(0));
        assert!(!result.has_finished(2));
        assert_eq!(result.finishing_order(), vec![1, 0, 2]);
    }
}
