use crate::network::event::Event;
use crate::network::events;
use crate::network::transport::{Transport, TransportSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// transport is up, waiting for the welcome of the server
    Connecting,
    Welcomed,
}

/// ClientEvent is what the client hands to the race after routing the raw transport signals.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Welcomed,
    PlayerConnected(String),
    PlayerDisconnected(String),
    InitRace(String),
    Race(Event),
    ConnectionLost,
}

/// Client handles the connection lifecycle of one participant on top of a transport and routes
/// incoming events by their scope.
pub struct Client {
    transport: Box<dyn Transport>,
    player_name: String,
    state: ConnectionState,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("player_name", &self.player_name)
            .field("state", &self.state)
            .finish()
    }
}

impl Client {
    pub fn new(transport: Box<dyn Transport>, player_name: &str) -> Client {
        Client {
            transport,
            player_name: player_name.to_owned(),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state != ConnectionState::Disconnected
    }

    pub fn is_welcomed(&self) -> bool {
        self.state == ConnectionState::Welcomed
    }

    /// connect starts the connection attempt. If the transport fails, the client stays
    /// disconnected and false is returned, i.e. the caller continues offline.
    pub fn connect(&mut self) -> bool {
        if self.is_connected() {
            return true;
        }

        match self.transport.connect() {
            Ok(()) => {
                self.state = ConnectionState::Connecting;
                log::info!("Connecting as {}...", self.player_name);
                true
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                log::warn!("Could not connect as {}: {}", self.player_name, e);
                false
            }
        }
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            self.transport.disconnect();
            self.state = ConnectionState::Disconnected;
            log::info!("{} disconnected", self.player_name);
        }
    }

    /// send transmits the event if the link is fully initialized and returns whether it was
    /// handed to the transport.
    pub fn send(&self, event: &Event) -> bool {
        if !self.is_welcomed() {
            log::debug!("Not sending {}, link is not welcomed", event.name());
            return false;
        }

        match self.transport.send(event) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to send {}: {}", event.name(), e);
                false
            }
        }
    }

    /// poll drains the transport queue and returns the routed events in arrival order.
    pub fn poll(&mut self) -> Vec<ClientEvent> {
        let mut out = vec![];

        while let Some(signal) = self.transport.poll() {
            match signal {
                TransportSignal::Connected => {
                    let mut hi = Event::new(events::GENERAL_HI);
                    hi.add_arg(self.player_name.as_str());

                    if let Err(e) = self.transport.send(&hi) {
                        log::warn!("Failed to introduce {}: {}", self.player_name, e);
                    }
                }
                TransportSignal::Disconnected => {
                    if self.is_connected() {
                        self.state = ConnectionState::Disconnected;
                        log::warn!("Connection of {} lost", self.player_name);
                        out.push(ClientEvent::ConnectionLost);
                    }
                }
                TransportSignal::EventReceived(event) => {
                    if let Some(client_event) = self.route(event) {
                        out.push(client_event);
                    }
                }
            }
        }

        out
    }

    fn route(&mut self, event: Event) -> Option<ClientEvent> {
        if !self.is_connected() {
            return None;
        }

        if !events::has_expected_arg_count(&event) {
            log::warn!("Dropping unhandled or malformed event {}", event);
            return None;
        }

        match event.scope() {
            events::SCOPE_GENERAL => self.route_general(event),
            events::SCOPE_RACE => {
                if self.is_welcomed() {
                    Some(ClientEvent::Race(event))
                } else {
                    log::debug!("Dropping {} received before welcome", event.name());
                    None
                }
            }
            _ => {
                log::warn!("Unhandled event {}", event);
                None
            }
        }
    }

    fn route_general(&mut self, event: Event) -> Option<ClientEvent> {
        if event.name() == events::GENERAL_WELCOME {
            self.state = ConnectionState::Welcomed;
            log::info!("{} was welcomed by the server", self.player_name);
            return Some(ClientEvent::Welcomed);
        }

        let name = match event.arg(0).and_then(|x| x.as_str()) {
            Some(name) => name.to_owned(),
            None => {
                log::warn!("Dropping {}, first argument must be a string", event);
                return None;
            }
        };

        match event.name() {
            events::GENERAL_PLAYER_CONNECTED => Some(ClientEvent::PlayerConnected(name)),
            events::GENERAL_PLAYER_DISCONNECTED => Some(ClientEvent::PlayerDisconnected(name)),
            events::GENERAL_INIT_RACE => Some(ClientEvent::InitRace(name)),
            _ => {
                log::warn!("Unhandled event {}", event);
                None
            }
        }
    }
}
