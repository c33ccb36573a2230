use crate::network::event::{Event, EventValue};
use crate::network::events;
use crate::network::transport::{ChannelTransport, ClientMessage, ServerMessage};
use flume::{Receiver, Sender};

#[derive(Debug)]
struct RelayClient {
    client_id: u32,
    name: Option<String>,
    tx: Sender<ClientMessage>,
}

/// LoopbackServer is an in-process relay between `ChannelTransport` endpoints. It welcomes
/// clients that introduce themselves, announces joins and leaves to the other clients, and
/// broadcasts every `race:*` event as well as level initializations to all welcomed clients
/// (including the sender, which uses the echo for correction). Events that speak for a player
/// are only relayed from that player's own connection.
#[derive(Debug)]
pub struct LoopbackServer {
    rx: Receiver<ServerMessage>,
    tx: Sender<ServerMessage>,
    clients: Vec<RelayClient>,
    next_client_id: u32,
}

impl Default for LoopbackServer {
    fn default() -> Self {
        LoopbackServer::new()
    }
}

impl LoopbackServer {
    pub fn new() -> LoopbackServer {
        let (tx, rx) = flume::unbounded();

        LoopbackServer {
            rx,
            tx,
            clients: vec![],
            next_client_id: 1,
        }
    }

    /// The method creates a new (not yet connected) transport endpoint for this relay.
    pub fn endpoint(&mut self) -> ChannelTransport {
        let client_id = self.next_client_id;
        self.next_client_id += 1;

        ChannelTransport::new(client_id, self.tx.clone())
    }

    /// The method returns the names of all welcomed clients.
    pub fn player_names(&self) -> Vec<String> {
        self.clients.iter().filter_map(|c| c.name.to_owned()).collect()
    }

    /// pump processes all queued messages without blocking and returns their number.
    pub fn pump(&mut self) -> usize {
        let mut no_msgs = 0;

        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
            no_msgs += 1;
        }

        no_msgs
    }

    /// run processes messages until every endpoint has been dropped. It is meant to be executed
    /// on a separate thread.
    pub fn run(mut self) {
        // replace own sender, otherwise the channel never disconnects
        let (detached_tx, _) = flume::unbounded();
        drop(std::mem::replace(&mut self.tx, detached_tx));

        while let Ok(msg) = self.rx.recv() {
            self.handle_message(msg);
        }

        log::debug!("Relay shut down, all endpoints are gone");
    }

    /// broadcast sends an event to all welcomed clients.
    pub fn broadcast(&mut self, event: &Event) {
        self.send_to_welcomed(event, None);
    }

    fn handle_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Connect { client_id, tx } => {
                if tx.send(ClientMessage::Accepted).is_ok() {
                    self.clients.push(RelayClient {
                        client_id,
                        name: None,
                        tx,
                    });
                    log::debug!("Relay accepted connection of client {}", client_id);
                }
            }
            ServerMessage::Data { client_id, data } => match Event::decode(&data) {
                Ok(event) => self.handle_event(client_id, event),
                Err(e) => log::warn!("Relay dropped data of client {}: {}", client_id, e),
            },
            ServerMessage::Disconnect { client_id } => self.remove_client(client_id),
        }
    }

    fn handle_event(&mut self, client_id: u32, event: Event) {
        if !events::has_expected_arg_count(&event) {
            log::warn!(
                "Relay dropped event {} of client {} (unknown kind or wrong argument count)",
                event,
                client_id
            );
            return;
        }

        if event.name() == events::GENERAL_HI {
            let name = match event.arg(0).and_then(|x| x.as_str()) {
                Some(name) => name.to_owned(),
                None => {
                    log::warn!("Relay received hi without a player name from client {}", client_id);
                    return;
                }
            };
            self.welcome(client_id, name);
        } else if event.scope() == events::SCOPE_RACE || event.name() == events::GENERAL_INIT_RACE
        {
            let sender = match self.client_name(client_id) {
                Some(name) => name.to_owned(),
                None => {
                    log::warn!("Relay dropped {} of client {} (not welcomed)", event, client_id);
                    return;
                }
            };

            let named = event.arg(0).and_then(EventValue::as_str);

            if speaks_for_player(&event) && named != Some(sender.as_str()) {
                log::warn!(
                    "Relay dropped {} of client {} (sent on behalf of another player than {})",
                    event,
                    client_id,
                    sender
                );
                return;
            }

            self.broadcast(&event);
        } else {
            log::warn!("Relay cannot handle event {} of client {}", event, client_id);
        }
    }

    fn welcome(&mut self, client_id: u32, name: String) {
        if self.player_names().contains(&name) {
            log::warn!("Relay refused client {}, player name {} is in use", client_id, name);
            self.refuse_client(client_id, format!("player name {} is in use", name));
            return;
        }

        let existing = self.player_names();

        let client = match self.clients.iter_mut().find(|c| c.client_id == client_id) {
            Some(client) => client,
            None => return,
        };
        client.name = Some(name.to_owned());

        // the newcomer first learns about everybody who is already there
        let mut msgs = vec![Event::new(events::GENERAL_WELCOME)];
        msgs.extend(existing.iter().map(|other| {
            let mut ev = Event::new(events::GENERAL_PLAYER_CONNECTED);
            ev.add_arg(other.as_str());
            ev
        }));

        for ev in msgs {
            match ev.encode() {
                Ok(data) => {
                    let _ = client.tx.send(ClientMessage::Data(data));
                }
                Err(e) => log::warn!("Relay could not encode {}: {}", ev, e),
            }
        }

        let mut announce = Event::new(events::GENERAL_PLAYER_CONNECTED);
        announce.add_arg(name.as_str());
        self.send_to_welcomed(&announce, Some(client_id));

        log::info!("Relay welcomed player {} (client {})", name, client_id);
    }

    /// refuse_client closes the connection of a client that was not welcomed.
    fn refuse_client(&mut self, client_id: u32, reason: String) {
        if let Some(idx) = self.clients.iter().position(|c| c.client_id == client_id) {
            let client = self.clients.remove(idx);
            let _ = client.tx.send(ClientMessage::Refused(reason));
        }
    }

    fn remove_client(&mut self, client_id: u32) {
        let idx = match self.clients.iter().position(|c| c.client_id == client_id) {
            Some(idx) => idx,
            None => return,
        };
        let client = self.clients.remove(idx);

        if let Some(name) = client.name {
            let mut ev = Event::new(events::GENERAL_PLAYER_DISCONNECTED);
            ev.add_arg(name.as_str());
            self.send_to_welcomed(&ev, None);
            log::info!("Relay removed player {} (client {})", name, client_id);
        }
    }

    fn client_name(&self, client_id: u32) -> Option<&str> {
        self.clients
            .iter()
            .find(|c| c.client_id == client_id)
            .and_then(|c| c.name.as_deref())
    }

    fn send_to_welcomed(&mut self, event: &Event, skip_client_id: Option<u32>) {
        let data = match event.encode() {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Relay could not encode {}: {}", event, e);
                return;
            }
        };

        let mut gone = vec![];

        for client in self.clients.iter().filter(|c| c.name.is_some()) {
            if Some(client.client_id) == skip_client_id {
                continue;
            }
            if client.tx.send(ClientMessage::Data(data.to_owned())).is_err() {
                gone.push(client.client_id);
            }
        }

        for client_id in gone {
            self.remove_client(client_id);
        }
    }
}

/// speaks_for_player checks whether the first argument of the event names the player the event
/// is about, i.e. whether only that player may send it.
fn speaks_for_player(event: &Event) -> bool {
    matches!(
        event.name(),
        events::RACE_CAR_STATE_CHANGE | events::RACE_PLAYER_FINISHED
    )
}
