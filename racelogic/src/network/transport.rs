use crate::network::event::Event;
use flume::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
    #[error("transport is not connected")]
    NotConnected,
    #[error("transport channel is closed")]
    ChannelClosed,
    #[error("event could not be encoded: {0}")]
    Encode(String),
}

/// TransportSignal is everything a transport can report to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    Connected,
    Disconnected,
    EventReceived(Event),
}

/// Transport is the message-based link between one participant and the server. Received data is
/// queued by the implementation and handed out by `poll`, such that the owner decides at which
/// point of its frame incoming events are processed.
pub trait Transport: Send {
    fn connect(&mut self) -> Result<(), TransportError>;
    fn disconnect(&mut self);
    fn send(&self, event: &Event) -> Result<(), TransportError>;
    /// The method returns the next queued signal, or None if the queue is empty.
    fn poll(&mut self) -> Option<TransportSignal>;
}

/// ServerMessage is what a `ChannelTransport` puts on the wire towards the relay. Events travel
/// in their encoded form.
#[derive(Debug)]
pub enum ServerMessage {
    Connect {
        client_id: u32,
        tx: Sender<ClientMessage>,
    },
    Data {
        client_id: u32,
        data: String,
    },
    Disconnect {
        client_id: u32,
    },
}

/// ClientMessage is what the relay puts on the wire towards a `ChannelTransport`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Accepted,
    /// The relay closed the connection, e.g. because the player name is in use.
    Refused(String),
    Data(String),
}

/// ChannelTransport connects to an in-process relay via flume channels.
#[derive(Debug)]
pub struct ChannelTransport {
    client_id: u32,
    to_server: Sender<ServerMessage>,
    from_server_tx: Sender<ClientMessage>,
    from_server_rx: Receiver<ClientMessage>,
    connected: bool,
}

impl ChannelTransport {
    pub fn new(client_id: u32, to_server: Sender<ServerMessage>) -> ChannelTransport {
        let (from_server_tx, from_server_rx) = flume::unbounded();

        ChannelTransport {
            client_id,
            to_server,
            from_server_tx,
            from_server_rx,
            connected: false,
        }
    }
}

impl Transport for ChannelTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.connected {
            return Ok(());
        }

        self.to_server
            .send(ServerMessage::Connect {
                client_id: self.client_id,
                tx: self.from_server_tx.clone(),
            })
            .map_err(|_| TransportError::ConnectionRefused("relay is not running".to_owned()))?;

        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        if !self.connected {
            return;
        }

        // the relay might already be gone, in which case there is nobody left to inform
        let _ = self.to_server.send(ServerMessage::Disconnect {
            client_id: self.client_id,
        });
        self.connected = false;
    }

    fn send(&self, event: &Event) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }

        let data = event
            .encode()
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        self.to_server
            .send(ServerMessage::Data {
                client_id: self.client_id,
                data,
            })
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn poll(&mut self) -> Option<TransportSignal> {
        while let Ok(msg) = self.from_server_rx.try_recv() {
            match msg {
                ClientMessage::Accepted => return Some(TransportSignal::Connected),
                ClientMessage::Refused(reason) => {
                    log::warn!("Relay closed connection of client {}: {}", self.client_id, reason);
                    self.connected = false;
                    return Some(TransportSignal::Disconnected);
                }
                ClientMessage::Data(data) => match Event::decode(&data) {
                    Ok(event) => return Some(TransportSignal::EventReceived(event)),
                    Err(e) => log::warn!("Client {} dropped data: {}", self.client_id, e),
                },
            }
        }

        // queue is drained -> report a vanished relay exactly once
        if self.connected && self.to_server.is_disconnected() {
            self.connected = false;
            return Some(TransportSignal::Disconnected);
        }

        None
    }
}
