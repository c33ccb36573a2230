pub mod car_state;
pub mod client;
pub mod event;
pub mod events;
pub mod loopback;
pub mod transport;
