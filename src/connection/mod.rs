// State channel lifecycle: connect, detect drops, reconnect

mod manager;
mod transport;

pub use manager::{ConnectionManager, ConnectionStatus};
pub use transport::{
    ConnectionEvent, Generation, Scheduler, SocketEvent, StateRequest, TimerHandle, Transport,
    TransportError,
};

#[cfg(test)]
pub(crate) mod testing;
