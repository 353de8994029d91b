use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Tag of one connection attempt. Later attempts have larger generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a scheduled retry, issued by a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Everything a transport needs to open the state channel
#[derive(Debug, Clone, PartialEq)]
pub struct StateRequest {
    pub url: Url,
    /// Authorization header value sent with the handshake
    pub authorization: String,
}

/// Lifecycle and data events of one connection
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Opened,
    Message(String),
    Closed,
    Error(String),
}

/// Input of the connection state machine
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Event from the connection tagged with `generation`
    Socket {
        generation: Generation,
        event: SocketEvent,
    },
    /// A scheduled retry expired
    RetryDue(TimerHandle),
}

impl ConnectionEvent {
    pub fn socket(generation: Generation, event: SocketEvent) -> Self {
        ConnectionEvent::Socket { generation, event }
    }
}

/// Duplex connection to the state channel.
///
/// Calls never block. Events of a connection are reported asynchronously as
/// [`ConnectionEvent::Socket`] with the generation passed to `open`.
pub trait Transport {
    fn open(&mut self, generation: Generation, request: &StateRequest) -> Result<(), TransportError>;

    fn send(&mut self, generation: Generation, text: String) -> Result<(), TransportError>;

    /// Close a connection. Must be a no-op for unknown or already closed generations.
    fn close(&mut self, generation: Generation);
}

/// One-shot timers; expiry is reported as [`ConnectionEvent::RetryDue`].
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Cancel a timer. Must be a no-op for unknown or already fired handles.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Transport failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}
