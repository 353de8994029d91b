use crate::connection::{ConnectionEvent, Generation, SocketEvent, StateRequest, Transport, TransportError};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// WebSocket transport: one task per connection, events back over a channel
pub struct WsTransport {
    events: mpsc::UnboundedSender<ConnectionEvent>,
    connections: HashMap<Generation, mpsc::UnboundedSender<String>>,
}

impl WsTransport {
    pub fn new(events: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self {
            events,
            connections: HashMap::new(),
        }
    }
}

impl Transport for WsTransport {
    fn open(&mut self, generation: Generation, request: &StateRequest) -> Result<(), TransportError> {
        let mut handshake = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError(e.to_string()))?;
        let authorization = HeaderValue::from_str(&request.authorization)
            .map_err(|e| TransportError(e.to_string()))?;
        handshake.headers_mut().insert(AUTHORIZATION, authorization);

        // Forget connections whose task already ended
        self.connections.retain(|_, outbound| !outbound.is_closed());

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.connections.insert(generation, outbound_tx);
        tokio::spawn(run_connection(
            generation,
            handshake,
            outbound_rx,
            self.events.clone(),
        ));
        Ok(())
    }

    fn send(&mut self, generation: Generation, text: String) -> Result<(), TransportError> {
        self.connections
            .get(&generation)
            .ok_or_else(|| TransportError("connection closed".to_string()))?
            .send(text)
            .map_err(|_| TransportError("connection closed".to_string()))
    }

    fn close(&mut self, generation: Generation) {
        // Dropping the sender ends the connection task
        self.connections.remove(&generation);
    }
}

async fn run_connection(
    generation: Generation,
    request: Request,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let emit = |event: SocketEvent| {
        let _ = events.send(ConnectionEvent::socket(generation, event));
    };

    let socket = tokio::select! {
        result = connect_async(request) => match result {
            Ok((socket, _response)) => socket,
            Err(e) => {
                emit(SocketEvent::Error(e.to_string()));
                return;
            }
        },
        // Closed locally before the handshake completed
        _ = wait_closed(&mut outbound) => return,
    };

    emit(SocketEvent::Opened);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        emit(SocketEvent::Error(e.to_string()));
                        return;
                    }
                }
                None => {
                    debug!(generation = %generation, "Closing state channel");
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => emit(SocketEvent::Message(text)),
                Some(Ok(Message::Close(frame))) => {
                    debug!(generation = %generation, frame = ?frame, "Server closed state channel");
                    emit(SocketEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite, binary frames are not part of the protocol
                }
                Some(Err(e)) => {
                    emit(SocketEvent::Error(e.to_string()));
                    return;
                }
                None => {
                    emit(SocketEvent::Closed);
                    return;
                }
            },
        }
    }
}

async fn wait_closed(outbound: &mut mpsc::UnboundedReceiver<String>) {
    while outbound.recv().await.is_some() {}
}
