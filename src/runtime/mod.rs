// Tokio event loop binding the coordinator to real I/O

mod timer;
mod websocket;

pub use timer::TokioScheduler;
pub use websocket::WsTransport;

use crate::api::{Dispatcher, Endpoints};
use crate::app::{App, DashboardView};
use crate::auth::{AuthError, Authenticator, Session};
use crate::config::RemoteConfig;
use crate::connection::{ConnectionEvent, ConnectionManager};
use crate::protocol::Command;
use crate::state::Snapshot;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

type RemoteApp = App<WsTransport, TokioScheduler>;

/// Operator request handled by the event loop
#[derive(Debug, Clone)]
pub enum Action {
    Login(String),
    SendCommand(Command),
    SetEnabled { id: String, enabled: bool },
    UpdateTurtles(Snapshot),
    Shutdown,
}

/// Handle to a running remote client
///
/// All state lives in the event loop task; the handle only sends actions and
/// reads published views.
pub struct RemoteHandle {
    actions: mpsc::UnboundedSender<Action>,
    view: watch::Receiver<DashboardView>,
    task: JoinHandle<()>,
}

impl RemoteHandle {
    pub fn login(&self, credential: impl Into<String>) -> Result<()> {
        self.act(Action::Login(credential.into()))
    }

    pub fn send_command(&self, command: Command) -> Result<()> {
        self.act(Action::SendCommand(command))
    }

    pub fn set_enabled(&self, id: impl Into<String>, enabled: bool) -> Result<()> {
        self.act(Action::SetEnabled {
            id: id.into(),
            enabled,
        })
    }

    pub fn update_turtles(&self, update: Snapshot) -> Result<()> {
        self.act(Action::UpdateTurtles(update))
    }

    /// Latest published view
    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    /// Tear down the connection and wait for the event loop to finish
    pub async fn shutdown(self) -> Result<()> {
        // The loop also stops when every handle is gone
        let _ = self.actions.send(Action::Shutdown);
        self.task.await.context("Event loop panicked")
    }

    fn act(&self, action: Action) -> Result<()> {
        self.actions
            .send(action)
            .map_err(|_| anyhow!("Event loop is no longer running"))
    }
}

/// Start the client event loop on the current tokio runtime
pub fn spawn(config: &RemoteConfig) -> Result<RemoteHandle> {
    let endpoints = Endpoints::new(&config.server.origin)?;
    let http = Client::builder()
        .user_agent(concat!("trc-remote/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let manager = ConnectionManager::new(
        WsTransport::new(events_tx.clone()),
        TokioScheduler::new(events_tx),
        endpoints.state(),
        config.connection.retry_delay(),
    );
    let app = App::new(manager);

    let authenticator = Arc::new(Authenticator::new(http.clone(), &endpoints));
    let dispatcher = Dispatcher::new(http, endpoints);

    let (actions_tx, actions_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(app.view());

    let event_loop = EventLoop {
        app,
        authenticator,
        dispatcher,
        view: view_tx,
    };
    let task = tokio::spawn(event_loop.run(events_rx, actions_rx));

    Ok(RemoteHandle {
        actions: actions_tx,
        view: view_rx,
        task,
    })
}

struct EventLoop {
    app: RemoteApp,
    authenticator: Arc<Authenticator>,
    dispatcher: Dispatcher,
    view: watch::Sender<DashboardView>,
}

impl EventLoop {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
        mut actions: mpsc::UnboundedReceiver<Action>,
    ) {
        let (logins_tx, mut logins) = mpsc::unbounded_channel::<Result<Session, AuthError>>();
        info!("Event loop started");

        loop {
            tokio::select! {
                Some(event) = events.recv() => self.app.handle(event),
                Some(result) = logins.recv() => {
                    self.app.login_result(result);
                }
                action = actions.recv() => match action {
                    Some(Action::Shutdown) | None => break,
                    Some(Action::Login(credential)) => {
                        let authenticator = Arc::clone(&self.authenticator);
                        let logins_tx = logins_tx.clone();
                        tokio::spawn(async move {
                            let result = authenticator.authenticate(&credential).await;
                            let _ = logins_tx.send(result);
                        });
                    }
                    Some(action) => self.dispatch(action),
                },
            }
            self.publish();
        }

        self.app.teardown();
        self.publish();
        info!("Event loop stopped");
    }

    fn dispatch(&self, action: Action) {
        let Some(session) = self.app.session() else {
            warn!(action = ?action, "Not logged in, dropping action");
            return;
        };

        let result = match action {
            Action::SendCommand(command) => self.dispatcher.send_command(session, command),
            Action::SetEnabled { id, enabled } => self.dispatcher.set_enabled(session, &id, enabled),
            Action::UpdateTurtles(update) => self.dispatcher.update_turtles(session, &update),
            Action::Login(_) | Action::Shutdown => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to dispatch");
        }
    }

    fn publish(&self) {
        let next = self.app.view();
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
