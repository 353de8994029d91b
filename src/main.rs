use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, warn};
use trc_remote::app::DashboardView;
use trc_remote::config::{load_config, RemoteConfig};
use trc_remote::console::{parse_line, ConsoleInput, HELP};
use trc_remote::runtime::{self, RemoteHandle};

const DEFAULT_CONFIG_PATH: &str = "trc-remote.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trc_remote=info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!(path = %path, "No config file, using defaults");
        RemoteConfig::default()
    };

    info!(origin = %config.server.origin, "trc-remote starting...");

    let handle = runtime::spawn(&config)?;
    tokio::spawn(log_changes(handle.subscribe()));

    handle.login(std::env::var("TRC_TOKEN").unwrap_or_default())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&handle, &line)? {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await?;
    info!("trc-remote stopped");
    Ok(())
}

/// Returns false when the operator asked to quit
fn handle_line(handle: &RemoteHandle, line: &str) -> Result<bool> {
    let input = match parse_line(line) {
        Ok(Some(input)) => input,
        Ok(None) => return Ok(true),
        Err(e) => {
            warn!("{}", e);
            return Ok(true);
        }
    };

    match input {
        ConsoleInput::Login(credential) => handle.login(credential)?,
        ConsoleInput::Command(command) => handle.send_command(command)?,
        ConsoleInput::Enable(id) => handle.set_enabled(id, true)?,
        ConsoleInput::Disable(id) => handle.set_enabled(id, false)?,
        ConsoleInput::Status => print_status(&handle.view()),
        ConsoleInput::Help => println!("{}", HELP),
        ConsoleInput::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_status(view: &DashboardView) {
    println!(
        "logged in: {}  connection: {}  command: {}",
        view.logged_in,
        view.status,
        view.command.as_deref().unwrap_or("-")
    );
    for (id, turtle) in view.turtles.iter() {
        println!(
            "  turtle {:>3}  {}  battery {:>3}  role {:<16}  team {}",
            id,
            if turtle.enabled() { "on " } else { "off" },
            turtle
                .battery_voltage()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into()),
            turtle.role().unwrap_or("-"),
            turtle.team_color().unwrap_or("-"),
        );
    }
}

async fn log_changes(mut view: watch::Receiver<DashboardView>) {
    let mut previous = view.borrow().clone();

    while view.changed().await.is_ok() {
        let current = view.borrow_and_update().clone();

        if current.status != previous.status {
            info!(status = %current.status, "Connection status changed");
        }
        if current.notification != previous.notification {
            if let Some(notification) = &current.notification {
                error!(message = %notification.message, "Notification");
            }
        }
        if current.turtles != previous.turtles {
            info!(
                turtles = current.turtles.len(),
                enabled = ?current.turtles.enabled_ids(),
                "Turtles updated"
            );
        }

        previous = current;
    }
}
