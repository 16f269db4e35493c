// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus Hub command-line client
//!
//! Signs in against the campus API, keeps the session in an encrypted local
//! store, and can stay connected to receive push notifications.

use anyhow::Context;
use campus_hub::{
    config::Config,
    storage::EncryptedFileStore,
    time_utils::{format_date_time, parse_timestamp, relative_time},
    CampusHub,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "campus-hub", version, about = "Campus services from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        /// Username or email
        username: String,
        #[arg(long, env = "CAMPUS_HUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List events
    Events {
        #[arg(value_enum, default_value_t = EventList::Upcoming)]
        list: EventList,
    },
    /// List your notifications
    Notifications,
    /// Show current weather
    Weather { city: Option<String> },
    /// Print push notifications as they arrive
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum EventList {
    Upcoming,
    Past,
    Approved,
    Mine,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = EncryptedFileStore::open(&config.store_path, &config.store_key)
        .with_context(|| format!("Failed to open session store {}", config.store_path.display()))?;
    let hub = CampusHub::new(config, Arc::new(store))?;
    let state = hub.session.load_stored_auth();

    match cli.command {
        Command::Login { username, password } => {
            let user = hub
                .session
                .login(&username, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            println!("Signed in as {}", user.display_name());
        }
        Command::Logout => {
            hub.session.logout();
            println!("Signed out");
        }
        Command::Whoami => match state.user {
            Some(user) if state.token.is_some() => {
                let role = user.role.as_ref().map(|r| r.to_string()).unwrap_or_default();
                println!("{} (id {}) {}", user.display_name(), user.id, role);
            }
            _ => println!("Not signed in"),
        },
        Command::Events { list } => {
            let client = hub.client();
            let events = match list {
                EventList::Upcoming => hub.upcoming_events().await,
                EventList::Past => client.past_events().await,
                EventList::Approved => client.approved_events().await,
                EventList::Mine => {
                    let user = state.user.context("Not signed in")?;
                    client.registered_events(user.id).await
                }
            }
            .map_err(|e| anyhow::anyhow!(e.message()))?;

            for event in events {
                let when = event
                    .event_date
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(format_date_time)
                    .unwrap_or_default();
                let full = if event.is_full() { " [full]" } else { "" };
                println!("{:>6}  {}  {}{}", event.id, when, event.title, full);
            }
        }
        Command::Notifications => {
            let notifications = hub
                .notifications()
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            for n in notifications {
                let age = n
                    .created_at
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(relative_time)
                    .unwrap_or_default();
                let unread = if n.is_read() { " " } else { "*" };
                println!("{} {}  ({})", unread, n.summary(), age);
            }
        }
        Command::Weather { city } => {
            let weather = hub
                .client()
                .current_weather(city.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            println!("{}", serde_json::to_string_pretty(&weather)?);
        }
        Command::Watch => {
            let handle = hub
                .start_notifications()
                .map_err(|e| anyhow::anyhow!(e.message()))?;
            let mut notifications = handle.notifications();
            tracing::info!("Watching for notifications, press Ctrl-C to stop");

            loop {
                tokio::select! {
                    received = notifications.recv() => match received {
                        Ok(n) => println!("{}", n.summary()),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Notification listener fell behind");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            handle.disconnect().await;
        }
    }
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campus_hub=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
