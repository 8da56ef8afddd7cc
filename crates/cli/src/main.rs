//! `lightbnb` CLI entry-point.
//!
//! Available sub-commands:
//! - `user-by-email` / `user-by-id` — look up a user.
//! - `add-user`                     — register a user.
//! - `reservations`                 — list a guest's reservations.
//! - `search`                       — filtered property search.
//! - `add-property`                 — create a property from JSON.
//!
//! Results are written to stdout as JSON; logs go to stderr.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Backend, Cli, Command};
use store::{MemoryStore, NewProperty, NewUser, PgStore, PropertyStore};

fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn open_store(cli: &Cli) -> Result<Arc<dyn PropertyStore>> {
    match cli.backend {
        Backend::Postgres => {
            let pool = db::pool::create_pool(&cli.pool.to_pool_config())
                .await
                .context("failed to connect to database")?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        Backend::Memory => {
            let store = match &cli.fixtures {
                Some(dir) => MemoryStore::from_fixture_dir(dir)
                    .await
                    .with_context(|| format!("failed to load fixtures from {}", dir.display()))?,
                None => MemoryStore::new(),
            };
            Ok(Arc::new(store))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an optional record; a missing one prints `null` and fails the exit code.
fn print_found<T: Serialize>(value: Option<T>) -> Result<ExitCode> {
    let found = value.is_some();
    print_json(&value)?;
    Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(store: &dyn PropertyStore, command: Command) -> Result<ExitCode> {
    match command {
        Command::UserByEmail { email } => print_found(store.get_user_by_email(&email).await?),
        Command::UserById { id } => print_found(store.get_user_by_id(id).await?),
        Command::AddUser {
            name,
            email,
            password,
        } => {
            let user = store
                .add_user(NewUser {
                    name,
                    email,
                    password,
                })
                .await?;
            info!(id = user.id, "user created");
            print_json(&user)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Reservations { guest_id, limit } => {
            print_json(&store.list_reservations_for_guest(guest_id, limit).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Search { filters, limit } => {
            let search = filters.into_search();
            print_json(&store.search_properties(search.as_ref(), limit).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::AddProperty { path } => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;
            let property: NewProperty = serde_json::from_str(&json)
                .with_context(|| format!("invalid property JSON in {}", path.display()))?;
            let created = store.add_property(property).await?;
            info!(id = created.id, "property created");
            print_json(&created)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let store = open_store(&cli).await?;
    run(store.as_ref(), cli.command).await
}
