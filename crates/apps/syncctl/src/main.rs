//! syncctl - seed a fakesync store and walk its listings
//!
//! Every listing command prints one JSON document per page, so the token
//! chain a client would follow is visible on stdout.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use fakesync::actions::labels;
use fakesync::{
    CalendarEvent, Contact, EngineConfig, ListParams, Message, OutgoingMessage, ResourceItem,
    SyncEngine, SyncPage, SyncResult,
};

#[derive(Parser)]
#[command(name = "syncctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and exercise a fakesync store")]
struct Cli {
    /// Database file (overrides engine.json and FAKESYNC_DB_PATH)
    #[arg(long, global = true, value_name = "path")]
    db: Option<PathBuf>,

    /// Owner to act as (defaults to the configured identity)
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default engine.json to the config directory
    InitConfig,

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that open the store
#[derive(Subcommand)]
enum StoreCommand {
    /// Populate the store with sample mail, events and contacts
    Seed {
        #[arg(long, default_value_t = 10)]
        messages: usize,
        #[arg(long, default_value_t = 5)]
        events: usize,
        #[arg(long, default_value_t = 5)]
        contacts: usize,
    },

    /// Send a message from the current user
    Send {
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Walk the message listing page by page
    Messages {
        /// Search query, e.g. "in:inbox is:unread"
        #[arg(long, short)]
        q: Option<String>,
        #[arg(long)]
        page_size: Option<i64>,
    },

    /// Replay mail history
    History {
        #[arg(long, default_value_t = 1)]
        start: u64,
        #[arg(long)]
        page_size: Option<i64>,
    },

    /// Show the mailbox profile
    Profile,

    /// Walk a calendar, or fetch a delta when given a sync token
    Events {
        #[arg(long, default_value = "primary")]
        calendar: String,
        #[arg(long)]
        sync_token: Option<String>,
        #[arg(long)]
        page_size: Option<i64>,
    },

    /// Walk contacts, or fetch a delta when given a sync token
    Contacts {
        #[arg(long)]
        sync_token: Option<String>,
        /// Search instead of listing connections
        #[arg(long, conflicts_with = "sync_token")]
        search: Option<String>,
        #[arg(long)]
        page_size: Option<i64>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            let path = EngineConfig::default().save()?;
            println!("{}", path.display());
        }
        Command::Store(command) => {
            let mut config = EngineConfig::load()?;
            if let Some(db) = cli.db {
                config.database_path = Some(db);
            }
            let engine = SyncEngine::open(config)?;
            let owner = engine.resolve_owner(cli.user.as_deref());
            run(&engine, &owner, command)?;
        }
    }

    Ok(())
}

fn run(engine: &SyncEngine, owner: &str, command: StoreCommand) -> Result<()> {
    match command {
        StoreCommand::Seed {
            messages,
            events,
            contacts,
        } => seed(engine, owner, messages, events, contacts)?,
        StoreCommand::Send { to, subject, body } => {
            let message = engine
                .actions()
                .send_message(owner, OutgoingMessage { to, subject, body })?;
            print_json(&ResourceItem::from(message))?;
        }
        StoreCommand::Messages { q, page_size } => {
            let mut params = sized(page_size);
            params.query = q;
            loop {
                let page = engine.list_messages(owner, &params)?;
                let next = page.next_page_token.clone();
                print_json(&page.map(ResourceItem::from))?;
                match next {
                    Some(next) => params = params.with_page_token(next),
                    None => break,
                }
            }
        }
        StoreCommand::History { start, page_size } => {
            let mut params = sized(page_size).with_start_history_id(start);
            loop {
                let page = engine.list_history(owner, &params)?;
                print_json(&page)?;
                match page.next_page_token {
                    Some(next) => params = params.with_page_token(next),
                    None => break,
                }
            }
        }
        StoreCommand::Profile => print_json(&engine.profile(owner)?)?,
        StoreCommand::Events {
            calendar,
            sync_token,
            page_size,
        } => {
            let mut params = sized(page_size);
            params.sync_token = sync_token;
            walk(params, |params| engine.list_events(&calendar, params))?;
        }
        StoreCommand::Contacts {
            search: Some(search),
            page_size,
            ..
        } => {
            let mut params = sized(page_size).with_query(search);
            loop {
                let page = engine.search_contacts(owner, &params)?;
                let next = page.next_page_token.clone();
                print_json(&page.map(ResourceItem::from))?;
                match next {
                    Some(next) => params = params.with_page_token(next),
                    None => break,
                }
            }
        }
        StoreCommand::Contacts {
            sync_token,
            search: None,
            page_size,
        } => {
            let mut params = sized(page_size);
            params.sync_token = sync_token;
            walk(params, |params| engine.list_connections(owner, params))?;
        }
    }

    Ok(())
}

/// Follow page tokens until the listing hands out a sync token
fn walk<T, F>(mut params: ListParams, mut list: F) -> Result<()>
where
    T: Into<ResourceItem>,
    F: FnMut(&ListParams) -> SyncResult<SyncPage<T>>,
{
    loop {
        let page = list(&params)?.map(Into::into);
        print_json(&page)?;
        match page.next_page_token {
            Some(next) => params = params.with_page_token(next),
            None => return Ok(()),
        }
    }
}

fn sized(page_size: Option<i64>) -> ListParams {
    match page_size {
        Some(size) => ListParams::new().with_page_size(size),
        None => ListParams::new(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn seed(
    engine: &SyncEngine,
    owner: &str,
    messages: usize,
    events: usize,
    contacts: usize,
) -> Result<()> {
    let actions = engine.actions();
    let now = Utc::now();

    for i in 0..messages {
        let message = Message::builder(format!("seed_{}_{}", owner, i), owner)
            .header("From", format!("sender{}@example.com", i))
            .header("To", format!("{}@example.com", owner))
            .header("Subject", format!("Sample message {}", i + 1))
            .body(format!("This is sample message number {}.", i + 1))
            .label_ids(if i % 3 == 0 {
                vec![labels::INBOX, labels::UNREAD]
            } else {
                vec![labels::INBOX]
            })
            .received_at(now - Duration::hours(i as i64))
            .build();
        actions.insert_message(message)?;
    }

    actions.create_calendar(owner, "primary", &format!("{}'s calendar", owner))?;
    for i in 0..events {
        let start = now + Duration::days(i as i64);
        let end = start + Duration::hours(1);
        actions.create_event(
            CalendarEvent::new("", "primary", format!("Sample event {}", i + 1))
                .with_times(start.to_rfc3339(), end.to_rfc3339()),
        )?;
    }

    for i in 0..contacts {
        actions.create_contact(
            owner,
            Contact::person_data(
                &format!("Contact {}", i + 1),
                &format!("contact{}@example.com", i + 1),
            ),
        )?;
    }

    info!(
        "Seeded {} messages, {} events and {} contacts for {}",
        messages, events, contacts, owner
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_config_needs_no_store() {
        let cli = Cli::try_parse_from(["syncctl", "init-config"]).unwrap();
        assert!(matches!(cli.command, Command::InitConfig));
    }

    #[test]
    fn test_store_commands_take_global_flags() {
        let cli = Cli::try_parse_from([
            "syncctl",
            "events",
            "--calendar",
            "work",
            "--db",
            "/tmp/sync.sqlite",
            "-u",
            "alice",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/sync.sqlite")));
        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.command {
            Command::Store(StoreCommand::Events { calendar, .. }) => assert_eq!(calendar, "work"),
            _ => panic!("expected events"),
        }
    }

    #[test]
    fn test_contacts_search_conflicts_with_sync_token() {
        let result = Cli::try_parse_from([
            "syncctl",
            "contacts",
            "--search",
            "ann",
            "--sync-token",
            "MA==",
        ]);
        assert!(result.is_err());
    }
}
