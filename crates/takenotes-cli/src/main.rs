use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use takenotes_client::{ClientConfig, FileBackend, NoteFilter, TakeNotesClient};
use takenotes_notify::Relay;
use takenotes_types::api::NotePatch;
use takenotes_types::models::CategoryAlias;

#[derive(Parser)]
#[command(name = "takenotes", version, about = "TakeNotes from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    SignUp { email: String, password: String },

    /// Sign in with an existing account
    SignIn { email: String, password: String },

    /// Forget the stored session
    SignOut,

    /// Show the signed-in email
    Whoami,

    /// List categories
    Categories,

    /// Show note counts per category
    Counts,

    /// List notes, all of them or one category's
    List {
        /// random, school or personal
        #[arg(value_parser = alias_value)]
        category: Option<CategoryAlias>,
    },

    /// Print one note
    Show { id: Uuid },

    /// Create an empty note
    Create {
        /// random, school or personal
        #[arg(value_parser = alias_value)]
        category: Option<CategoryAlias>,
    },

    /// Update parts of a note
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// random, school or personal
        #[arg(long, value_parser = alias_value)]
        category: Option<CategoryAlias>,
    },

    /// Delete a note
    Delete { id: Uuid },
}

fn alias_value(raw: &str) -> Result<CategoryAlias, String> {
    CategoryAlias::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not a category; use random, school or personal"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "takenotes=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    let relay = Relay::new();

    // Print failed-request notifications the way the web UI shows toasts.
    let _toast_printer = relay.subscribe(|n| {
        let title = n.title.as_deref().unwrap_or("Notice");
        eprintln!("[{}] {}: {}", n.kind, title, n.message);
    });

    let client = TakeNotesClient::new(config, FileBackend::new(session_path()), relay);

    match cli.command {
        Commands::SignUp { email, password } => {
            let user = client
                .sign_up(&email, &password)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("signed up as {}", user.email);
        }
        Commands::SignIn { email, password } => {
            let user = client
                .sign_in(&email, &password)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("signed in as {}", user.email);
        }
        Commands::SignOut => {
            client.sign_out();
            println!("signed out");
        }
        Commands::Whoami => match client.current_user() {
            Some(user) => println!("{}", user.email),
            None => println!("not signed in"),
        },
        Commands::Categories => {
            for category in client.list_categories().await? {
                match category.note_count {
                    Some(count) => println!("{}  {}  ({count} notes)", category.color, category.name),
                    None => println!("{}  {}", category.color, category.name),
                }
            }
        }
        Commands::Counts => {
            let counts = client.category_counts().await?;
            let mut names: Vec<_> = counts.keys().collect();
            names.sort();
            for name in names {
                println!("{name}: {}", counts[name]);
            }
        }
        Commands::List { category } => {
            let filter = category.map(NoteFilter::Alias);
            for note in client.list_notes(filter).await? {
                let label = note.last_edited_label.as_deref().unwrap_or("");
                let title = if note.title.is_empty() { "(untitled)" } else { note.title.as_str() };
                println!("{}  {:<10}  {}", note.id, label, title);
            }
        }
        Commands::Show { id } => match client.get_note(id).await? {
            Some(note) => {
                println!("{}", if note.title.is_empty() { "(untitled)" } else { note.title.as_str() });
                if let Some(name) = &note.category_name {
                    println!("category: {name}");
                }
                println!("edited: {}", note.last_edited_label.as_deref().unwrap_or("?"));
                println!("\n{}", note.content);
            }
            None => println!("note not found"),
        },
        Commands::Create { category } => {
            let category = match category {
                Some(alias) => Some(resolve_category(&client, alias).await?),
                None => None,
            };
            let note = client.create_note(category).await?;
            println!("created {}", note.id);
        }
        Commands::Edit {
            id,
            title,
            content,
            category,
        } => {
            let mut patch = NotePatch {
                title,
                content,
                category: None,
            };
            if let Some(alias) = category {
                patch.category = Some(resolve_category(&client, alias).await?);
            }
            if patch.is_empty() {
                bail!("nothing to change; pass --title, --content or --category");
            }
            let note = client.update_note(id, &patch).await?;
            println!(
                "updated {} ({})",
                note.id,
                note.last_edited_label.as_deref().unwrap_or("now")
            );
        }
        Commands::Delete { id } => {
            client.delete_note(id).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

async fn resolve_category(client: &TakeNotesClient, alias: CategoryAlias) -> Result<Uuid> {
    client
        .resolve_alias(alias)
        .await?
        .with_context(|| format!("no category on the server matches '{alias}'"))
}

fn session_path() -> PathBuf {
    if let Some(path) = env::var_os("TAKENOTES_SESSION_FILE") {
        return PathBuf::from(path);
    }
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".takenotes").join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const NOTE_ID: &str = "0b0f7f6e-9f6b-4f2e-8f64-000000000001";

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_flags_parse_into_patch_fields() {
        let cli = Cli::try_parse_from([
            "takenotes", "edit", NOTE_ID, "--title", "X", "--category", "school",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                title,
                content,
                category,
                ..
            } => {
                assert_eq!(title.as_deref(), Some("X"));
                assert!(content.is_none());
                assert_eq!(category, Some(CategoryAlias::School));
            }
            _ => panic!("expected the edit subcommand"),
        }
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let result = Cli::try_parse_from(["takenotes", "edit", NOTE_ID, "--tilte", "X"]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_category_aliases_are_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["takenotes", "list", "work"]).is_err());
        assert!(Cli::try_parse_from(["takenotes", "list", "school"]).is_ok());
    }

    #[test]
    fn bad_note_ids_are_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["takenotes", "show", "not-a-uuid"]).is_err());
        assert!(Cli::try_parse_from(["takenotes", "show", NOTE_ID]).is_ok());
    }
}
