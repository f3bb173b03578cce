use clap::{Parser, Subcommand};
use tracing::warn;

use crate::db::Database;
use crate::demo;
use crate::error::{Result, StoreError};
use crate::models::{ClientPhone, ClientQuery, ClientUpdate, PhoneReplacement};

#[derive(Parser, Debug)]
#[command(name = "contact-manager", version, about = "Clients and their phone numbers")]
pub struct Cli {
    /// Database URL, overrides DATABASE_URL and the DB_* variables
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands and their flags
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the tables if they do not exist
    Init,

    /// Drop and recreate the tables
    Reset,

    /// Add a client, optionally with a first phone number
    AddClient {
        #[arg(long)]
        name: String,

        #[arg(long)]
        surname: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Add a phone number to an existing client
    AddPhone {
        #[arg(long)]
        client_id: i64,

        #[arg(long)]
        phone: String,
    },

    /// Change any of the client's fields.
    /// A phone is replaced by giving both the old and the new number
    UpdateClient {
        #[arg(long)]
        client_id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        surname: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Number to replace, must belong to the client
        #[arg(long, requires = "new_phone")]
        old_phone: Option<String>,

        #[arg(long, requires = "old_phone")]
        new_phone: Option<String>,
    },

    /// Delete one phone number of a client
    DeletePhone {
        #[arg(long)]
        client_id: i64,

        #[arg(long)]
        phone: String,
    },

    /// Delete a client and all of its phone numbers
    DeleteClient {
        #[arg(long)]
        client_id: i64,
    },

    /// Find clients by name, surname and email together, or by phone
    Find {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        surname: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// List every client with its phone numbers
    List,

    /// Reset the tables and run a scripted walk through every operation
    Demo,
}

impl Commands {
    /// Whether the tables must exist before the command runs. `init`, `reset`
    /// and `demo` set up the schema on their own, so a conflicting table does
    /// not stop a reset.
    pub fn needs_schema(&self) -> bool {
        !matches!(self, Commands::Init | Commands::Reset | Commands::Demo)
    }
}

pub async fn run(db: &mut Database, command: Commands) -> Result<()> {
    if command.needs_schema() {
        db.initialize_schema().await?;
    }

    match command {
        Commands::Init => {
            db.initialize_schema().await?;
            println!("Schema ready");
        }
        Commands::Reset => {
            db.reset_schema().await?;
            println!("Schema recreated");
        }
        Commands::AddClient {
            name,
            surname,
            email,
            phone,
        } => {
            let id = db
                .add_client(&name, &surname, &email, phone.as_deref())
                .await?;
            println!("Client added with client_id {id}");
        }
        Commands::AddPhone { client_id, phone } => {
            db.add_phone_number(client_id, &phone).await?;
            println!("Phone {phone} added to client_id {client_id}");
        }
        Commands::UpdateClient {
            client_id,
            name,
            surname,
            email,
            old_phone,
            new_phone,
        } => {
            let phone = match (old_phone, new_phone) {
                (Some(old), Some(new)) => Some(PhoneReplacement { old, new }),
                _ => None,
            };
            let update = ClientUpdate {
                name,
                surname,
                email,
                phone,
            };
            db.update_client(client_id, &update).await?;
            println!("Client {client_id} updated");
        }
        Commands::DeletePhone { client_id, phone } => {
            db.delete_phone(client_id, &phone).await?;
            println!("Phone {phone} removed from client_id {client_id}");
        }
        Commands::DeleteClient { client_id } => {
            if db.delete_client(client_id).await? {
                println!("Client {client_id} deleted");
            } else {
                println!("No client with client_id {client_id}");
            }
        }
        Commands::Find {
            name,
            surname,
            email,
            phone,
        } => {
            let query = ClientQuery {
                name,
                surname,
                email,
                phone,
            };
            print_rows(&db.find_client(&query).await?);
        }
        Commands::List => print_rows(&db.list_clients().await?),
        Commands::Demo => demo::run(db).await?,
    }

    Ok(())
}

/// Turn lookup and input failures into a printed message. Other errors are
/// passed on.
pub fn report<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "operation aborted");
            println!("Error - {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub fn format_row(row: &ClientPhone) -> String {
    format!(
        "{:>4}. {:<20} {:<20} {:<30} {}",
        row.client_id,
        row.name,
        row.surname,
        row.email,
        row.phone_number.as_deref().unwrap_or("-")
    )
}

pub fn print_rows(rows: &[ClientPhone]) {
    if rows.is_empty() {
        println!("No matching clients");
        return;
    }

    for row in rows {
        println!("{}", format_row(row));
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_client_without_phone() {
        let cli = Cli::try_parse_from([
            "contact-manager",
            "add-client",
            "--name",
            "A",
            "--surname",
            "B",
            "--email",
            "a@x.com",
        ])
        .unwrap();

        match cli.command {
            Commands::AddClient { phone, name, .. } => {
                assert_eq!(name, "A");
                assert_eq!(phone, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_database_url() {
        let cli = Cli::try_parse_from([
            "contact-manager",
            "list",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();

        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn new_phone_requires_old_phone() {
        let result = Cli::try_parse_from([
            "contact-manager",
            "update-client",
            "--client-id",
            "2",
            "--new-phone",
            "789-012",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn schema_setup_commands_skip_the_schema_check() {
        assert!(!Commands::Init.needs_schema());
        assert!(!Commands::Reset.needs_schema());
        assert!(!Commands::Demo.needs_schema());
        assert!(Commands::List.needs_schema());
        assert!(Commands::DeleteClient { client_id: 1 }.needs_schema());
    }

    #[test]
    fn report_swallows_recoverable_errors() {
        let result: Result<()> = Err(StoreError::ClientNotFound(3));

        assert!(matches!(report(result), Ok(None)));
    }

    #[test]
    fn report_passes_fatal_errors() {
        let result: Result<()> = Err(StoreError::PhoneConflict("111".into()));

        assert!(matches!(report(result), Err(StoreError::PhoneConflict(_))));
    }

    #[test]
    fn row_without_phone() {
        let row = ClientPhone {
            client_id: 1,
            name: "A".into(),
            surname: "B".into(),
            email: "a@x.com".into(),
            phone_number: None,
        };

        let line = format_row(&row);

        assert!(line.starts_with("   1. A"));
        assert!(line.ends_with(" -"));
    }
}
