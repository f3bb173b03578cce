use crate::error::{Result, StoreError};

/// SQL flavours the store knows how to create tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Resolve from `AnyConnection::backend_name`.
    pub fn from_backend(name: &str) -> Result<Self> {
        match name {
            "PostgreSQL" => Ok(Self::Postgres),
            "SQLite" => Ok(Self::Sqlite),
            other => Err(StoreError::Schema(format!("unsupported backend {other}"))),
        }
    }

    fn serial_key(self) -> &'static str {
        match self {
            Self::Postgres => "BIGSERIAL PRIMARY KEY",
            Self::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    pub fn create_clients(self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                client_id {},
                name TEXT NOT NULL CHECK (length(name) <= 50),
                surname TEXT NOT NULL CHECK (length(surname) <= 50),
                email TEXT NOT NULL CHECK (length(email) <= 50)
            )
            "#,
            self.serial_key()
        )
    }

    pub fn create_phones(self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS phones (
                id {},
                phone_number TEXT UNIQUE CHECK (length(phone_number) <= 20),
                client_id BIGINT NOT NULL REFERENCES clients(client_id)
            )
            "#,
            self.serial_key()
        )
    }
}

/// Column checks run after creation. They fail when a table of the same
/// name exists with a different shape.
pub const CHECK_CLIENTS_COLUMNS: &str = "SELECT client_id, name, surname, email FROM clients WHERE 1 = 0";
pub const CHECK_PHONES_COLUMNS: &str = "SELECT id, phone_number, client_id FROM phones WHERE 1 = 0";

pub const DROP_PHONES: &str = "DROP TABLE IF EXISTS phones";
pub const DROP_CLIENTS: &str = "DROP TABLE IF EXISTS clients";
