mod schema;

use std::time::Duration;

use sqlx::{AnyConnection, Connection};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::models::{nullable_text, Client, ClientPhone, ClientQuery, ClientUpdate, Phone};

pub use schema::Dialect;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Contact store over a single database connection.
///
/// Every operation that touches more than one statement runs inside a
/// transaction. The transaction is committed at the end of the happy path
/// and rolled back when dropped on any other path.
pub struct Database {
    conn: AnyConnection,
    dialect: Dialect,
}

impl Database {
    /// Open a connection using the default timeout
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_timeout(url, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let conn = match tokio::time::timeout(timeout, AnyConnection::connect(url)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(StoreError::Connectivity(e.to_string())),
            Err(_) => {
                return Err(StoreError::Connectivity(format!(
                    "timed out after {}s",
                    timeout.as_secs()
                )));
            }
        };

        let dialect = Dialect::from_backend(conn.backend_name())?;
        debug!(?dialect, "database connection opened");

        Ok(Self { conn, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // Schema operations

    /// Create both tables if they are absent, then check their columns.
    pub async fn initialize_schema(&mut self) -> Result<()> {
        let schema_error = |e: sqlx::Error| StoreError::Schema(e.to_string());

        let mut tx = self.conn.begin().await?;

        sqlx::query(&self.dialect.create_clients())
            .execute(&mut *tx)
            .await
            .map_err(schema_error)?;

        sqlx::query(&self.dialect.create_phones())
            .execute(&mut *tx)
            .await
            .map_err(schema_error)?;

        sqlx::query(schema::CHECK_CLIENTS_COLUMNS)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Schema(format!("clients has an unexpected shape: {e}")))?;

        sqlx::query(schema::CHECK_PHONES_COLUMNS)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Schema(format!("phones has an unexpected shape: {e}")))?;

        tx.commit().await?;
        info!("schema ready");

        Ok(())
    }

    /// Drop both tables, phones first.
    pub async fn drop_schema(&mut self) -> Result<()> {
        let mut tx = self.conn.begin().await?;

        sqlx::query(schema::DROP_PHONES).execute(&mut *tx).await?;
        sqlx::query(schema::DROP_CLIENTS).execute(&mut *tx).await?;

        tx.commit().await?;
        info!("schema dropped");

        Ok(())
    }

    pub async fn reset_schema(&mut self) -> Result<()> {
        self.drop_schema().await?;
        self.initialize_schema().await
    }

    // Client operations

    /// Insert a client together with its first phone row and return the new id.
    /// `phone` may be `None`, in which case the phone row holds NULL.
    pub async fn add_client(
        &mut self,
        name: &str,
        surname: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<i64> {
        // Start a transaction
        let mut tx = self.conn.begin().await?;

        let client_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO clients (name, surname, email)
            VALUES ($1, $2, $3)
            RETURNING client_id
            "#,
        )
        .bind(name)
        .bind(surname)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO phones (phone_number, client_id)
            VALUES (CAST($1 AS TEXT), $2)
            "#,
        )
        .bind(phone)
        .bind(client_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::from_phone_insert(e, phone.unwrap_or_default()))?;

        // Commit the transaction
        tx.commit().await?;
        info!(client_id, "client added");

        Ok(client_id)
    }

    pub async fn get_client(&mut self, client_id: i64) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT client_id, name, surname, email FROM clients WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&mut self.conn)
        .await?;

        Ok(client)
    }

    /// Apply the given changes to one client.
    ///
    /// A phone replacement is checked before anything is written: if
    /// `old` is not among the client's numbers the call fails with
    /// [`StoreError::InvalidInput`] and nothing changes.
    pub async fn update_client(&mut self, client_id: i64, update: &ClientUpdate) -> Result<()> {
        if update.is_empty() {
            debug!(client_id, "nothing to update");
            return Ok(());
        }

        let mut tx = self.conn.begin().await?;

        ensure_client(&mut tx, client_id).await?;

        if let Some(replacement) = &update.phone {
            let phones = phones_of(&mut tx, client_id).await?;
            debug!(client_id, ?phones, "phones listed for replacement");

            if !phones.iter().flatten().any(|p| *p == replacement.old) {
                warn!(client_id, old = %replacement.old, "replacement phone not listed");
                return Err(StoreError::InvalidInput(format!(
                    "phone number {} is not listed for client_id {}",
                    replacement.old, client_id
                )));
            }
        }

        if let Some(name) = &update.name {
            sqlx::query("UPDATE clients SET name = $1 WHERE client_id = $2")
                .bind(name.as_str())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(surname) = &update.surname {
            sqlx::query("UPDATE clients SET surname = $1 WHERE client_id = $2")
                .bind(surname.as_str())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(email) = &update.email {
            sqlx::query("UPDATE clients SET email = $1 WHERE client_id = $2")
                .bind(email.as_str())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(replacement) = &update.phone {
            sqlx::query(
                r#"
                UPDATE phones
                SET phone_number = $1
                WHERE client_id = $2 AND phone_number = $3
                "#,
            )
            .bind(replacement.new.as_str())
            .bind(client_id)
            .bind(replacement.old.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_phone_insert(e, &replacement.new))?;
        }

        tx.commit().await?;
        info!(client_id, "client updated");

        Ok(())
    }

    /// Remove a client and every phone it owns. Returns whether a client row
    /// was deleted; an unknown id is a no-op.
    pub async fn delete_client(&mut self, client_id: i64) -> Result<bool> {
        // Start a transaction
        let mut tx = self.conn.begin().await?;

        // Phones reference the client, so they go first
        let phones = sqlx::query("DELETE FROM phones WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let clients = sqlx::query("DELETE FROM clients WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Commit the transaction
        tx.commit().await?;

        if clients > 0 {
            info!(client_id, phones, "client deleted");
        } else {
            debug!(client_id, "no client to delete");
        }

        Ok(clients > 0)
    }

    // Phone operations

    /// Attach another phone to an existing client and return the phone row id.
    pub async fn add_phone_number(&mut self, client_id: i64, phone: &str) -> Result<i64> {
        let mut tx = self.conn.begin().await?;

        ensure_client(&mut tx, client_id).await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO phones (phone_number, client_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(phone)
        .bind(client_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_phone_insert(e, phone))?;

        tx.commit().await?;
        info!(client_id, phone, "phone added");

        Ok(id)
    }

    /// Delete one phone of an existing client. Deleting a number the client
    /// does not have is a no-op.
    pub async fn delete_phone(&mut self, client_id: i64, phone: &str) -> Result<()> {
        let mut tx = self.conn.begin().await?;

        ensure_client(&mut tx, client_id).await?;

        let deleted = sqlx::query("DELETE FROM phones WHERE client_id = $1 AND phone_number = $2")
            .bind(client_id)
            .bind(phone)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!(client_id, phone, deleted, "phone deleted");

        Ok(())
    }

    pub async fn get_phones(&mut self, client_id: i64) -> Result<Vec<Phone>> {
        let phones = sqlx::query_as::<_, Phone>(
            "SELECT id, phone_number, client_id FROM phones WHERE client_id = $1 ORDER BY id ASC",
        )
        .bind(client_id)
        .fetch_all(&mut self.conn)
        .await?;

        Ok(phones)
    }

    /// Phone numbers of a client through a left join: a client with no phone
    /// rows yields a single `None`, an unknown client yields nothing.
    pub async fn client_phones(&mut self, client_id: i64) -> Result<Vec<Option<String>>> {
        phones_of(&mut self.conn, client_id).await
    }

    // Lookup

    /// Rows of `clients LEFT JOIN phones` where name, surname and email all
    /// match, or where the phone matches. The phone branch does not look at
    /// the other three filters. Absent filters bind NULL and never match.
    // The casts keep NULL parameters typed as text on every backend.
    pub async fn find_client(&mut self, query: &ClientQuery) -> Result<Vec<ClientPhone>> {
        let rows = sqlx::query_as::<_, ClientPhone>(
            r#"
            SELECT c.client_id, c.name, c.surname, c.email, p.phone_number
            FROM clients c
            LEFT JOIN phones p ON p.client_id = c.client_id
            WHERE (c.name = CAST($1 AS TEXT)
                   AND c.surname = CAST($2 AS TEXT)
                   AND c.email = CAST($3 AS TEXT))
               OR p.phone_number = CAST($4 AS TEXT)
            ORDER BY c.client_id ASC, p.id ASC
            "#,
        )
        .bind(query.name.as_deref())
        .bind(query.surname.as_deref())
        .bind(query.email.as_deref())
        .bind(query.phone.as_deref())
        .fetch_all(&mut self.conn)
        .await?;

        debug!(?query, rows = rows.len(), "find_client");

        Ok(rows)
    }

    pub async fn list_clients(&mut self) -> Result<Vec<ClientPhone>> {
        let rows = sqlx::query_as::<_, ClientPhone>(
            r#"
            SELECT c.client_id, c.name, c.surname, c.email, p.phone_number
            FROM clients c
            LEFT JOIN phones p ON p.client_id = c.client_id
            ORDER BY c.client_id ASC, p.id ASC
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(rows)
    }
}

async fn ensure_client(conn: &mut AnyConnection, client_id: i64) -> Result<()> {
    let found = sqlx::query_scalar::<_, i64>("SELECT client_id FROM clients WHERE client_id = $1")
        .bind(client_id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => {
            warn!(client_id, "client is missing");
            Err(StoreError::ClientNotFound(client_id))
        }
    }
}

async fn phones_of(conn: &mut AnyConnection, client_id: i64) -> Result<Vec<Option<String>>> {
    let rows = sqlx::query(
        r#"
        SELECT p.phone_number
        FROM clients c
        LEFT JOIN phones p ON p.client_id = c.client_id
        WHERE c.client_id = $1
        ORDER BY p.id ASC
        "#,
    )
    .bind(client_id)
    .fetch_all(&mut *conn)
    .await?;

    let phones = rows
        .iter()
        .map(|row| nullable_text(row, "phone_number"))
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

    Ok(phones)
}

/// Open the connection. Commands create or reset the tables themselves.
pub async fn init(url: &str, timeout: Duration) -> Result<Database> {
    Database::connect_with_timeout(url, timeout).await
}
