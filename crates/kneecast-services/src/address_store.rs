use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use kneecast_core::{DatabaseError, RusqliteErrorExt};
use kneecast_weather::Coordinates;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::address::SavedAddress;

const COLUMNS: &str = "id, address_name, latitude, longitude, is_selected, created_at";

type Result<T> = std::result::Result<T, DatabaseError>;

fn db_err(e: rusqlite::Error) -> DatabaseError {
    e.into_database_error()
}

fn row_to_address(row: &Row<'_>) -> rusqlite::Result<SavedAddress> {
    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(SavedAddress {
        id: row.get(0)?,
        name: row.get(1)?,
        coordinates: Coordinates::new(row.get(2)?, row.get(3)?),
        is_selected: row.get(4)?,
        created_at,
    })
}

/// SQLite storage for saved addresses
pub struct SavedAddressStore {
    conn: Connection,
}

impl SavedAddressStore {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionFailed(format!("{}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path).map_err(db_err)?;
        tracing::debug!("Opened address store at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(db_err)?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS saved_addresses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address_name TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                is_selected INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_saved_addresses_name ON saved_addresses(address_name);",
            )
            .map_err(db_err)
    }

    /// Save an address, optionally making it the selected one.
    ///
    /// Saving the same name and coordinates twice returns the existing row.
    pub fn add(&self, name: &str, coordinates: Coordinates, selected: bool) -> Result<SavedAddress> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::InvalidData("address name must not be empty".into()));
        }
        if !coordinates.is_valid() {
            return Err(DatabaseError::InvalidData(format!("coordinates out of range: {}", coordinates)));
        }

        let existing = self.find_exact(name, coordinates)?;
        let id = match existing {
            Some(address) => {
                tracing::debug!("Address '{}' already saved as {}", name, address.id);
                address.id
            }
            None => {
                let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                self.conn
                    .execute(
                        "INSERT INTO saved_addresses (address_name, latitude, longitude, is_selected, created_at)
                         VALUES (?1, ?2, ?3, 0, ?4)",
                        params![name, coordinates.latitude, coordinates.longitude, created_at],
                    )
                    .map_err(db_err)?;
                let id = self.conn.last_insert_rowid();
                tracing::info!("Saved address '{}' ({}) as {}", name, coordinates, id);
                id
            }
        };

        if selected {
            self.select(id)?;
        }

        self.get(id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("saved address {}", id)))
    }

    fn find_exact(&self, name: &str, coordinates: Coordinates) -> Result<Option<SavedAddress>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM saved_addresses
                     WHERE address_name = ?1 AND latitude = ?2 AND longitude = ?3 LIMIT 1",
                    COLUMNS
                ),
                params![name, coordinates.latitude, coordinates.longitude],
                row_to_address,
            )
            .optional()
            .map_err(db_err)
    }

    /// All saved addresses, newest first
    pub fn list(&self) -> Result<Vec<SavedAddress>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM saved_addresses ORDER BY created_at DESC, id DESC",
                COLUMNS
            ))
            .map_err(db_err)?;

        let addresses = stmt
            .query_map([], row_to_address)
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;

        Ok(addresses)
    }

    pub fn get(&self, id: i64) -> Result<Option<SavedAddress>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM saved_addresses WHERE id = ?1", COLUMNS),
                [id],
                row_to_address,
            )
            .optional()
            .map_err(db_err)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<SavedAddress>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM saved_addresses WHERE address_name = ?1 ORDER BY id DESC LIMIT 1",
                    COLUMNS
                ),
                [name.trim()],
                row_to_address,
            )
            .optional()
            .map_err(db_err)
    }

    /// The selected address, if any
    pub fn selected(&self) -> Result<Option<SavedAddress>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM saved_addresses WHERE is_selected = 1 LIMIT 1", COLUMNS),
                [],
                row_to_address,
            )
            .optional()
            .map_err(db_err)
    }

    /// Make `id` the only selected address.
    pub fn select(&self, id: i64) -> Result<()> {
        if self.get(id)?.is_none() {
            return Err(DatabaseError::NotFound(format!("saved address {}", id)));
        }

        self.conn
            .execute(
                "UPDATE saved_addresses SET is_selected = CASE WHEN id = ?1 THEN 1 ELSE 0 END",
                [id],
            )
            .map_err(db_err)?;
        tracing::debug!("Selected address {}", id);
        Ok(())
    }

    /// Returns whether a row was deleted.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM saved_addresses WHERE id = ?1", [id])
            .map_err(db_err)?;
        Ok(deleted > 0)
    }

    /// Delete every address with this name, returning how many were removed.
    pub fn delete_by_name(&self, name: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM saved_addresses WHERE address_name = ?1", [name.trim()])
            .map_err(db_err)?;
        if deleted > 0 {
            tracing::info!("Removed {} saved address(es) named '{}'", deleted, name.trim());
        }
        Ok(deleted)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM saved_addresses", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
