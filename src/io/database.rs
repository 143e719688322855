use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::model::Rank;
use crate::ops::rank::RANK_GAP;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { supported: u32, found: u32 },
}

/// A persisted ticket row, as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub rank: Rank,
}

/// Identity and rank assigned to a newly inserted ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedTicket {
    pub id: i64,
    pub rank: Rank,
}

/// Row-level ticket storage. The store is the only caller.
pub trait TicketGateway: Send {
    /// All rows in ascending rank order
    fn get_tickets(&self) -> Result<Vec<TicketRow>, GatewayError>;
    /// Insert a row ranked after every existing row
    fn add_ticket(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<AddedTicket, GatewayError>;
    fn update_ticket_content(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<(), GatewayError>;
    fn update_status(&self, id: i64, status: &str) -> Result<(), GatewayError>;
    fn update_rank(&self, id: i64, rank: Rank) -> Result<(), GatewayError>;
    fn delete_ticket(&self, id: i64) -> Result<(), GatewayError>;
}

struct Migration {
    version: u32,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        up: "
            CREATE TABLE tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'Todo',
                rank INTEGER NOT NULL
            );
        ",
        down: "DROP TABLE tickets;",
    },
    Migration {
        version: 2,
        up: "CREATE UNIQUE INDEX tickets_rank_idx ON tickets(rank);",
        down: "DROP INDEX tickets_rank_idx;",
    },
];

/// Latest schema version this build knows how to run
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// SQLite-backed gateway
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    /// Open (creating if needed) the database file and its parent directory.
    /// The schema is not touched; call [`SqliteGateway::migrate`] next.
    pub fn open(path: &Path) -> Result<Self, GatewayError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GatewayError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(SqliteGateway { conn })
    }

    pub fn open_in_memory() -> Result<Self, GatewayError> {
        let conn = Connection::open_in_memory()?;
        Ok(SqliteGateway { conn })
    }

    /// Run `remigrate` down-migrations, then every pending up-migration.
    pub fn migrate(&mut self, remigrate: usize) -> Result<(), GatewayError> {
        self.ensure_migrations_table()?;

        let current = self.schema_version()?;
        let latest = latest_schema_version();
        if current > latest {
            return Err(GatewayError::UnsupportedSchemaVersion {
                supported: latest,
                found: current,
            });
        }

        if remigrate > 0 {
            tracing::info!(remigrate, "running down migrations");
        }
        for _ in 0..remigrate {
            let version = self.schema_version()?;
            let Some(migration) = MIGRATIONS.iter().find(|m| m.version == version) else {
                break;
            };
            let tx = self.conn.transaction()?;
            tx.execute_batch(migration.down)?;
            tx.execute(
                "DELETE FROM schema_migrations WHERE version = ?1",
                params![migration.version],
            )?;
            tx.commit()?;
            tracing::debug!(version = migration.version, "migrated down");
        }

        let current = self.schema_version()?;
        tracing::info!(from = current, to = latest, "running up migrations");
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = self.conn.transaction()?;
            tx.execute_batch(migration.up)?;
            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at)
                 VALUES (?1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))",
                params![migration.version],
            )?;
            tx.commit()?;
            tracing::debug!(version = migration.version, "migrated up");
        }
        Ok(())
    }

    /// Highest applied migration, 0 for a fresh database
    pub fn schema_version(&self) -> Result<u32, GatewayError> {
        let version = self
            .conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get::<_, Option<u32>>(0),
            )
            .optional()?
            .flatten();
        Ok(version.unwrap_or(0))
    }

    fn ensure_migrations_table(&self) -> Result<(), GatewayError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl TicketGateway for SqliteGateway {
    fn get_tickets(&self) -> Result<Vec<TicketRow>, GatewayError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, status, rank FROM tickets ORDER BY rank ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TicketRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                status: row.get(3)?,
                rank: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn add_ticket(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<AddedTicket, GatewayError> {
        let added = self.conn.query_row(
            "INSERT INTO tickets (title, description, rank)
             VALUES (?1, ?2, COALESCE((SELECT MAX(rank) FROM tickets), 0) + ?3)
             RETURNING id, rank",
            params![title, description, RANK_GAP],
            |row| {
                Ok(AddedTicket {
                    id: row.get(0)?,
                    rank: row.get(1)?,
                })
            },
        )?;
        Ok(added)
    }

    fn update_ticket_content(
        &self,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<(), GatewayError> {
        self.conn.execute(
            "UPDATE tickets SET title = ?2, description = ?3 WHERE id = ?1",
            params![id, title, description],
        )?;
        Ok(())
    }

    fn update_status(&self, id: i64, status: &str) -> Result<(), GatewayError> {
        self.conn.execute(
            "UPDATE tickets SET status = ?2 WHERE id = ?1",
            params![id, status],
        )?;
        Ok(())
    }

    fn update_rank(&self, id: i64, rank: Rank) -> Result<(), GatewayError> {
        self.conn.execute(
            "UPDATE tickets SET rank = ?2 WHERE id = ?1",
            params![id, rank],
        )?;
        Ok(())
    }

    fn delete_ticket(&self, id: i64) -> Result<(), GatewayError> {
        self.conn
            .execute("DELETE FROM tickets WHERE id = ?1", params![id])?;
        Ok(())
    }
}
