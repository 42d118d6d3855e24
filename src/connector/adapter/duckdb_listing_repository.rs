use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, OptionalExt, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ListingRepository;
use crate::domain::{normalize_link, DomainError, Listing, RawListing, UpsertOutcome};

const SELECT_COLUMNS: &str =
    "SELECT id, title, company_name, description, link, source, created_at, updated_at FROM listings";

/// Listing store backed by a DuckDB file.
///
/// The normalized link is kept in its own `link_key` column with a unique
/// constraint, so two rows can never describe the same posting.
pub struct DuckdbListingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbListingRepository {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                company_name TEXT NOT NULL,
                description TEXT NOT NULL,
                link TEXT NOT NULL,
                link_key TEXT NOT NULL UNIQUE,
                source TEXT,
                created_at BIGINT,
                updated_at BIGINT
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB listing schema initialized");
        Ok(())
    }

    fn row_to_listing(row: &Row<'_>) -> duckdb::Result<Listing> {
        Ok(Listing::reconstitute(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn query_one(
        conn: &Connection,
        filter: &str,
        value: &str,
    ) -> Result<Option<Listing>, DomainError> {
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE {filter} = ?1"))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        stmt.query_row(params![value], Self::row_to_listing)
            .optional()
            .map_err(|e| DomainError::storage(format!("Failed to query listing: {}", e)))
    }
}

#[async_trait]
impl ListingRepository for DuckdbListingRepository {
    async fn upsert_by_link(&self, raw: &RawListing) -> Result<UpsertOutcome, DomainError> {
        let key = raw
            .link_key()
            .ok_or_else(|| DomainError::invalid_input("Listing has no link"))?;

        // Lookup and write happen under one lock so concurrent upserts of the
        // same link cannot both insert.
        let conn = self.conn.lock().await;

        if let Some(mut existing) = Self::query_one(&conn, "link_key", &key)? {
            existing.apply_update(raw);
            conn.execute(
                "UPDATE listings SET title = ?1, company_name = ?2, description = ?3, updated_at = ?4 WHERE id = ?5",
                params![
                    existing.title(),
                    existing.company_name(),
                    existing.description(),
                    existing.updated_at(),
                    existing.id(),
                ],
            )
            .map_err(|e| DomainError::storage(format!("Failed to update listing: {}", e)))?;

            return Ok(UpsertOutcome::Updated(existing.id().to_string()));
        }

        let listing = Listing::from_raw(raw);
        conn.execute(
            r#"
            INSERT INTO listings (id, title, company_name, description, link, link_key, source, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                listing.id(),
                listing.title(),
                listing.company_name(),
                listing.description(),
                listing.link(),
                key,
                listing.source(),
                listing.created_at(),
                listing.updated_at(),
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to insert listing: {}", e)))?;

        Ok(UpsertOutcome::Inserted(listing.id().to_string()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, DomainError> {
        let conn = self.conn.lock().await;
        Self::query_one(&conn, "id", id)
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Listing>, DomainError> {
        let conn = self.conn.lock().await;
        Self::query_one(&conn, "link_key", &normalize_link(link))
    }

    async fn list(&self) -> Result<Vec<Listing>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC NULLS LAST, id"
            ))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map([], Self::row_to_listing)
            .map_err(|e| DomainError::storage(format!("Failed to query listings: {}", e)))?;

        let mut listings = Vec::new();
        for row in rows {
            listings
                .push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }
        Ok(listings)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count listings: {}", e)))?;
        Ok(count as u64)
    }
}
