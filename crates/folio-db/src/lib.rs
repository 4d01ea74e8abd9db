//! # folio-db
//!
//! PostgreSQL storage layer for folio.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations of the folio-core entity store traits
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_db::Database;
//! use folio_core::PlacementService;
//!
//! let db = Database::connect("postgres://localhost/folio").await?;
//! db.migrate().await?;
//! let service = db.placement_service();
//! ```

pub mod documents;
pub mod folders;
pub mod organizations;
pub mod pool;

// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::Row;

// Re-export core types
pub use folio_core::*;

pub use documents::PgDocumentRepository;
pub use folders::PgFolderRepository;
pub use organizations::PgOrganizationRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig, PoolHealth};

/// Read a BIGINT id column into a typed identifier.
pub(crate) fn decode_id<T>(r: &PgRow, column: &str) -> Result<T>
where
    T: TryFrom<i64, Error = InvalidId>,
{
    let raw: i64 = r.try_get(column).map_err(Error::Database)?;
    T::try_from(raw).map_err(|e| Error::CorruptRecord(format!("{}: {}", column, e)))
}

/// Nullable variant of [`decode_id`].
pub(crate) fn decode_opt_id<T>(r: &PgRow, column: &str) -> Result<Option<T>>
where
    T: TryFrom<i64, Error = InvalidId>,
{
    let raw: Option<i64> = r.try_get(column).map_err(Error::Database)?;
    raw.map(|v| T::try_from(v).map_err(|e| Error::CorruptRecord(format!("{}: {}", column, e))))
        .transpose()
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub documents: PgDocumentRepository,
    pub folders: PgFolderRepository,
    pub organizations: PgOrganizationRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: PgDocumentRepository::new(pool.clone()),
            folders: PgFolderRepository::new(pool.clone()),
            organizations: PgOrganizationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Placement service backed by this database.
    pub fn placement_service(&self) -> PlacementService {
        PlacementService::new(
            Arc::new(self.documents.clone()),
            Arc::new(self.folders.clone()),
            Arc::new(self.organizations.clone()),
        )
    }
}
