//! Inventory database fixtures for integration tests.
//!
//! Every [`TestDb`] is a fresh SQLite file with the inventory schema applied,
//! removed again when the fixture is dropped.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_inventory::db::{DbPool, establish_connection_pool};
use pushkind_inventory::repository::DieselRepository;
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Migrated inventory database living in a temporary file.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("temp database file");
        let path = tempfile.path().to_str().expect("utf-8 temp path");
        let pool = establish_connection_pool(path).expect("inventory pool");

        let mut conn = pool.get().expect("pooled connection");
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .expect("inventory migrations");
        assert!(!applied.is_empty(), "schema migrations should run once");

        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Store backed by this database.
    #[allow(dead_code)]
    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}
