//! Durable bucket backed by an embedded redb database.

use std::path::Path;

use redb::{Database, TableDefinition};

use super::Bucket;
use crate::error::BucketError;

/// Bucket stored in a redb database file.
///
/// Each instance gets its own table (`<instance>/env`) inside the file, so
/// several instances can share one database without key collisions. Every
/// `put` is its own committed write transaction.
pub struct RedbBucket {
    db: Database,
    table: String,
}

fn backend(err: impl Into<redb::Error>) -> BucketError {
    BucketError::Backend(err.into().to_string())
}

impl RedbBucket {
    /// Open (or create) the database at `path` and the table for `instance`.
    pub fn open(path: impl AsRef<Path>, instance: &str) -> Result<Self, BucketError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(backend)?;
        let bucket = Self { db, table: format!("{instance}/env") };

        // Create the table up front so reads never see TableDoesNotExist.
        let txn = bucket.db.begin_write().map_err(backend)?;
        {
            let _table = txn.open_table(bucket.definition()).map_err(backend)?;
        }
        txn.commit().map_err(backend)?;

        tracing::debug!(path = %path.display(), table = %bucket.table, "Opened redb bucket");

        Ok(bucket)
    }

    /// Name of this instance's table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn definition(&self) -> TableDefinition<'_, &'static str, &'static [u8]> {
        TableDefinition::new(&self.table)
    }
}

impl Bucket for RedbBucket {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BucketError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(self.definition()).map_err(backend)?;
        let value = table.get(key).map_err(backend)?;

        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), BucketError> {
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(self.definition()).map_err(backend)?;
            table.insert(key, value).map_err(backend)?;
        }
        txn.commit().map_err(backend)?;

        Ok(())
    }
}
