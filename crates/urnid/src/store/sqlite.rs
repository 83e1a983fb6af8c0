use core::time::Duration;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdentityHandle, IdentityRecord, IdentityStore, Result, StructureType};

/// Default time a caller waits for another process to release the table.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS urn_table (
        urn_id       INTEGER PRIMARY KEY AUTOINCREMENT,
        werk_id      TEXT NOT NULL DEFAULT '',
        struktur_typ TEXT NOT NULL DEFAULT '',
        urn          TEXT
    );
    CREATE INDEX IF NOT EXISTS urn_table_werk_struktur ON urn_table (werk_id, struktur_typ);
    CREATE INDEX IF NOT EXISTS urn_table_urn ON urn_table (urn);
";

/// An [`IdentityStore`] backed by a SQLite database file.
///
/// Every allocation runs inside an `EXCLUSIVE` transaction, which takes the
/// database-wide write lock before the lookup and holds it until the insert
/// is committed. Other processes opening the same file block (up to the busy
/// timeout) instead of racing the lookup. Dropping the transaction on an
/// early return rolls back and releases the lock.
///
/// `AUTOINCREMENT` guarantees the id of a removed row is never handed out
/// again.
pub struct SqliteIdentityStore {
    conn: Mutex<Connection>,
}

impl SqliteIdentityStore {
    /// Opens (and if needed creates) the identity table in the database at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::bootstrap(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Reads a single row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the query fails.
    pub fn record(&self, id: i64) -> Result<Option<IdentityRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT urn_id, werk_id, struktur_typ, urn FROM urn_table WHERE urn_id = ?1",
                params![id],
                |row| {
                    Ok(IdentityRecord {
                        id: row.get(0)?,
                        work_id: row.get(1)?,
                        structure_type: row.get(2)?,
                        urn: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Number of rows in the identity table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the query fails.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM urn_table", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::Storage {
            reason: format!("row count '{count}' cannot be represented as usize"),
        })
    }

    /// Whether the identity table has no rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn insert(tx: &Transaction<'_>, work_id: &str, structure_type: &str) -> Result<i64> {
        tx.execute(
            "INSERT INTO urn_table (werk_id, struktur_typ, urn) VALUES (?1, ?2, NULL)",
            params![work_id, structure_type],
        )?;
        Ok(tx.last_insert_rowid())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, work_id: &str, structure_type: &str) -> i64 {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO urn_table (werk_id, struktur_typ, urn) VALUES (?1, ?2, NULL)",
            params![work_id, structure_type],
        )
        .unwrap();
        conn.last_insert_rowid()
    }
}

impl IdentityStore for SqliteIdentityStore {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, structure), fields(structure_type = %structure.name)))]
    fn allocate(&self, work_id: Option<&str>, structure: &StructureType) -> Result<IdentityHandle> {
        let work_id = work_id.unwrap_or("");
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let handle = if structure.is_singleton_scoped() {
            let rows = {
                let mut stmt = tx.prepare(
                    "SELECT urn_id, urn FROM urn_table WHERE werk_id = ?1 AND struktur_typ = ?2",
                )?;
                stmt.query_map(params![work_id, structure.name], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
            };

            match rows.as_slice() {
                [] => IdentityHandle::fresh(Self::insert(&tx, work_id, &structure.name)?),
                [(id, urn)] => IdentityHandle::existing(*id, urn.clone()),
                _ => {
                    return Err(Error::InconsistentStore {
                        work_id: work_id.to_owned(),
                        structure_type: structure.name.clone(),
                        rows: rows.len(),
                    });
                }
            }
        } else {
            IdentityHandle::fresh(Self::insert(&tx, work_id, &structure.name)?)
        };

        tx.commit()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(id = handle.id, existing = handle.is_existing, "allocated URN id");

        Ok(handle)
    }

    fn write_back(&self, handle: &IdentityHandle, urn: &str) -> bool {
        if handle.is_existing {
            #[cfg(feature = "tracing")]
            tracing::warn!(id = handle.id, "refusing to overwrite the URN of a reused entry");
            return false;
        }

        let conn = self.conn.lock();
        match conn.execute(
            "UPDATE urn_table SET urn = ?1 WHERE urn_id = ?2",
            params![urn, handle.id],
        ) {
            Ok(changed) => changed == 1,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(id = handle.id, error = %_e, "could not write URN to database");
                false
            }
        }
    }

    fn remove(&self, id: i64) -> bool {
        let conn = self.conn.lock();
        match conn.execute("DELETE FROM urn_table WHERE urn_id = ?1", params![id]) {
            Ok(changed) => changed == 1,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(id, error = %_e, "could not remove URN id from database");
                false
            }
        }
    }

    fn find_by_urn_value(&self, urn: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM urn_table WHERE urn = ?1)",
            params![urn],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}
