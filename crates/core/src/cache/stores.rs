//! Named store operations.
//!
//! Stores are created on first open and listed in creation order. Deleting
//! a store cascades to all of its entries.

use super::connection::CacheDb;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A named store with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub total_bytes: u64,
}

impl CacheDb {
    /// Create the store if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO stores (name, created_at) VALUES (?1, ?2)
                    ON CONFLICT(name) DO NOTHING",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store names in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns whether the store existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Every store with entry count and stored body bytes.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, COUNT(e.key_hash), COALESCE(SUM(e.body_size), 0)
                    FROM stores s LEFT JOIN entries e ON e.store_id = s.id
                    GROUP BY s.id
                    ORDER BY s.id ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(1)? as u64,
                            total_bytes: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }
}
