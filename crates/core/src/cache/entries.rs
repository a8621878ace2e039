//! Entry operations: match, put and listing.
//!
//! Entries are keyed by [`RequestKey::hash`] within a store. Only GET keys can
//! be written; a non-GET lookup always misses.

use super::connection::CacheDb;
use super::key::RequestKey;
use super::response::Response;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Metadata of a stored entry, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntry {
    pub store: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub body_size: u64,
    pub stored_at: String,
}

type RawRow = (String, u16, String, Vec<u8>);

fn decode(row: Option<RawRow>) -> Result<Option<Response>, Error> {
    let Some((url, status, headers_json, body)) = row else {
        return Ok(None);
    };
    let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
    Ok(Some(Response { url, status, headers, body: body.into() }))
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

impl CacheDb {
    /// Write a snapshot into `store`, creating the store if needed.
    ///
    /// Uses UPSERT semantics: a later write for the same key replaces the
    /// earlier snapshot.
    pub async fn put_entry(&self, store: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        if !key.is_get() {
            return Err(Error::UnsupportedMethod(key.method.clone()));
        }

        let store = store.to_string();
        let key = key.clone();
        let headers_json = serde_json::to_string(&response.headers)?;
        let status = response.status;
        let body = response.body.to_vec();
        let body_size = body.len() as i64;
        let stored_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO stores (name, created_at) VALUES (?1, ?2)
                    ON CONFLICT(name) DO NOTHING",
                    params![store, stored_at],
                )?;
                let store_id: i64 = tx.query_row("SELECT id FROM stores WHERE name = ?1", params![store], |row| row.get(0))?;
                tx.execute(
                    "INSERT INTO entries (
                    store_id, key_hash, method, url, status, headers_json, body, body_size, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(store_id, key_hash) DO UPDATE SET
                    method = excluded.method,
                    url = excluded.url,
                    status = excluded.status,
                    headers_json = excluded.headers_json,
                    body = excluded.body,
                    body_size = excluded.body_size,
                    stored_at = excluded.stored_at",
                    params![
                        store_id,
                        key.hash(),
                        &key.method,
                        &key.url,
                        status,
                        headers_json,
                        body,
                        body_size,
                        stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key in one named store.
    pub async fn match_entry(&self, store: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        if !key.is_get() {
            return Ok(None);
        }

        let store = store.to_string();
        let key_hash = key.hash();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<RawRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.url, e.status, e.headers_json, e.body
                    FROM entries e JOIN stores s ON s.id = e.store_id
                    WHERE s.name = ?1 AND e.key_hash = ?2",
                )?;

                match stmt.query_row(params![store, key_hash], read_raw) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        decode(row)
    }

    /// Look up a key across every store, oldest store first.
    pub async fn match_any_entry(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        if !key.is_get() {
            return Ok(None);
        }

        let key_hash = key.hash();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<RawRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.url, e.status, e.headers_json, e.body
                    FROM entries e JOIN stores s ON s.id = e.store_id
                    WHERE e.key_hash = ?1
                    ORDER BY s.id ASC
                    LIMIT 1",
                )?;

                match stmt.query_row(params![key_hash], read_raw) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        decode(row)
    }

    /// List entry metadata for a store, oldest write first.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntry>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, e.method, e.url, e.status, e.body_size, e.stored_at
                    FROM entries e JOIN stores s ON s.id = e.store_id
                    WHERE s.name = ?1
                    ORDER BY e.stored_at ASC, e.url ASC",
                )?;
                let entries = stmt
                    .query_map(params![store], |row| {
                        Ok(CacheEntry {
                            store: row.get(0)?,
                            method: row.get(1)?,
                            url: row.get(2)?,
                            status: row.get(3)?,
                            body_size: row.get::<_, i64>(4)? as u64,
                            stored_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }
}
