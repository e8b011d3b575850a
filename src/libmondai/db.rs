use log::{debug, error, info};
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use std::path::Path;
use std::time::Instant;

/// Key the editor state blob is stored under.
pub const STORAGE_KEY: &str = "mondai_editor_v1";

/// Single-key blob store backed by SQLite. Read and write failures are
/// logged and swallowed; the in-memory store stays authoritative for the
/// session.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create_or_open(src: &Path) -> Result<Storage> {
        if src.exists() {
            info!("[DB] Opening existing Database");
            Self::open_db(src)
        } else {
            info!("[DB] Creating new Database");
            Self::create_db(src)
        }
    }

    fn create_db(dest: &Path) -> Result<Storage> {
        let now = Instant::now();
        let conn = init_db(Connection::open_in_memory()?)?;
        match conn.backup(DatabaseName::Main, dest, None) {
            Ok(_) => {
                debug!(
                    "[DB] Creating and Saving took {} ms.",
                    now.elapsed().as_millis()
                );
                Ok(Storage { conn })
            }
            Err(err) => {
                error!("[DB] Failed to create database file: {}", err);
                Err(err)
            }
        }
    }

    fn open_db(src: &Path) -> Result<Storage> {
        let now = Instant::now();
        let conn = Connection::open(src)?;
        debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
        Ok(Storage { conn })
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Storage> {
        Ok(Storage {
            conn: init_db(Connection::open_in_memory()?)?,
        })
    }

    /// Returns the saved blob, if any. A failed read clears the stale entry
    /// so the editor falls back to a fresh seeded state.
    pub fn load(&self) -> Option<String> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM Storage WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get(0),
            )
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                error!("[DB] Error while loading saved questions: {:?}", err);
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, blob: &str) {
        match self.conn.execute(
            "INSERT INTO Storage(key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![STORAGE_KEY, blob],
        ) {
            Ok(_) => debug!("[DB] Saved {} bytes under '{}'", blob.len(), STORAGE_KEY),
            Err(err) => error!("[DB] Error while saving questions: {:?}", err),
        }
    }

    pub fn clear(&self) {
        match self
            .conn
            .execute("DELETE FROM Storage WHERE key = ?1", params![STORAGE_KEY])
        {
            Ok(_) => debug!("[DB] Cleared '{}'", STORAGE_KEY),
            Err(err) => error!("[DB] Error while clearing saved questions: {:?}", err),
        }
    }

    pub fn close(self) {
        info!("[DB] Closing Database");
        match self.conn.close() {
            Ok(_) => (),
            Err((conn, _)) => {
                error!("[DB] Cannot close connection. Retrying...");
                if let Err((_, err)) = conn.close() {
                    error!("[DB] Cannot close connection: {:?}. Giving up.", err);
                }
            }
        }
    }
}

fn init_db(conn: Connection) -> Result<Connection> {
    info!("[DB INIT] Creating tables");
    conn.execute(
        "CREATE TABLE Storage (
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              PRIMARY KEY (key)
            )",
        (),
    )?;
    info!("[DB INIT] Created table Storage");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear_round_trip() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.load(), None);

        storage.save(r#"{"questions": [], "currentQuestion": 0}"#);
        assert_eq!(
            storage.load().as_deref(),
            Some(r#"{"questions": [], "currentQuestion": 0}"#)
        );

        storage.save("updated");
        assert_eq!(storage.load().as_deref(), Some("updated"));

        storage.clear();
        assert_eq!(storage.load(), None);
        storage.close();
    }
}
