//! Shared fixtures for gateway integration tests

#![allow(dead_code)]

use postacore::storage::{Database, PoolSettings};
use tempfile::TempDir;

/// A database in its own temporary directory, removed on drop.
pub struct TestDb {
    pub db: Database,
    pub path: String,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gateway.sqlite").to_string_lossy().into_owned();
        let db = Database::open_with(&path, PoolSettings { min_idle: 1, max_size: 8 }).expect("open database");
        Self { db, path, _dir: dir }
    }

    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.db.connection().expect("connection");
        conn.query_row(sql, [], |row| row.get(0)).expect("count query")
    }
}
