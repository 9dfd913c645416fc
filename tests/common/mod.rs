//! Test helpers for board tests.
//!
//! Provides a seeded in-memory board with a throwaway attachment directory.

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use kairan::config::SeedConfig;
use kairan::{AttachmentStore, BoardService, Database, Session, UserRepository};

/// Seeded board environment.
pub struct TestBoard {
    pub db: Database,
    pub storage: AttachmentStore,
    pub dir: TempDir,
}

impl TestBoard {
    /// In-memory database with the default accounts and an empty store.
    pub async fn new() -> Self {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool())
            .seed_defaults(&SeedConfig::default())
            .await
            .unwrap();
        let dir = TempDir::new().unwrap();
        let storage = AttachmentStore::new(dir.path().join("uploads")).unwrap();
        Self { db, storage, dir }
    }

    pub fn service(&self) -> BoardService<'_> {
        BoardService::new(&self.db, &self.storage)
    }

    /// Log in as the seeded administrator.
    pub async fn admin(&self) -> Session {
        self.login("admin", "pass123").await
    }

    /// Log in as the seeded regular user.
    pub async fn user(&self) -> Session {
        self.login("user1", "userpass").await
    }

    async fn login(&self, username: &str, credential: &str) -> Session {
        let mut carrier: Option<Session> = None;
        self.service()
            .login(&mut carrier, username, credential)
            .await
            .unwrap()
    }

    /// Number of files currently kept in the store.
    pub fn stored_file_count(&self) -> usize {
        count_files(self.storage.base_path())
    }
}

fn count_files(path: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(path) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
