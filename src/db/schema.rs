//! Database schema and migrations for Kairan.
//!
//! Migrations are applied in order; `schema_version` records which ones
//! have run. Timestamps are stored as UTC text in
//! [`TIMESTAMP_FORMAT`](super::TIMESTAMP_FORMAT) on both backends.

/// Database migrations.
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- stored as provided, compared verbatim
    role        TEXT NOT NULL DEFAULT 'user',  -- 'admin', 'user'
    created_at  TEXT NOT NULL
);
"#,
    // v2: posts
    r#"
CREATE TABLE posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT,
    content     TEXT NOT NULL,
    category    TEXT NOT NULL,
    filename    TEXT,
    filetype    TEXT,
    like_count  INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
    created_at  TEXT NOT NULL,
    CHECK ((filename IS NULL) = (filetype IS NULL))
);

CREATE INDEX idx_posts_category_created ON posts(category, created_at, id);
"#,
];

/// Database migrations.
#[cfg(feature = "postgres")]
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          BIGSERIAL PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'user',
    created_at  TEXT NOT NULL
);
"#,
    // v2: posts
    r#"
CREATE TABLE posts (
    id          BIGSERIAL PRIMARY KEY,
    title       TEXT,
    content     TEXT NOT NULL,
    category    TEXT NOT NULL,
    filename    TEXT,
    filetype    TEXT,
    like_count  BIGINT NOT NULL DEFAULT 0 CHECK (like_count >= 0),
    created_at  TEXT NOT NULL,
    CHECK ((filename IS NULL) = (filetype IS NULL))
);

CREATE INDEX idx_posts_category_created ON posts(category, created_at, id);
"#,
];
