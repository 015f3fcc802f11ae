use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result};

use crate::core::AppError;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Surrogate row id, assigned by the store
    pub id: i64,
    /// Telegram ID of the user (unique)
    pub telegram_id: i64,
    /// Full name collected during registration
    pub name: String,
    /// Phone number shared via the contact button
    pub phone: String,
    /// Row creation timestamp (store-assigned)
    pub created_at: String,
}

/// A published video announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: i64,
    /// Menu title; not unique-enforced
    pub title: String,
    /// Opaque link, no format validation
    pub youtube_link: String,
    pub created_at: String,
}

/// An admin allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: i64,
    pub telegram_id: i64,
    pub created_at: String,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and creates the
/// schema idempotently. Schema creation failure is fatal: the caller is
/// expected to abort startup.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, AppError> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Create all tables if they do not exist yet.
///
/// Safe to run on every startup.
pub fn init_schema(conn: &DbConnection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            telegram_id BIGINT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            youtube_link TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            telegram_id BIGINT UNIQUE NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );",
    )
}

/// Insert a newly registered user.
pub fn create_user(conn: &DbConnection, telegram_id: i64, name: &str, phone: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (telegram_id, name, phone) VALUES (?1, ?2, ?3)",
        params![telegram_id, name, phone],
    )?;
    Ok(())
}

/// Look up a user by Telegram ID.
///
/// Returns `Ok(None)` when no such user is registered.
pub fn get_user_by_telegram_id(conn: &DbConnection, telegram_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, telegram_id, name, phone, created_at FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                telegram_id: row.get(1)?,
                name: row.get(2)?,
                phone: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

/// List all registered users, ordered by row id.
pub fn get_all_users(conn: &DbConnection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, telegram_id, name, phone, created_at FROM users ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(User {
            id: row.get(0)?,
            telegram_id: row.get(1)?,
            name: row.get(2)?,
            phone: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;
    rows.collect()
}

/// Delete a user by Telegram ID.
///
/// Deleting an absent user is a no-op. Returns the number of rows removed.
pub fn delete_user_by_telegram_id(conn: &DbConnection, telegram_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM users WHERE telegram_id = ?1", params![telegram_id])
}

/// Insert a new video announcement.
pub fn create_video(conn: &DbConnection, title: &str, youtube_link: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO videos (title, youtube_link) VALUES (?1, ?2)",
        params![title, youtube_link],
    )?;
    Ok(())
}

/// List all videos, ordered by row id.
pub fn get_all_videos(conn: &DbConnection) -> Result<Vec<Video>> {
    let mut stmt = conn.prepare("SELECT id, title, youtube_link, created_at FROM videos ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Video {
            id: row.get(0)?,
            title: row.get(1)?,
            youtube_link: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Look up a video by exact title.
///
/// When several videos share a title, the oldest row wins.
pub fn get_video_by_title(conn: &DbConnection, title: &str) -> Result<Option<Video>> {
    conn.query_row(
        "SELECT id, title, youtube_link, created_at FROM videos WHERE title = ?1 ORDER BY id LIMIT 1",
        params![title],
        |row| {
            Ok(Video {
                id: row.get(0)?,
                title: row.get(1)?,
                youtube_link: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Delete a video by row id. Absent ids are a no-op.
pub fn delete_video_by_id(conn: &DbConnection, video_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM videos WHERE id = ?1", params![video_id])
}

/// Add an admin. Idempotent: inserting the same Telegram ID twice leaves
/// exactly one row.
pub fn add_admin(conn: &DbConnection, telegram_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO admins (telegram_id) VALUES (?1)",
        params![telegram_id],
    )?;
    Ok(())
}

/// Check admin membership for a Telegram ID.
pub fn is_admin(conn: &DbConnection, telegram_id: i64) -> Result<bool> {
    let row: Option<i64> = conn
        .query_row(
            "SELECT id FROM admins WHERE telegram_id = ?1",
            params![telegram_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(row.is_some())
}

/// List all admins, ordered by row id.
pub fn get_all_admins(conn: &DbConnection) -> Result<Vec<Admin>> {
    let mut stmt = conn.prepare("SELECT id, telegram_id, created_at FROM admins ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Admin {
            id: row.get(0)?,
            telegram_id: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;
    rows.collect()
}
