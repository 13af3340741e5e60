use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS teachers (
            username        TEXT PRIMARY KEY,
            display_name    TEXT NOT NULL,
            password        TEXT NOT NULL,
            role            TEXT NOT NULL DEFAULT 'teacher'
        );

        -- Catalog order is rowid order.
        CREATE TABLE IF NOT EXISTS activities (
            name                TEXT PRIMARY KEY,
            description         TEXT NOT NULL,
            schedule            TEXT NOT NULL,
            days                TEXT,
            start_time          TEXT,
            end_time            TEXT,
            max_participants    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS participants (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_name   TEXT NOT NULL REFERENCES activities(name) ON DELETE CASCADE,
            email           TEXT NOT NULL,
            UNIQUE(activity_name, email)
        );

        CREATE INDEX IF NOT EXISTS idx_participants_activity
            ON participants(activity_name, id);

        CREATE TABLE IF NOT EXISTS announcements (
            id                  TEXT PRIMARY KEY,
            message             TEXT NOT NULL,
            start_date          TEXT,
            expiration_date     TEXT NOT NULL,
            created_by          TEXT NOT NULL,
            created_at          TEXT NOT NULL,
            updated_by          TEXT,
            updated_at          TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_announcements_window
            ON announcements(expiration_date, start_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
