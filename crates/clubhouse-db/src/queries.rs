use crate::Database;
use crate::models::{
    ActivityRow, AnnouncementRow, EnrollOutcome, StartDateUpdate, TeacherRow, WithdrawOutcome,
};
use anyhow::Result;
use rusqlite::{Connection, Row};

const ANNOUNCEMENT_COLUMNS: &str =
    "id, message, start_date, expiration_date, created_by, created_at, updated_by, updated_at";

impl Database {
    // -- Teachers --

    pub fn create_teacher(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO teachers (username, display_name, password, role) VALUES (?1, ?2, ?3, ?4)",
                (username, display_name, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn get_teacher(&self, username: &str) -> Result<Option<TeacherRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT username, display_name, password, role FROM teachers WHERE username = ?1",
                [username],
                |row| {
                    Ok(TeacherRow {
                        username: row.get(0)?,
                        display_name: row.get(1)?,
                        password: row.get(2)?,
                        role: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn count_teachers(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "teachers"))
    }

    // -- Activities --

    pub fn insert_activity(&self, activity: &ActivityRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activities (name, description, schedule, days, start_time, end_time, max_participants)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    activity.name,
                    activity.description,
                    activity.schedule,
                    activity.days,
                    activity.start_time,
                    activity.end_time,
                    activity.max_participants,
                ],
            )?;
            Ok(())
        })
    }

    /// All activities in catalog order.
    pub fn list_activities(&self) -> Result<Vec<ActivityRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, description, schedule, days, start_time, end_time, max_participants
                 FROM activities
                 ORDER BY rowid",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(ActivityRow {
                        name: row.get(0)?,
                        description: row.get(1)?,
                        schedule: row.get(2)?,
                        days: row.get(3)?,
                        start_time: row.get(4)?,
                        end_time: row.get(5)?,
                        max_participants: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Every (activity_name, email) pair in registration order.
    pub fn list_participants(&self) -> Result<Vec<(String, String)>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT activity_name, email FROM participants ORDER BY id")?;

            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_activities(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "activities"))
    }

    /// Add a student to an activity. Existence, duplicate and capacity
    /// checks run under the same lock as the insert.
    pub fn enroll(&self, activity_name: &str, email: &str) -> Result<EnrollOutcome> {
        self.with_conn(|conn| {
            let capacity: Option<i64> = conn
                .query_row(
                    "SELECT max_participants FROM activities WHERE name = ?1",
                    [activity_name],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(capacity) = capacity else {
                return Ok(EnrollOutcome::ActivityNotFound);
            };

            if is_enrolled(conn, activity_name, email)? {
                return Ok(EnrollOutcome::AlreadyEnrolled);
            }

            let enrolled: i64 = conn.query_row(
                "SELECT COUNT(*) FROM participants WHERE activity_name = ?1",
                [activity_name],
                |row| row.get(0),
            )?;
            if enrolled >= capacity {
                return Ok(EnrollOutcome::Full);
            }

            conn.execute(
                "INSERT INTO participants (activity_name, email) VALUES (?1, ?2)",
                (activity_name, email),
            )?;
            Ok(EnrollOutcome::Enrolled)
        })
    }

    pub fn withdraw(&self, activity_name: &str, email: &str) -> Result<WithdrawOutcome> {
        self.with_conn(|conn| {
            let exists: Option<String> = conn
                .query_row(
                    "SELECT name FROM activities WHERE name = ?1",
                    [activity_name],
                    |row| row.get(0),
                )
                .optional()?;

            if exists.is_none() {
                return Ok(WithdrawOutcome::ActivityNotFound);
            }

            let removed = conn.execute(
                "DELETE FROM participants WHERE activity_name = ?1 AND email = ?2",
                (activity_name, email),
            )?;

            if removed == 0 {
                Ok(WithdrawOutcome::NotEnrolled)
            } else {
                Ok(WithdrawOutcome::Withdrawn)
            }
        })
    }

    // -- Announcements --

    pub fn insert_announcement(&self, row: &AnnouncementRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO announcements (id, message, start_date, expiration_date, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.id,
                    row.message,
                    row.start_date,
                    row.expiration_date,
                    row.created_by,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Announcements showing on `today`, most recently started first so the
    /// banner's first entry is stable. Undated starts sort last.
    pub fn list_active_announcements(&self, today: &str) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements
                 WHERE (start_date IS NULL OR start_date = '' OR start_date <= ?1)
                   AND expiration_date >= ?1
                 ORDER BY start_date IS NULL, start_date DESC, created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([today], announcement_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every announcement, newest first.
    pub fn list_all_announcements(&self) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], announcement_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the updated row, or `None` when no announcement has `id`.
    pub fn update_announcement(
        &self,
        id: &str,
        message: &str,
        expiration_date: &str,
        start_date: &StartDateUpdate,
        updated_by: &str,
        updated_at: &str,
    ) -> Result<Option<AnnouncementRow>> {
        self.with_conn(|conn| {
            let changed = match start_date {
                StartDateUpdate::Keep => conn.execute(
                    "UPDATE announcements
                     SET message = ?2, expiration_date = ?3, updated_by = ?4, updated_at = ?5
                     WHERE id = ?1",
                    (id, message, expiration_date, updated_by, updated_at),
                )?,
                StartDateUpdate::Clear => conn.execute(
                    "UPDATE announcements
                     SET message = ?2, expiration_date = ?3, updated_by = ?4, updated_at = ?5,
                         start_date = NULL
                     WHERE id = ?1",
                    (id, message, expiration_date, updated_by, updated_at),
                )?,
                StartDateUpdate::Set(start) => conn.execute(
                    "UPDATE announcements
                     SET message = ?2, expiration_date = ?3, updated_by = ?4, updated_at = ?5,
                         start_date = ?6
                     WHERE id = ?1",
                    (id, message, expiration_date, updated_by, updated_at, start.as_str()),
                )?,
            };

            if changed == 0 {
                return Ok(None);
            }
            query_announcement(conn, id)
        })
    }

    /// Returns false when nothing was deleted.
    pub fn delete_announcement(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM announcements WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn count_announcements(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "announcements"))
    }
}

fn count(conn: &Connection, table: &str) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n)
}

fn is_enrolled(conn: &Connection, activity_name: &str, email: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM participants WHERE activity_name = ?1 AND email = ?2",
            (activity_name, email),
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn query_announcement(conn: &Connection, id: &str) -> Result<Option<AnnouncementRow>> {
    let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?1");
    conn.query_row(&sql, [id], announcement_from_row).optional()
}

fn announcement_from_row(row: &Row<'_>) -> rusqlite::Result<AnnouncementRow> {
    Ok(AnnouncementRow {
        id: row.get(0)?,
        message: row.get(1)?,
        start_date: row.get(2)?,
        expiration_date: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
        updated_by: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
