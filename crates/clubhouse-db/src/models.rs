//! Row types as stored. Wire shapes live in clubhouse-types; the API layer
//! converts between the two.

/// `password` is an argon2 PHC string.
pub struct TeacherRow {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: String,
}

pub struct ActivityRow {
    pub name: String,
    pub description: String,
    pub schedule: String,
    /// JSON array of day names, NULL when the activity has no structured schedule.
    pub days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_participants: i64,
}

pub struct AnnouncementRow {
    pub id: String,
    pub message: String,
    pub start_date: Option<String>,
    pub expiration_date: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

/// How an update treats the stored start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDateUpdate {
    Keep,
    Clear,
    Set(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    ActivityNotFound,
    AlreadyEnrolled,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Withdrawn,
    ActivityNotFound,
    NotEnrolled,
}
