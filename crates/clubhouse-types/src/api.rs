use serde::{Deserialize, Serialize};

// Every endpoint takes its inputs as query-string parameters; these structs
// are serialized by the client and deserialized by the server.

// -- Activities --

/// Server-side narrowing for `GET /activities`. "Weekend" is not a server
/// filter; the client resolves it locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Shared by `/signup` and `/unregister`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentParams {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_username: Option<String>,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

/// `?username=` as used by session checks, the management list and deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameParams {
    pub username: String,
}

// -- Announcements --

/// Create/update payload.
///
/// On update an empty `start_date` clears the stored one while an absent
/// `start_date` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementParams {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

// -- Responses --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
