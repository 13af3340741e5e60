use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;
use uuid::Uuid;

use clubhouse_db::models::{AnnouncementRow, StartDateUpdate};
use clubhouse_types::api::{AnnouncementParams, MessageResponse, UsernameParams};
use clubhouse_types::models::Announcement;

use crate::auth::require_teacher;
use crate::error::ApiError;
use crate::{AppState, blocking};

const AUTH_REQUIRED: &str = "Authentication required";

/// GET /announcements: only those showing today.
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let today = today();
    let rows = blocking(&state, move |db| Ok(db.list_active_announcements(&today)?)).await?;
    Ok(Json(rows.into_iter().map(to_announcement).collect()))
}

/// GET /announcements/all?username=: management list, newest first.
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<UsernameParams>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let rows = blocking(&state, move |db| {
        require_teacher(db, &params.username, AUTH_REQUIRED)?;
        Ok(db.list_all_announcements()?)
    })
    .await?;
    Ok(Json(rows.into_iter().map(to_announcement).collect()))
}

/// POST /announcements?message=&expiration_date=&username=&start_date=
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementParams>,
) -> Result<Json<Announcement>, ApiError> {
    let row = blocking(&state, move |db| {
        require_teacher(db, &params.username, AUTH_REQUIRED)?;
        let message = validate(&params)?;

        let row = AnnouncementRow {
            id: Uuid::new_v4().to_string(),
            message,
            start_date: params.start_date.filter(|s| !s.is_empty()),
            expiration_date: params.expiration_date,
            created_by: params.username,
            created_at: now(),
            updated_by: None,
            updated_at: None,
        };
        db.insert_announcement(&row)?;
        Ok(row)
    })
    .await?;

    info!("Announcement {} created by {}", row.id, row.created_by);
    Ok(Json(to_announcement(row)))
}

/// PUT /announcements/{id}?message=&expiration_date=&username=&start_date=
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AnnouncementParams>,
) -> Result<Json<Announcement>, ApiError> {
    let row = blocking(&state, move |db| {
        require_teacher(db, &params.username, AUTH_REQUIRED)?;
        let message = validate(&params)?;
        parse_id(&id)?;

        let start_date = match params.start_date {
            None => StartDateUpdate::Keep,
            Some(s) if s.is_empty() => StartDateUpdate::Clear,
            Some(s) => StartDateUpdate::Set(s),
        };

        db.update_announcement(
            &id,
            &message,
            &params.expiration_date,
            &start_date,
            &params.username,
            &now(),
        )?
        .ok_or_else(|| ApiError::not_found("Announcement not found"))
    })
    .await?;

    info!("Announcement {} updated", row.id);
    Ok(Json(to_announcement(row)))
}

/// DELETE /announcements/{id}?username=
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UsernameParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted_id = id.clone();
    blocking(&state, move |db| {
        require_teacher(db, &params.username, AUTH_REQUIRED)?;
        parse_id(&id)?;
        if db.delete_announcement(&id)? {
            Ok(())
        } else {
            Err(ApiError::not_found("Announcement not found"))
        }
    })
    .await?;

    info!("Announcement {} deleted", deleted_id);
    Ok(Json(MessageResponse {
        message: "Announcement deleted successfully".into(),
    }))
}

/// Returns the trimmed message.
fn validate(params: &AnnouncementParams) -> Result<String, ApiError> {
    if params.expiration_date.is_empty() {
        return Err(ApiError::bad_request("Expiration date is required"));
    }
    let message = params.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    Ok(message.to_string())
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    id.parse::<Uuid>()
        .map_err(|_| ApiError::bad_request("Invalid announcement ID"))
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn to_announcement(row: AnnouncementRow) -> Announcement {
    Announcement {
        id: row.id,
        message: row.message,
        start_date: row.start_date,
        expiration_date: row.expiration_date,
        created_by: Some(row.created_by),
        created_at: Some(row.created_at),
        updated_by: row.updated_by,
        updated_at: row.updated_at,
    }
}
