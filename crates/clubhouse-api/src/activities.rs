use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::{info, warn};

use clubhouse_db::Database;
use clubhouse_db::models::{ActivityRow, EnrollOutcome, WithdrawOutcome};
use clubhouse_types::api::{ActivityFilter, EnrollmentParams, MessageResponse};
use clubhouse_types::models::{Activity, Catalog, ScheduleDetails};

use crate::auth::require_teacher;
use crate::error::ApiError;
use crate::{AppState, blocking};

/// GET /activities?day=&start_time=&end_time=
pub async fn list_activities(
    State(state): State<AppState>,
    Query(filter): Query<ActivityFilter>,
) -> Result<Json<Catalog>, ApiError> {
    let catalog = blocking(&state, move |db| load_catalog(db, &filter)).await?;
    Ok(Json(catalog))
}

/// POST /activities/{name}/signup?email=&teacher_username=
pub async fn signup(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<EnrollmentParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let activity = name.clone();
    let email = params.email.clone();
    blocking(&state, move |db| {
        authorize(db, params.teacher_username.as_deref())?;
        match db.enroll(&name, &params.email)? {
            EnrollOutcome::Enrolled => Ok(()),
            EnrollOutcome::ActivityNotFound => Err(ApiError::not_found("Activity not found")),
            EnrollOutcome::AlreadyEnrolled => {
                Err(ApiError::bad_request("Already signed up for this activity"))
            }
            EnrollOutcome::Full => Err(ApiError::bad_request("Activity is full")),
        }
    })
    .await?;

    info!("Signed up {} for {}", email, activity);
    Ok(Json(MessageResponse {
        message: format!("Signed up {email} for {activity}"),
    }))
}

/// POST /activities/{name}/unregister?email=&teacher_username=
pub async fn unregister(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<EnrollmentParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let activity = name.clone();
    let email = params.email.clone();
    blocking(&state, move |db| {
        authorize(db, params.teacher_username.as_deref())?;
        match db.withdraw(&name, &params.email)? {
            WithdrawOutcome::Withdrawn => Ok(()),
            WithdrawOutcome::ActivityNotFound => Err(ApiError::not_found("Activity not found")),
            WithdrawOutcome::NotEnrolled => {
                Err(ApiError::bad_request("Not registered for this activity"))
            }
        }
    })
    .await?;

    info!("Unregistered {} from {}", email, activity);
    Ok(Json(MessageResponse {
        message: format!("Unregistered {email} from {activity}"),
    }))
}

fn authorize(db: &Database, teacher_username: Option<&str>) -> Result<(), ApiError> {
    let username = teacher_username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authentication required for this action"))?;
    require_teacher(db, username, "Invalid teacher credentials")?;
    Ok(())
}

fn load_catalog(db: &Database, filter: &ActivityFilter) -> Result<Catalog, ApiError> {
    let rows = db.list_activities()?;

    let mut participants: HashMap<String, Vec<String>> = HashMap::new();
    for (activity, email) in db.list_participants()? {
        participants.entry(activity).or_default().push(email);
    }

    let catalog = rows
        .into_iter()
        .map(|row| {
            let enrolled = participants.remove(&row.name).unwrap_or_default();
            to_activity(row, enrolled)
        })
        .filter(|(_, activity)| matches_filter(activity, filter))
        .collect();

    Ok(catalog)
}

fn to_activity(row: ActivityRow, participants: Vec<String>) -> (String, Activity) {
    let schedule_details = match (row.days, row.start_time, row.end_time) {
        (Some(days), Some(start_time), Some(end_time)) => {
            match serde_json::from_str::<Vec<String>>(&days) {
                Ok(days) => Some(ScheduleDetails { days, start_time, end_time }),
                Err(e) => {
                    warn!("Corrupt days '{}' on activity '{}': {}", days, row.name, e);
                    None
                }
            }
        }
        _ => None,
    };

    let activity = Activity {
        description: row.description,
        schedule: row.schedule,
        schedule_details,
        max_participants: u32::try_from(row.max_participants).unwrap_or(0),
        participants,
    };
    (row.name, activity)
}

/// Activities without a structured schedule only pass an empty filter.
fn matches_filter(activity: &Activity, filter: &ActivityFilter) -> bool {
    if filter == &ActivityFilter::default() {
        return true;
    }
    let Some(details) = &activity.schedule_details else {
        return false;
    };

    if let Some(day) = &filter.day {
        if !details.days.iter().any(|d| d == day) {
            return false;
        }
    }
    if let Some(start) = &filter.start_time {
        if details.start_time.as_str() < start.as_str() {
            return false;
        }
    }
    if let Some(end) = &filter.end_time {
        if details.end_time.as_str() > end.as_str() {
            return false;
        }
    }
    true
}
