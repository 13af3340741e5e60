use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{
    Json,
    extract::{Query, State},
};
use rand_core::OsRng;
use tracing::{debug, info};

use clubhouse_db::Database;
use clubhouse_db::models::TeacherRow;
use clubhouse_types::api::{LoginParams, UsernameParams};
use clubhouse_types::models::{Role, User};

use crate::error::ApiError;
use crate::{AppState, blocking};

/// POST /auth/login?username=&password=
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Result<Json<User>, ApiError> {
    let username = params.username.clone();
    let teacher = blocking(&state, move |db| {
        let teacher = db
            .get_teacher(&params.username)?
            .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

        if !verify_password(&params.password, &teacher.password)? {
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
        Ok(teacher)
    })
    .await?;

    info!("Teacher {} logged in", username);
    Ok(Json(user_from_row(teacher)))
}

/// GET /auth/check-session?username=
pub async fn check_session(
    State(state): State<AppState>,
    Query(params): Query<UsernameParams>,
) -> Result<Json<User>, ApiError> {
    let teacher = blocking(&state, move |db| {
        db.get_teacher(&params.username)?
            .ok_or_else(|| ApiError::not_found("Teacher not found"))
    })
    .await?;

    debug!("Session confirmed for {}", teacher.username);
    Ok(Json(user_from_row(teacher)))
}

/// Resolve the acting teacher for an authenticated action.
pub(crate) fn require_teacher(
    db: &Database,
    username: &str,
    detail: &str,
) -> Result<TeacherRow, ApiError> {
    if username.is_empty() {
        return Err(ApiError::unauthorized(detail));
    }
    db.get_teacher(username)?
        .ok_or_else(|| ApiError::unauthorized(detail))
}

/// Hash a password with Argon2id.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("Corrupt password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn user_from_row(row: TeacherRow) -> User {
    let role = match row.role.as_str() {
        "admin" => Role::Admin,
        _ => Role::Teacher,
    };
    User {
        username: row.username,
        display_name: row.display_name,
        role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("chess456").unwrap();
        assert!(verify_password("chess456", &hash).unwrap());
        assert!(!verify_password("chess457", &hash).unwrap());
    }

    #[test]
    fn unknown_roles_fall_back_to_teacher() {
        let user = user_from_row(TeacherRow {
            username: "x".into(),
            display_name: "X".into(),
            password: String::new(),
            role: "substitute".into(),
        });
        assert_eq!(user.role, Role::Teacher);
    }
}
