//! Route-level tests: drive the full router in-process over an in-memory,
//! seeded database.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clubhouse_api::{AppStateInner, router, seed};
use clubhouse_db::Database;
use clubhouse_types::models::Catalog;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    seed::seed_if_empty(&db).unwrap();
    router(AppStateInner::new(db))
}

async fn call_raw(app: &Router, method: Method, uri: &str) -> (StatusCode, Bytes) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = call_raw(app, method, uri).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn catalog_lists_seeded_activities_in_order() {
    let app = app();
    let (status, bytes) = call_raw(&app, Method::GET, "/activities").await;
    assert_eq!(status, StatusCode::OK);

    // serde_json's Value sorts keys; the typed catalog keeps wire order.
    let catalog: Catalog = serde_json::from_slice(&bytes).unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let names: Vec<&str> = catalog.iter().map(|(name, _)| name).collect();
    assert_eq!(names.first().copied(), Some("Chess Club"));
    assert_eq!(names.last().copied(), Some("Sunday Chess Tournament"));
    assert_eq!(
        body["Chess Club"]["participants"],
        serde_json::json!(["michael@school.edu", "daniel@school.edu"])
    );
    assert_eq!(body["Chess Club"]["schedule_details"]["start_time"], "15:15");
}

#[tokio::test]
async fn catalog_honours_day_and_time_window() {
    let app = app();
    let (_, body) = call(&app, Method::GET, "/activities?day=Tuesday&start_time=06:00&end_time=08:00").await;
    let mut names: Vec<&String> = body.as_object().unwrap().keys().collect();
    names.sort();
    assert_eq!(names, ["Math Club", "Programming Class"]);
}

#[tokio::test]
async fn signup_requires_a_known_teacher() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/activities/Chess%20Club/signup?email=new@school.edu").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Authentication required for this action");

    let (status, body) = call(
        &app,
        Method::POST,
        "/activities/Chess%20Club/signup?email=new@school.edu&teacher_username=nobody",
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid teacher credentials");
}

#[tokio::test]
async fn signup_then_unregister_round_trip_messages() {
    let app = app();
    let base = "/activities/Chess%20Club";

    let (status, body) = call(&app, Method::POST, &format!("{base}/signup?email=new@school.edu&teacher_username=mchen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Signed up new@school.edu for Chess Club");

    let (status, body) = call(&app, Method::POST, &format!("{base}/signup?email=new@school.edu&teacher_username=mchen")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Already signed up for this activity");

    let (status, body) = call(&app, Method::POST, &format!("{base}/unregister?email=new@school.edu&teacher_username=mchen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unregistered new@school.edu from Chess Club");

    let (status, body) = call(&app, Method::POST, &format!("{base}/unregister?email=new@school.edu&teacher_username=mchen")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Not registered for this activity");

    let (status, body) = call(&app, Method::POST, "/activities/Knitting/signup?email=a@school.edu&teacher_username=mchen").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Activity not found");
}

#[tokio::test]
async fn login_and_session_check() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/auth/login?username=mchen&password=chess456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Mr. Chen");
    assert_eq!(body["role"], "teacher");

    let (status, body) = call(&app, Method::POST, "/auth/login?username=mchen&password=wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid username or password");

    let (status, _) = call(&app, Method::GET, "/auth/check-session?username=principal").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/auth/check-session?username=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Teacher not found");
}

#[tokio::test]
async fn announcement_lifecycle() {
    let app = app();

    let (status, _) = call(&app, Method::GET, "/announcements/all?username=ghost").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = call(
        &app,
        Method::POST,
        "/announcements?message=%20%20Bake%20sale%20%20&expiration_date=2999-01-01&username=mchen",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["message"], "Bake sale");
    assert_eq!(created["created_by"], "mchen");
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, active) = call(&app, Method::GET, "/announcements").await;
    assert!(active.as_array().unwrap().iter().any(|a| a["_id"] == id.as_str()));

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/announcements/{id}?message=Bake%20sale%20moved&expiration_date=2999-01-01&username=mchen&start_date=2998-01-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["start_date"], "2998-01-01");
    assert_eq!(updated["updated_by"], "mchen");

    // Starts in the future, so it drops out of the public list.
    let (_, active) = call(&app, Method::GET, "/announcements").await;
    assert!(!active.as_array().unwrap().iter().any(|a| a["_id"] == id.as_str()));

    let (_, all) = call(&app, Method::GET, "/announcements/all?username=mchen").await;
    assert!(all.as_array().unwrap().iter().any(|a| a["_id"] == id.as_str()));

    let (status, body) = call(&app, Method::DELETE, &format!("/announcements/{id}?username=mchen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Announcement deleted successfully");

    let (status, body) = call(&app, Method::DELETE, &format!("/announcements/{id}?username=mchen")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Announcement not found");
}

#[tokio::test]
async fn announcement_validation_errors() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/announcements?message=hi&username=mchen").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Expiration date is required");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/announcements/not-a-uuid?message=hi&expiration_date=2999-01-01&username=mchen",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid announcement ID");
}
