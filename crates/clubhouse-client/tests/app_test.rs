//! End-to-end client tests: the real router on a loopback port over a
//! seeded in-memory database, driven through the `App` controller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use clubhouse_api::{AppStateInner, router, seed};
use clubhouse_client::catalog::{Category, TimeRange};
use clubhouse_client::session::{FileStore, MemoryStore, SESSION_KEY, SessionStore};
use clubhouse_client::view::{CatalogView, Screen};
use clubhouse_client::{ApiClient, App};
use clubhouse_db::Database;
use clubhouse_types::models::{Role, User};

async fn spawn_server() -> String {
    let db = Database::open_in_memory().unwrap();
    seed::seed_if_empty(&db).unwrap();
    let app = router(AppStateInner::new(db));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serve a hand-written router, for responses the real server never sends.
async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn stub_activity() -> Value {
    json!({"description": "d", "schedule": "s", "max_participants": 10, "participants": []})
}

async fn started_app() -> App<MemoryStore> {
    let base = spawn_server().await;
    let app = App::new(ApiClient::new(&base).unwrap(), MemoryStore::new());
    app.start().await;
    app
}

fn temp_session(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("clubhouse_{}_{}.json", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn card_names(screen: &Screen) -> Vec<String> {
    match &screen.catalog {
        CatalogView::Cards(cards) => cards.iter().map(|c| c.name.clone()).collect(),
        other => panic!("expected cards, got {other:?}"),
    }
}

fn toast_text(screen: &Screen) -> Option<String> {
    screen.toast.as_ref().map(|n| n.text.clone())
}

#[tokio::test]
async fn start_loads_catalog_and_banner() {
    let app = started_app().await;
    let screen = app.screen_now();

    let names = card_names(&screen);
    assert_eq!(names.len(), 9);
    assert_eq!(names[0], "Chess Club");
    assert_eq!(names[8], "Sunday Chess Tournament");
    assert!(screen.banner.is_some());
    assert!(screen.user.is_none());
}

#[tokio::test]
async fn logged_out_cards_have_no_controls() {
    let app = started_app().await;
    let CatalogView::Cards(cards) = app.screen_now().catalog else {
        panic!("catalog did not load");
    };
    for card in cards {
        assert!(card.register.is_none(), "{} has a register control", card.name);
        assert!(card.participants.iter().all(|p| !p.can_unregister));
    }
}

#[tokio::test]
async fn login_shows_errors_inline_then_welcomes() {
    let app = started_app().await;
    app.open_login();

    assert!(!app.login("mchen", "wrong").await);
    let screen = app.screen_now();
    let inline = screen.login.flatten().map(|n| n.text);
    assert_eq!(inline.as_deref(), Some("Invalid username or password"));
    assert!(screen.user.is_none());

    assert!(app.login("mchen", "chess456").await);
    let screen = app.screen_now();
    assert_eq!(toast_text(&screen).as_deref(), Some("Welcome, Mr. Chen!"));
    assert_eq!(screen.user.map(|u| u.display_name).as_deref(), Some("Mr. Chen"));

    let CatalogView::Cards(cards) = app.screen_now().catalog else {
        panic!("catalog did not load");
    };
    assert!(cards.iter().all(|c| c.register.is_some()));
}

#[tokio::test]
async fn empty_credentials_never_reach_the_server() {
    let app = started_app().await;
    app.open_login();
    assert!(!app.login("  ", "").await);
    let inline = app.screen_now().login.flatten().map(|n| n.text);
    assert_eq!(inline.as_deref(), Some("Please enter both username and password"));
}

#[tokio::test]
async fn logout_is_local_and_announced() {
    let app = started_app().await;
    assert!(app.login("principal", "admin789").await);
    assert_eq!(app.current_user().map(|u| u.role), Some(Role::Admin));

    app.logout();
    let screen = app.screen_now();
    assert!(screen.user.is_none());
    assert_eq!(toast_text(&screen).as_deref(), Some("You have been logged out."));
}

#[tokio::test]
async fn registration_requires_login() {
    let app = started_app().await;
    app.open_registration("Chess Club");
    let screen = app.screen_now();
    assert!(screen.registration.is_none());
    assert_eq!(
        toast_text(&screen).as_deref(),
        Some("You must be logged in as a teacher to register students.")
    );
}

#[tokio::test]
async fn register_student_refreshes_catalog() {
    let app = started_app().await;
    assert!(app.login("mchen", "chess456").await);

    app.open_registration("Chess Club");
    assert_eq!(
        app.screen_now().registration.as_deref(),
        Some("Register a student for Chess Club")
    );

    app.submit_registration("new@school.edu").await;
    let screen = app.screen_now();
    assert_eq!(
        toast_text(&screen).as_deref(),
        Some("Signed up new@school.edu for Chess Club")
    );
    let CatalogView::Cards(cards) = &screen.catalog else {
        panic!("catalog did not load");
    };
    let chess = cards.iter().find(|c| c.name == "Chess Club").unwrap();
    assert_eq!(chess.enrolled, 3);
    assert_eq!(chess.participants.last().map(|p| p.email.as_str()), Some("new@school.edu"));

    // Same student again: the server's detail is shown as is.
    app.open_registration("Chess Club");
    app.submit_registration("new@school.edu").await;
    assert_eq!(
        toast_text(&app.screen_now()).as_deref(),
        Some("Already signed up for this activity")
    );
}

#[tokio::test]
async fn unregister_goes_through_confirmation() {
    let app = started_app().await;
    assert!(app.login("mchen", "chess456").await);

    app.request_unregister("Chess Club", "daniel@school.edu");
    app.request_unregister("Chess Club", "michael@school.edu");
    assert_eq!(
        app.screen_now().confirm.as_deref(),
        Some("Are you sure you want to unregister michael@school.edu from Chess Club?")
    );

    app.confirm().await;
    let screen = app.screen_now();
    assert_eq!(
        toast_text(&screen).as_deref(),
        Some("Unregistered michael@school.edu from Chess Club")
    );
    let CatalogView::Cards(cards) = &screen.catalog else {
        panic!("catalog did not load");
    };
    let chess = cards.iter().find(|c| c.name == "Chess Club").unwrap();
    let emails: Vec<&str> = chess.participants.iter().map(|p| p.email.as_str()).collect();
    assert_eq!(emails, ["daniel@school.edu"]);

    // Only the latest request was pending.
    app.confirm().await;
    assert_eq!(app.screen_now().catalog, screen.catalog);
}

#[tokio::test]
async fn cancelled_unregister_sends_nothing() {
    let app = started_app().await;
    assert!(app.login("mchen", "chess456").await);
    let before = app.screen_now().catalog;

    app.request_unregister("Chess Club", "michael@school.edu");
    app.cancel_confirm();
    app.confirm().await;
    app.fetch_activities().await;
    assert_eq!(app.screen_now().catalog, before);
}

#[tokio::test]
async fn filters_combine_server_and_client_sides() {
    let app = started_app().await;

    app.set_time_range(Some(TimeRange::Weekend)).await;
    assert_eq!(
        card_names(&app.screen_now()),
        ["Weekend Robotics Workshop", "Sunday Chess Tournament"]
    );

    app.set_day(Some("tuesday")).await;
    app.set_time_range(Some(TimeRange::Morning)).await;
    assert_eq!(card_names(&app.screen_now()), ["Programming Class", "Math Club"]);

    app.set_day(None).await;
    app.set_time_range(None).await;
    app.set_category(Some(Category::Sports));
    assert_eq!(card_names(&app.screen_now()), ["Morning Fitness", "Soccer Team"]);

    app.set_category(None);
    app.set_search("ROBOT");
    assert_eq!(card_names(&app.screen_now()), ["Weekend Robotics Workshop"]);

    app.set_search("no such thing");
    assert_eq!(app.screen_now().catalog, CatalogView::Empty);
}

#[tokio::test]
async fn announcement_management_round_trip() {
    let app = started_app().await;

    app.open_announcement_manager().await;
    assert!(app.screen_now().announcements.is_none());

    assert!(app.login("mchen", "chess456").await);
    app.open_announcement_manager().await;
    let panel = app.screen_now().announcements.unwrap();
    assert_eq!(panel.rows.len(), 1);
    assert_eq!(panel.rows[0].badge(), "Active");

    // Blank message is caught before any request.
    app.new_announcement();
    app.update_draft(|d| d.expiration_date = "2999-01-01".into());
    assert!(!app.save_announcement().await);
    let message = app.screen_now().announcements.unwrap().message.unwrap();
    assert_eq!(message.text, "Message is required");

    app.update_draft(|d| d.message = "Bake sale Friday".into());
    assert!(app.save_announcement().await);
    let screen = app.screen_now();
    let panel = screen.announcements.unwrap();
    assert_eq!(panel.message.unwrap().text, "Announcement created successfully");
    assert!(panel.editor.is_none());
    assert_eq!(panel.rows.len(), 2);
    let id = panel
        .rows
        .iter()
        .find(|r| r.message == "Bake sale Friday")
        .map(|r| r.id.clone())
        .unwrap();

    app.edit_announcement(&id).await;
    let editor = app.screen_now().announcements.unwrap().editor.unwrap();
    assert!(editor.is_edit());
    assert_eq!(editor.message, "Bake sale Friday");

    app.update_draft(|d| {
        d.message = "Bake sale moved to Monday".into();
        d.start_date = "2998-01-01".into();
    });
    assert!(app.save_announcement().await);
    let panel = app.screen_now().announcements.unwrap();
    assert_eq!(panel.message.unwrap().text, "Announcement updated successfully");
    let row = panel.rows.iter().find(|r| r.id == id).unwrap();
    assert_eq!(row.message, "Bake sale moved to Monday");
    assert_eq!(row.badge(), "Inactive");

    app.request_delete_announcement(&id);
    assert_eq!(
        app.screen_now().confirm.as_deref(),
        Some("Are you sure you want to delete this announcement?")
    );
    app.confirm().await;
    let panel = app.screen_now().announcements.unwrap();
    assert_eq!(panel.message.unwrap().text, "Announcement deleted successfully");
    assert_eq!(panel.rows.len(), 1);
}

#[tokio::test]
async fn editing_an_unknown_announcement_reports_generic_error() {
    let app = started_app().await;
    assert!(app.login("mchen", "chess456").await);
    app.open_announcement_manager().await;

    app.edit_announcement("does-not-exist").await;
    let panel = app.screen_now().announcements.unwrap();
    assert!(panel.editor.is_none());
    assert_eq!(panel.message.unwrap().text, "Failed to load announcement details");
}

#[tokio::test]
async fn session_survives_restart() {
    let base = spawn_server().await;
    let path = temp_session("restart");

    let first = App::new(ApiClient::new(&base).unwrap(), FileStore::new(&path));
    first.start().await;
    assert!(first.login("mrodriguez", "art123").await);

    let second = App::new(ApiClient::new(&base).unwrap(), FileStore::new(&path));
    second.start().await;
    assert_eq!(
        second.current_user().map(|u| u.username).as_deref(),
        Some("mrodriguez")
    );
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn rejected_session_logs_out() {
    let base = spawn_server().await;
    let path = temp_session("rejected");
    let ghost = User {
        username: "ghost".into(),
        display_name: "Nobody".into(),
        role: Role::Teacher,
    };
    let store = FileStore::new(&path);
    store.set(SESSION_KEY, &serde_json::to_string(&ghost).unwrap()).unwrap();

    let app = App::new(ApiClient::new(&base).unwrap(), store);
    app.start().await;
    let screen = app.screen_now();
    assert!(screen.user.is_none());
    assert_eq!(toast_text(&screen).as_deref(), Some("You have been logged out."));
    assert_eq!(FileStore::new(&path).get(SESSION_KEY).unwrap(), None);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn unreachable_server_keeps_cached_session() {
    // Grab a free port, then close it again.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = MemoryStore::new();
    let teacher = User {
        username: "mchen".into(),
        display_name: "Mr. Chen".into(),
        role: Role::Teacher,
    };
    store.set(SESSION_KEY, &serde_json::to_string(&teacher).unwrap()).unwrap();

    let app = App::new(ApiClient::new(&format!("http://{addr}")).unwrap(), store);
    app.start().await;
    let screen = app.screen_now();
    assert_eq!(screen.user, Some(teacher));
    assert_eq!(screen.catalog, CatalogView::Failed);
    assert!(screen.banner.is_none());
    assert!(screen.toast.is_none());
}

#[tokio::test]
async fn stale_catalog_response_is_dropped() {
    // A day-filtered request answers long after the unfiltered one.
    let stub = Router::new().route(
        "/activities",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            if query.contains_key("day") {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({ "Slow": stub_activity() }))
            } else {
                Json(json!({ "Fast": stub_activity() }))
            }
        }),
    );
    let base = spawn_stub(stub).await;
    let app = App::new(ApiClient::new(&base).unwrap(), MemoryStore::new());

    tokio::join!(app.set_day(Some("monday")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.set_day(None).await;
    });
    assert_eq!(card_names(&app.screen_now()), ["Fast"]);
}

#[tokio::test]
async fn unreadable_announcement_list_reports_generic_error() {
    let teacher = User {
        username: "mchen".into(),
        display_name: "Mr. Chen".into(),
        role: Role::Teacher,
    };
    let session = serde_json::to_value(&teacher).unwrap();
    let stub = Router::new()
        .route("/auth/check-session", get(move || async move { Json(session) }))
        .route("/activities", get(|| async { Json(json!({})) }))
        .route("/announcements", get(|| async { Json(json!([])) }))
        .route("/announcements/all", get(|| async { Json(json!({ "oops": true })) }));
    let base = spawn_stub(stub).await;

    let store = MemoryStore::new();
    store.set(SESSION_KEY, &serde_json::to_string(&teacher).unwrap()).unwrap();
    let app = App::new(ApiClient::new(&base).unwrap(), store);
    app.start().await;
    assert_eq!(app.current_user(), Some(teacher));

    app.open_announcement_manager().await;
    app.edit_announcement("a1").await;
    let panel = app.screen_now().announcements.unwrap();
    assert!(panel.editor.is_none());
    assert_eq!(panel.message.unwrap().text, "Failed to load announcement details");
}
