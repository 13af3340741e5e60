//! The client controller. Owns all UI state and runs the four flows (auth,
//! announcements, catalog, registration) against the API.
//!
//! Methods take `&self`; state sits behind a mutex that is never held
//! across an await. Every mutation is followed by a re-fetch, the local
//! copies are never patched.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use clubhouse_types::models::{Announcement, User};

use crate::announcements::{AnnouncementDraft, find_announcement};
use crate::api::ApiClient;
use crate::catalog::{Category, Filters, TimeRange, normalize_day};
use crate::error::ClientError;
use crate::modal::{AnnouncementForm, ConfirmDialog, LoginForm, PendingAction, RegistrationForm};
use crate::notify::{MessageSlot, Severity};
use crate::sequence::RequestSequencer;
use crate::session::{Revalidation, SessionCache, SessionStore, revalidate};
use crate::view::{AnnouncementPanel, AnnouncementRow, CatalogState, CatalogView, Screen, banner};

const GENERIC_ERROR: &str = "An error occurred";
const LOGIN_REQUIRED: &str = "You must be logged in as a teacher to register students.";
const LOGIN_REQUIRED_UNREGISTER: &str =
    "You must be logged in as a teacher to unregister students.";
const LOGIN_REQUIRED_ANNOUNCEMENTS: &str = "You must be logged in to manage announcements.";
const ANNOUNCEMENT_DETAILS_FAILED: &str = "Failed to load announcement details";

struct AppState {
    user: Option<User>,
    filters: Filters,
    catalog: CatalogState,
    active_announcements: Vec<Announcement>,
    all_announcements: Vec<Announcement>,
    toast: MessageSlot,
    login: LoginForm,
    registration: RegistrationForm,
    /// Built on first use, then reused.
    confirm: Option<ConfirmDialog>,
    announcements: AnnouncementForm,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            filters: Filters::default(),
            catalog: CatalogState::Loading,
            active_announcements: Vec::new(),
            all_announcements: Vec::new(),
            toast: MessageSlot::toast(),
            login: LoginForm::default(),
            registration: RegistrationForm::default(),
            confirm: None,
            announcements: AnnouncementForm::default(),
        }
    }
}

pub struct App<S: SessionStore> {
    api: ApiClient,
    session: SessionCache<S>,
    catalog_requests: RequestSequencer,
    state: Mutex<AppState>,
}

impl<S: SessionStore> App<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            session: SessionCache::new(store),
            catalog_requests: RequestSequencer::new(),
            state: Mutex::new(AppState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn toast(&self, text: impl Into<String>, severity: Severity) {
        self.state().toast.show(text, severity, Instant::now());
    }

    fn announcement_message(&self, text: impl Into<String>, severity: Severity) {
        self.state()
            .announcements
            .message
            .show(text, severity, Instant::now());
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn filters(&self) -> Filters {
        self.state().filters.clone()
    }

    /// Restore any cached session, then load the banner and the catalog.
    pub async fn start(&self) {
        info!("Starting client against {}", self.api.base_url());
        self.restore_session().await;
        tokio::join!(self.fetch_active_announcements(), self.fetch_activities());
    }

    // -- Session --

    async fn restore_session(&self) {
        let Some(cached) = self.session.load() else {
            return;
        };

        debug!("Restoring cached session for {}", cached.username);
        self.state().user = Some(cached.clone());

        match revalidate(&self.api, &cached.username).await {
            Revalidation::Confirmed(user) => {
                if user != cached {
                    self.session.save(&user);
                }
                self.state().user = Some(user);
            }
            Revalidation::Rejected => {
                info!("Cached session for {} is no longer valid", cached.username);
                self.logout();
            }
            Revalidation::Unreachable => {}
        }
    }

    pub fn open_login(&self) {
        self.state().login.open();
    }

    pub fn close_login(&self) {
        self.state().login.modal.hide(Instant::now());
    }

    /// Returns whether the login succeeded. Failures are shown inside the
    /// login dialog.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            self.state().login.message.show(
                "Please enter both username and password",
                Severity::Error,
                Instant::now(),
            );
            return false;
        }

        match self.api.login(username, password).await {
            Ok(user) => {
                info!("Logged in as {}", user.username);
                self.session.save(&user);
                let now = Instant::now();
                let mut state = self.state();
                state.login.modal.hide(now);
                state.toast.show(
                    format!("Welcome, {}!", user.display_name),
                    Severity::Success,
                    now,
                );
                state.user = Some(user);
                true
            }
            Err(e) => {
                let text = if e.is_transport() {
                    error!("Login request failed: {}", e);
                    "Login failed. Please try again."
                } else {
                    debug!("Login rejected: {}", e);
                    e.detail_or("Invalid username or password")
                };
                self.state()
                    .login
                    .message
                    .show(text, Severity::Error, Instant::now());
                false
            }
        }
    }

    /// Local only; the server holds no session to end.
    pub fn logout(&self) {
        self.session.clear();
        let now = Instant::now();
        let mut state = self.state();
        if let Some(user) = state.user.take() {
            info!("Logged out {}", user.username);
        }
        state.registration.modal.hide(now);
        state.announcements.modal.hide(now);
        state.all_announcements.clear();
        state.toast.show("You have been logged out.", Severity::Info, now);
    }

    // -- Catalog --

    /// Fetch with the server-side part of the current filters. Only the
    /// newest request may update the catalog.
    pub async fn fetch_activities(&self) {
        let ticket = self.catalog_requests.issue();
        let query = self.state().filters.server_query();
        let result = self.api.activities(&query).await;

        if !self.catalog_requests.is_current(ticket) {
            debug!("Dropping stale catalog response");
            return;
        }

        let catalog = match result {
            Ok(catalog) => {
                debug!("Loaded {} activities", catalog.len());
                CatalogState::Loaded(catalog)
            }
            Err(e) => {
                error!("Failed to fetch activities: {}", e);
                CatalogState::Failed
            }
        };
        self.state().catalog = catalog;
    }

    /// Client-side only, no request.
    pub fn set_category(&self, category: Option<Category>) {
        self.state().filters.category = category;
    }

    pub fn set_search(&self, search: &str) {
        self.state().filters.search = search.to_string();
    }

    /// Unknown day names clear the day filter.
    pub async fn set_day(&self, day: Option<&str>) {
        let day = day.and_then(normalize_day).map(str::to_string);
        self.state().filters.day = day;
        self.fetch_activities().await;
    }

    pub async fn set_time_range(&self, time: Option<TimeRange>) {
        self.state().filters.time = time;
        self.fetch_activities().await;
    }

    // -- Registration --

    pub fn open_registration(&self, activity: &str) {
        let mut state = self.state();
        if state.user.is_none() {
            state.toast.show(LOGIN_REQUIRED, Severity::Error, Instant::now());
            return;
        }
        state.registration.open(activity);
    }

    pub fn close_registration(&self) {
        self.state().registration.modal.hide(Instant::now());
    }

    pub async fn submit_registration(&self, email: &str) {
        let (activity, teacher) = {
            let state = self.state();
            (
                state.registration.activity().map(str::to_string),
                state.user.as_ref().map(|u| u.username.clone()),
            )
        };
        let Some(teacher) = teacher else {
            self.toast(LOGIN_REQUIRED, Severity::Error);
            return;
        };
        let Some(activity) = activity else {
            warn!("Registration submitted with no activity selected");
            return;
        };
        let email = email.trim();
        if email.is_empty() {
            self.toast("Please enter the student's email", Severity::Error);
            return;
        }

        match self.api.signup(&activity, email, &teacher).await {
            Ok(response) => {
                {
                    let now = Instant::now();
                    let mut state = self.state();
                    state.registration.modal.hide(now);
                    state.toast.show(response.message, Severity::Success, now);
                }
                self.fetch_activities().await;
            }
            Err(e) => self.report(&e, "Failed to sign up. Please try again."),
        }
    }

    pub fn request_unregister(&self, activity: &str, email: &str) {
        let mut state = self.state();
        if state.user.is_none() {
            state
                .toast
                .show(LOGIN_REQUIRED_UNREGISTER, Severity::Error, Instant::now());
            return;
        }
        state.confirm.get_or_insert_with(ConfirmDialog::default).ask(
            format!("Are you sure you want to unregister {email} from {activity}?"),
            PendingAction::Unregister {
                activity: activity.to_string(),
                email: email.to_string(),
            },
        );
    }

    async fn unregister(&self, activity: &str, email: &str) {
        let Some(teacher) = self.current_user().map(|u| u.username) else {
            self.toast(LOGIN_REQUIRED_UNREGISTER, Severity::Error);
            return;
        };

        match self.api.unregister(activity, email, &teacher).await {
            Ok(response) => {
                self.toast(response.message, Severity::Success);
                self.fetch_activities().await;
            }
            Err(e) => self.report(&e, "Failed to unregister. Please try again."),
        }
    }

    /// Global toast for a failed registration call.
    fn report(&self, e: &ClientError, network_text: &str) {
        let text = if e.is_transport() {
            error!("Registration request failed: {}", e);
            network_text
        } else {
            debug!("Registration rejected: {}", e);
            e.detail_or(GENERIC_ERROR)
        };
        self.toast(text, Severity::Error);
    }

    // -- Confirmation --

    /// Run whatever the confirmation dialog is waiting on.
    pub async fn confirm(&self) {
        let action = self
            .state()
            .confirm
            .as_mut()
            .and_then(|dialog| dialog.accept(Instant::now()));

        match action {
            Some(PendingAction::Unregister { activity, email }) => {
                self.unregister(&activity, &email).await
            }
            Some(PendingAction::DeleteAnnouncement { id }) => self.delete_announcement(&id).await,
            None => debug!("Nothing to confirm"),
        }
    }

    pub fn cancel_confirm(&self) {
        if let Some(dialog) = self.state().confirm.as_mut() {
            dialog.cancel(Instant::now());
        }
    }

    // -- Announcements --

    /// Errors just hide the banner.
    pub async fn fetch_active_announcements(&self) {
        let list = match self.api.active_announcements().await {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to fetch announcements: {}", e);
                Vec::new()
            }
        };
        self.state().active_announcements = list;
    }

    pub async fn open_announcement_manager(&self) {
        {
            let mut state = self.state();
            if state.user.is_none() {
                state
                    .toast
                    .show(LOGIN_REQUIRED_ANNOUNCEMENTS, Severity::Error, Instant::now());
                return;
            }
            state.announcements.open();
        }
        self.fetch_all_announcements().await;
    }

    pub fn close_announcement_manager(&self) {
        self.state().announcements.modal.hide(Instant::now());
    }

    pub async fn fetch_all_announcements(&self) {
        let Some(username) = self.current_user().map(|u| u.username) else {
            return;
        };

        match self.api.all_announcements(&username).await {
            Ok(list) => self.state().all_announcements = list,
            Err(e) => {
                warn!("Failed to fetch announcement list: {}", e);
                let text = if e.is_transport() {
                    "Failed to load announcements"
                } else {
                    e.detail_or("Failed to load announcements")
                };
                self.announcement_message(text, Severity::Error);
            }
        }
    }

    pub fn new_announcement(&self) {
        self.state().announcements.draft = Some(AnnouncementDraft::default());
    }

    /// Loads the entry from a fresh copy of the list rather than the one
    /// on screen.
    pub async fn edit_announcement(&self, id: &str) {
        let Some(username) = self.current_user().map(|u| u.username) else {
            self.toast(LOGIN_REQUIRED_ANNOUNCEMENTS, Severity::Error);
            return;
        };

        match self.api.all_announcements(&username).await {
            Ok(list) => {
                let mut state = self.state();
                match find_announcement(&list, id) {
                    Some(found) => {
                        state.announcements.draft =
                            Some(AnnouncementDraft::from_announcement(found));
                    }
                    None => {
                        warn!("Announcement {} not in the list", id);
                        state.announcements.message.show(
                            ANNOUNCEMENT_DETAILS_FAILED,
                            Severity::Error,
                            Instant::now(),
                        );
                    }
                }
                state.all_announcements = list;
            }
            Err(e) => {
                warn!("Failed to load announcement {}: {}", id, e);
                // Only a status error carries server text; an unreadable
                // list gets the generic message.
                let text = if matches!(e, ClientError::Status { .. }) {
                    e.detail_or(ANNOUNCEMENT_DETAILS_FAILED)
                } else {
                    ANNOUNCEMENT_DETAILS_FAILED
                };
                self.announcement_message(text, Severity::Error);
            }
        }
    }

    pub fn update_draft(&self, edit: impl FnOnce(&mut AnnouncementDraft)) {
        if let Some(draft) = self.state().announcements.draft.as_mut() {
            edit(draft);
        }
    }

    pub fn cancel_draft(&self) {
        self.state().announcements.draft = None;
    }

    /// Create or update depending on the draft. Returns whether it saved.
    pub async fn save_announcement(&self) -> bool {
        let (draft, username) = {
            let state = self.state();
            (
                state.announcements.draft.clone(),
                state.user.as_ref().map(|u| u.username.clone()),
            )
        };
        let Some(username) = username else {
            self.toast(LOGIN_REQUIRED_ANNOUNCEMENTS, Severity::Error);
            return false;
        };
        let Some(draft) = draft else {
            debug!("No announcement draft to save");
            return false;
        };
        if let Err(text) = draft.validate() {
            self.announcement_message(text, Severity::Error);
            return false;
        }

        let params = draft.params(&username);
        let (result, done) = match &draft.editing_id {
            Some(id) => (
                self.api.update_announcement(id, &params).await,
                "Announcement updated successfully",
            ),
            None => (
                self.api.create_announcement(&params).await,
                "Announcement created successfully",
            ),
        };

        match result {
            Ok(saved) => {
                info!("Saved announcement {}", saved.id);
                {
                    let now = Instant::now();
                    let mut state = self.state();
                    state.announcements.draft = None;
                    state.announcements.message.show(done, Severity::Success, now);
                }
                self.refresh_announcements().await;
                true
            }
            Err(e) => {
                let text = if e.is_transport() {
                    error!("Saving announcement failed: {}", e);
                    "Failed to save announcement. Please try again."
                } else {
                    debug!("Announcement rejected: {}", e);
                    e.detail_or("Failed to save announcement")
                };
                self.announcement_message(text, Severity::Error);
                false
            }
        }
    }

    pub fn request_delete_announcement(&self, id: &str) {
        let mut state = self.state();
        if state.user.is_none() {
            state
                .toast
                .show(LOGIN_REQUIRED_ANNOUNCEMENTS, Severity::Error, Instant::now());
            return;
        }
        state.confirm.get_or_insert_with(ConfirmDialog::default).ask(
            "Are you sure you want to delete this announcement?",
            PendingAction::DeleteAnnouncement { id: id.to_string() },
        );
    }

    async fn delete_announcement(&self, id: &str) {
        let Some(username) = self.current_user().map(|u| u.username) else {
            self.toast(LOGIN_REQUIRED_ANNOUNCEMENTS, Severity::Error);
            return;
        };

        match self.api.delete_announcement(id, &username).await {
            Ok(response) => {
                info!("Deleted announcement {}", id);
                self.announcement_message(response.message, Severity::Success);
                self.refresh_announcements().await;
            }
            Err(e) => {
                let text = if e.is_transport() {
                    error!("Deleting announcement failed: {}", e);
                    "Failed to delete announcement. Please try again."
                } else {
                    e.detail_or("Failed to delete announcement")
                };
                self.announcement_message(text, Severity::Error);
            }
        }
    }

    async fn refresh_announcements(&self) {
        tokio::join!(self.fetch_all_announcements(), self.fetch_active_announcements());
    }

    // -- View --

    /// Expire messages and finish modal fades.
    pub fn tick(&self, now: Instant) {
        let mut state = self.state();
        state.toast.tick(now);
        state.login.tick(now);
        state.registration.tick(now);
        state.announcements.tick(now);
        if let Some(dialog) = state.confirm.as_mut() {
            dialog.modal.tick(now);
        }
    }

    /// Snapshot of everything on screen. `today` is an ISO date used for
    /// the active badges.
    pub fn screen(&self, now: Instant, today: &str) -> Screen {
        let state = self.state();
        let logged_in = state.user.is_some();

        Screen {
            user: state.user.clone(),
            banner: banner(&state.active_announcements),
            filters: state.filters.clone(),
            catalog: CatalogView::build(&state.catalog, &state.filters, logged_in),
            toast: state.toast.visible(now).cloned(),
            login: state
                .login
                .modal
                .is_visible(now)
                .then(|| state.login.message.visible(now).cloned()),
            registration: state
                .registration
                .modal
                .is_visible(now)
                .then(|| state.registration.label())
                .flatten(),
            confirm: state
                .confirm
                .as_ref()
                .filter(|dialog| dialog.modal.is_visible(now))
                .map(|dialog| dialog.message().to_string()),
            announcements: state.announcements.modal.is_visible(now).then(|| AnnouncementPanel {
                rows: state
                    .all_announcements
                    .iter()
                    .map(|a| AnnouncementRow::build(a, today))
                    .collect(),
                editor: state.announcements.draft.clone(),
                message: state.announcements.message.visible(now).cloned(),
            }),
        }
    }

    /// Tick, then snapshot at `now` with today's local date.
    pub fn screen_at(&self, now: Instant) -> Screen {
        self.tick(now);
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        self.screen(now, &today)
    }

    pub fn screen_now(&self) -> Screen {
        self.screen_at(Instant::now())
    }
}
