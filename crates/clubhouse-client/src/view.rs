//! View model: plain data describing what is on screen. Renderers only
//! read these types.

use clubhouse_types::models::{Activity, Announcement, Catalog, User};

use crate::announcements::AnnouncementDraft;
use crate::catalog::{Category, Filters, Listed, filter_catalog, format_schedule};
use crate::notify::Notice;

pub const NO_ACTIVITIES: &str = "No activities found";
pub const ACTIVITIES_FAILED: &str = "Failed to load activities. Please try again later.";
pub const NO_ANNOUNCEMENTS: &str = "No announcements found";

/// Share of seats taken at which an activity counts as nearly full.
pub const NEAR_FULL_RATIO: f64 = 0.75;

// -- Activity cards --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityStatus {
    Available,
    NearFull,
    Full,
}

impl CapacityStatus {
    pub fn of(activity: &Activity) -> Self {
        if activity.is_full() {
            return CapacityStatus::Full;
        }
        let max = f64::from(activity.max_participants);
        if max > 0.0 && activity.enrolled() as f64 / max >= NEAR_FULL_RATIO {
            CapacityStatus::NearFull
        } else {
            CapacityStatus::Available
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            CapacityStatus::Available => "available",
            CapacityStatus::NearFull => "near-full",
            CapacityStatus::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterButton {
    pub label: &'static str,
    pub disabled: bool,
}

impl RegisterButton {
    fn for_activity(activity: &Activity) -> Self {
        if activity.is_full() {
            RegisterButton {
                label: "Activity Full",
                disabled: true,
            }
        } else {
            RegisterButton {
                label: "Register Student",
                disabled: false,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub email: String,
    pub can_unregister: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCard {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub schedule: String,
    pub enrolled: usize,
    pub max_participants: u32,
    pub spots_left: i64,
    pub capacity: CapacityStatus,
    pub participants: Vec<ParticipantView>,
    /// Only present for a logged-in teacher.
    pub register: Option<RegisterButton>,
}

impl ActivityCard {
    pub fn build(listed: &Listed<'_>, logged_in: bool) -> Self {
        let activity = listed.activity;
        Self {
            name: listed.name.to_string(),
            category: listed.category,
            description: activity.description.clone(),
            schedule: format_schedule(activity),
            enrolled: activity.enrolled(),
            max_participants: activity.max_participants,
            spots_left: activity.spots_left(),
            capacity: CapacityStatus::of(activity),
            participants: activity
                .participants
                .iter()
                .map(|email| ParticipantView {
                    email: email.clone(),
                    can_unregister: logged_in,
                })
                .collect(),
            register: logged_in.then(|| RegisterButton::for_activity(activity)),
        }
    }
}

/// Where the catalog fetch stands.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Loaded(Catalog),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    Loading,
    Cards(Vec<ActivityCard>),
    /// Nothing matched the filters.
    Empty,
    Failed,
}

impl CatalogView {
    pub fn build(state: &CatalogState, filters: &Filters, logged_in: bool) -> Self {
        match state {
            CatalogState::Loading => CatalogView::Loading,
            CatalogState::Failed => CatalogView::Failed,
            CatalogState::Loaded(catalog) => {
                let cards: Vec<_> = filter_catalog(catalog, filters)
                    .iter()
                    .map(|listed| ActivityCard::build(listed, logged_in))
                    .collect();
                if cards.is_empty() {
                    CatalogView::Empty
                } else {
                    CatalogView::Cards(cards)
                }
            }
        }
    }
}

// -- Announcements --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementRow {
    pub id: String,
    pub message: String,
    pub start_date: Option<String>,
    pub expiration_date: String,
    pub created_by: Option<String>,
    pub active: bool,
}

impl AnnouncementRow {
    pub fn build(announcement: &Announcement, today: &str) -> Self {
        Self {
            id: announcement.id.clone(),
            message: announcement.message.clone(),
            start_date: announcement.start_date.clone().filter(|d| !d.is_empty()),
            expiration_date: announcement.expiration_date.clone(),
            created_by: announcement.created_by.clone(),
            active: announcement.is_active_on(today),
        }
    }

    pub fn badge(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

/// The banner shows the first active announcement only.
pub fn banner(active: &[Announcement]) -> Option<String> {
    active.first().map(|a| a.message.clone())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementPanel {
    /// Server order.
    pub rows: Vec<AnnouncementRow>,
    pub editor: Option<AnnouncementDraft>,
    pub message: Option<Notice>,
}

// -- Whole screen --

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub user: Option<User>,
    pub banner: Option<String>,
    pub filters: Filters,
    pub catalog: CatalogView,
    pub toast: Option<Notice>,
    /// Login dialog, with its inline message when open.
    pub login: Option<Option<Notice>>,
    /// Registration dialog label when open.
    pub registration: Option<String>,
    /// Confirmation question when open.
    pub confirm: Option<String>,
    pub announcements: Option<AnnouncementPanel>,
}
