//! Announcement editing: the draft behind the management form and the
//! checks run before anything is sent.

use clubhouse_types::api::AnnouncementParams;
use clubhouse_types::models::Announcement;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const EXPIRATION_REQUIRED: &str = "Expiration date is required";

/// Form contents. `editing_id` is set when the draft came from an existing
/// announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementDraft {
    pub editing_id: Option<String>,
    pub message: String,
    pub start_date: String,
    pub expiration_date: String,
}

impl AnnouncementDraft {
    pub fn from_announcement(announcement: &Announcement) -> Self {
        Self {
            editing_id: Some(announcement.id.clone()),
            message: announcement.message.clone(),
            start_date: announcement.start_date.clone().unwrap_or_default(),
            expiration_date: announcement.expiration_date.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Emptiness checks only; the server validates the rest.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.message.trim().is_empty() {
            return Err(MESSAGE_REQUIRED);
        }
        if self.expiration_date.trim().is_empty() {
            return Err(EXPIRATION_REQUIRED);
        }
        Ok(())
    }

    /// An empty start date is sent as-is so that an edit clears it.
    pub fn params(&self, username: &str) -> AnnouncementParams {
        let start_date = self.start_date.trim();
        AnnouncementParams {
            message: self.message.trim().to_string(),
            expiration_date: self.expiration_date.trim().to_string(),
            username: username.to_string(),
            start_date: if start_date.is_empty() && !self.is_edit() {
                None
            } else {
                Some(start_date.to_string())
            },
        }
    }
}

/// Locate the announcement to edit in a freshly fetched list.
pub fn find_announcement<'a>(list: &'a [Announcement], id: &str) -> Option<&'a Announcement> {
    list.iter().find(|a| a.id == id)
}
