//! Modal dialogs: one show/hide state machine with a fade-out, plus the
//! forms built on it.

use std::time::{Duration, Instant};

use crate::announcements::AnnouncementDraft;
use crate::notify::MessageSlot;

pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Hidden,
    Open,
    Closing { until: Instant },
}

#[derive(Debug, Clone)]
pub struct Modal {
    phase: Phase,
}

impl Default for Modal {
    fn default() -> Self {
        Self { phase: Phase::Hidden }
    }
}

impl Modal {
    pub fn show(&mut self) {
        self.phase = Phase::Open;
    }

    /// Start fading out. Hiding a modal that is not open does nothing.
    pub fn hide(&mut self, now: Instant) {
        if self.phase == Phase::Open {
            self.phase = Phase::Closing {
                until: now + FADE_DURATION,
            };
        }
    }

    /// Returns true exactly once, when a fade-out completes.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Closing { until } if now >= until => {
                self.phase = Phase::Hidden;
                true
            }
            _ => false,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Hidden => false,
            Phase::Open => true,
            Phase::Closing { until } => now < until,
        }
    }
}

/// Login dialog with its own inline message area.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub modal: Modal,
    pub message: MessageSlot,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            modal: Modal::default(),
            message: MessageSlot::persistent(),
        }
    }
}

impl LoginForm {
    pub fn open(&mut self) {
        self.message.clear();
        self.modal.show();
    }

    pub fn tick(&mut self, now: Instant) {
        if self.modal.tick(now) {
            self.message.clear();
        }
    }
}

/// Signup dialog, pre-filled with the activity it was opened for.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub modal: Modal,
    activity: Option<String>,
}

impl RegistrationForm {
    pub fn open(&mut self, activity: &str) {
        self.activity = Some(activity.to_string());
        self.modal.show();
    }

    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    pub fn label(&self) -> Option<String> {
        self.activity
            .as_ref()
            .map(|name| format!("Register a student for {name}"))
    }

    pub fn tick(&mut self, now: Instant) {
        if self.modal.tick(now) {
            self.activity = None;
        }
    }
}

/// Announcement management dialog: the list plus an optional editor.
#[derive(Debug, Clone)]
pub struct AnnouncementForm {
    pub modal: Modal,
    pub message: MessageSlot,
    pub draft: Option<AnnouncementDraft>,
}

impl Default for AnnouncementForm {
    fn default() -> Self {
        Self {
            modal: Modal::default(),
            message: MessageSlot::announcement(),
            draft: None,
        }
    }
}

impl AnnouncementForm {
    pub fn open(&mut self) {
        self.message.clear();
        self.draft = None;
        self.modal.show();
    }

    pub fn tick(&mut self, now: Instant) {
        self.message.tick(now);
        if self.modal.tick(now) {
            self.message.clear();
            self.draft = None;
        }
    }
}

/// What the confirmation dialog will do when accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Unregister { activity: String, email: String },
    DeleteAnnouncement { id: String },
}

/// Yes/no dialog reused for every confirmation. Asking again replaces the
/// pending action; there is never more than one.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    pub modal: Modal,
    message: String,
    pending: Option<PendingAction>,
}

impl ConfirmDialog {
    pub fn ask(&mut self, message: impl Into<String>, action: PendingAction) {
        self.message = message.into();
        self.pending = Some(action);
        self.modal.show();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Accept: hands back the pending action and closes the dialog.
    pub fn accept(&mut self, now: Instant) -> Option<PendingAction> {
        self.modal.hide(now);
        self.pending.take()
    }

    pub fn cancel(&mut self, now: Instant) {
        self.modal.hide(now);
        self.pending = None;
    }
}
