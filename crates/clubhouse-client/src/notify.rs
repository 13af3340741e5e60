use std::time::{Duration, Instant};

/// Global toast lifetime.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);
/// Announcement-manager success lifetime.
pub const ANNOUNCEMENT_SUCCESS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

/// When a slot hides itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoHide {
    Always(Duration),
    SuccessOnly(Duration),
    Never,
}

/// A single-slot message region: showing a new message replaces the old one.
#[derive(Debug, Clone)]
pub struct MessageSlot {
    policy: AutoHide,
    current: Option<(Notice, Option<Instant>)>,
}

impl MessageSlot {
    pub fn new(policy: AutoHide) -> Self {
        Self {
            policy,
            current: None,
        }
    }

    pub fn toast() -> Self {
        Self::new(AutoHide::Always(TOAST_DURATION))
    }

    pub fn announcement() -> Self {
        Self::new(AutoHide::SuccessOnly(ANNOUNCEMENT_SUCCESS_DURATION))
    }

    pub fn persistent() -> Self {
        Self::new(AutoHide::Never)
    }

    pub fn show(&mut self, text: impl Into<String>, severity: Severity, now: Instant) {
        let hide_at = match self.policy {
            AutoHide::Always(after) => Some(now + after),
            AutoHide::SuccessOnly(after) if severity == Severity::Success => Some(now + after),
            AutoHide::SuccessOnly(_) | AutoHide::Never => None,
        };
        self.current = Some((
            Notice {
                text: text.into(),
                severity,
            },
            hide_at,
        ));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The message showing at `now`, if any.
    pub fn visible(&self, now: Instant) -> Option<&Notice> {
        let (notice, hide_at) = self.current.as_ref()?;
        match hide_at {
            Some(at) if now >= *at => None,
            _ => Some(notice),
        }
    }

    /// Drop an expired message.
    pub fn tick(&mut self, now: Instant) {
        if self.visible(now).is_none() {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_hides_after_five_seconds() {
        let t0 = Instant::now();
        let mut slot = MessageSlot::toast();
        slot.show("Welcome, Mr. Chen!", Severity::Success, t0);
        assert!(slot.visible(t0 + Duration::from_millis(4999)).is_some());
        assert!(slot.visible(t0 + TOAST_DURATION).is_none());
    }

    #[test]
    fn announcement_slot_keeps_errors() {
        let t0 = Instant::now();
        let mut slot = MessageSlot::announcement();
        slot.show("Saved", Severity::Success, t0);
        assert!(slot.visible(t0 + Duration::from_secs(3)).is_none());

        slot.show("Message is required", Severity::Error, t0);
        assert_eq!(
            slot.visible(t0 + Duration::from_secs(60)).map(|n| n.text.as_str()),
            Some("Message is required")
        );
    }

    #[test]
    fn newer_message_replaces_older() {
        let t0 = Instant::now();
        let mut slot = MessageSlot::persistent();
        slot.show("first", Severity::Info, t0);
        slot.show("second", Severity::Error, t0);
        let notice = slot.visible(t0).unwrap();
        assert_eq!(notice.text, "second");
        assert_eq!(notice.severity.class(), "error");

        slot.clear();
        assert!(slot.visible(t0).is_none());
    }

    #[test]
    fn tick_forgets_expired_message() {
        let t0 = Instant::now();
        let mut slot = MessageSlot::toast();
        slot.show("bye", Severity::Info, t0);
        slot.tick(t0 + Duration::from_secs(6));
        // Still gone even if the clock were read earlier afterwards.
        assert!(slot.visible(t0).is_none());
    }
}
