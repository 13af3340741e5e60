use std::fmt::Write;

use crate::catalog::Category;
use crate::notify::Notice;
use crate::view::{
    ACTIVITIES_FAILED, ActivityCard, AnnouncementPanel, CatalogView, NO_ACTIVITIES,
    NO_ANNOUNCEMENTS, Screen,
};

/// Turns a [`Screen`] into something a front end can show.
pub trait Renderer {
    type Output;

    fn render(&self, screen: &Screen) -> Self::Output;
}

/// Plain-text rendering for terminals and logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, screen: &Screen) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_screen(&mut out, screen);
        out
    }
}

impl TextRenderer {
    fn write_screen(&self, out: &mut String, screen: &Screen) -> std::fmt::Result {
        if let Some(message) = &screen.banner {
            writeln!(out, "** {message} **")?;
        }
        match &screen.user {
            Some(user) => writeln!(out, "Logged in as {} ({})", user.display_name, user.username)?,
            None => writeln!(out, "Not logged in")?,
        }
        write_notice(out, "", screen.toast.as_ref())?;

        let filters = &screen.filters;
        writeln!(
            out,
            "Filters: category={} day={} time={} search={:?}",
            filters.category.map(Category::key).unwrap_or("all"),
            filters.day.as_deref().unwrap_or("all"),
            filters.time.map(|t| t.key()).unwrap_or("all"),
            filters.search,
        )?;
        writeln!(out)?;

        match &screen.catalog {
            CatalogView::Loading => writeln!(out, "Loading activities...")?,
            CatalogView::Failed => writeln!(out, "{ACTIVITIES_FAILED}")?,
            CatalogView::Empty => writeln!(out, "{NO_ACTIVITIES}")?,
            CatalogView::Cards(cards) => {
                for card in cards {
                    write_card(out, card)?;
                }
            }
        }

        if let Some(login) = &screen.login {
            writeln!(out, "[Teacher login]")?;
            write_notice(out, "  ", login.as_ref())?;
        }
        if let Some(label) = &screen.registration {
            writeln!(out, "[{label}]")?;
        }
        if let Some(question) = &screen.confirm {
            writeln!(out, "[{question}] (yes/no)")?;
        }
        if let Some(panel) = &screen.announcements {
            write_panel(out, panel)?;
        }
        Ok(())
    }
}

fn write_notice(out: &mut String, indent: &str, notice: Option<&Notice>) -> std::fmt::Result {
    match notice {
        Some(notice) => writeln!(out, "{indent}({}) {}", notice.severity.class(), notice.text),
        None => Ok(()),
    }
}

fn write_card(out: &mut String, card: &ActivityCard) -> std::fmt::Result {
    writeln!(out, "{} [{}]", card.name, card.category.label())?;
    writeln!(out, "  {}", card.description)?;
    writeln!(out, "  Schedule: {}", card.schedule)?;
    writeln!(
        out,
        "  {}/{} enrolled, {} spots left ({})",
        card.enrolled,
        card.max_participants,
        card.spots_left,
        card.capacity.class()
    )?;
    for participant in &card.participants {
        if participant.can_unregister {
            writeln!(out, "    - {} [x]", participant.email)?;
        } else {
            writeln!(out, "    - {}", participant.email)?;
        }
    }
    if let Some(button) = &card.register {
        let state = if button.disabled { " (disabled)" } else { "" };
        writeln!(out, "  <{}>{}", button.label, state)?;
    }
    writeln!(out)
}

fn write_panel(out: &mut String, panel: &AnnouncementPanel) -> std::fmt::Result {
    writeln!(out, "[Manage announcements]")?;
    write_notice(out, "  ", panel.message.as_ref())?;
    if panel.rows.is_empty() {
        writeln!(out, "  {NO_ANNOUNCEMENTS}")?;
    }
    for row in &panel.rows {
        writeln!(
            out,
            "  {} [{}] {} (from {} until {}, by {})",
            row.id,
            row.badge(),
            row.message,
            row.start_date.as_deref().unwrap_or("now"),
            row.expiration_date,
            row.created_by.as_deref().unwrap_or("unknown"),
        )?;
    }
    if let Some(draft) = &panel.editor {
        let title = if draft.is_edit() { "Edit announcement" } else { "New announcement" };
        writeln!(out, "  {title}:")?;
        writeln!(out, "    message: {}", draft.message)?;
        writeln!(out, "    start: {}", draft.start_date)?;
        writeln!(out, "    expires: {}", draft.expiration_date)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Filters;
    use crate::view::{CapacityStatus, ParticipantView, RegisterButton};

    fn screen(catalog: CatalogView) -> Screen {
        Screen {
            user: None,
            banner: Some("Welcome back".into()),
            filters: Filters::default(),
            catalog,
            toast: None,
            login: None,
            registration: None,
            confirm: None,
            announcements: None,
        }
    }

    #[test]
    fn renders_empty_state() {
        let text = TextRenderer.render(&screen(CatalogView::Empty));
        assert!(text.contains("** Welcome back **"));
        assert!(text.contains(NO_ACTIVITIES));
    }

    #[test]
    fn renders_card_controls() {
        let card = ActivityCard {
            name: "Chess Club".into(),
            category: Category::Academic,
            description: "Learn strategies".into(),
            schedule: "Monday, Friday, 3:15 PM - 4:45 PM".into(),
            enrolled: 1,
            max_participants: 1,
            spots_left: 0,
            capacity: CapacityStatus::Full,
            participants: vec![ParticipantView {
                email: "michael@school.edu".into(),
                can_unregister: true,
            }],
            register: Some(RegisterButton {
                label: "Activity Full",
                disabled: true,
            }),
        };
        let text = TextRenderer.render(&screen(CatalogView::Cards(vec![card])));
        assert!(text.contains("Chess Club [Academic]"));
        assert!(text.contains("michael@school.edu [x]"));
        assert!(text.contains("<Activity Full> (disabled)"));
    }
}
