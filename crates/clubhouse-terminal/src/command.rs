use clap::{Parser, Subcommand};

use clubhouse_client::catalog::{Category, TimeRange};

/// One line typed at the prompt.
#[derive(Debug, Parser)]
#[command(name = "clubhouse", no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Redraw the screen
    Show,
    /// Reload activities and the banner
    Refresh,
    /// Log in as a teacher
    Login { username: String, password: String },
    Logout,
    /// Filter by category (sports, arts, academic, community, technology or all)
    Category {
        #[arg(value_parser = parse_category)]
        category: Pick<Category>,
    },
    /// Filter by meeting day (monday..sunday or all)
    Day {
        #[arg(value_parser = parse_day)]
        day: Pick<String>,
    },
    /// Filter by time of day (morning, afternoon, weekend or all)
    Time {
        #[arg(value_parser = parse_time_range)]
        range: Pick<TimeRange>,
    },
    /// Search names, descriptions and schedules; no text clears it
    Search {
        #[arg(trailing_var_arg = true, num_args = 0..)]
        text: Vec<String>,
    },
    /// Sign a student up for an activity
    Register {
        email: String,
        #[arg(trailing_var_arg = true, num_args = 1.., required = true)]
        activity: Vec<String>,
    },
    /// Remove a student from an activity (asks first)
    Unregister {
        email: String,
        #[arg(trailing_var_arg = true, num_args = 1.., required = true)]
        activity: Vec<String>,
    },
    /// Answer yes to the open question
    #[command(alias = "y")]
    Yes,
    /// Answer no to the open question
    #[command(alias = "n")]
    No,
    /// Open the announcement manager
    Announcements,
    /// Edit announcements
    Announce {
        #[command(subcommand)]
        action: AnnounceCommand,
    },
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AnnounceCommand {
    /// Start a new announcement
    New,
    /// Load an announcement into the editor
    Edit { id: String },
    Message {
        #[arg(trailing_var_arg = true, num_args = 1.., required = true)]
        text: Vec<String>,
    },
    /// Start date as YYYY-MM-DD, or none
    Start {
        #[arg(value_parser = parse_start_date)]
        date: String,
    },
    /// Expiration date as YYYY-MM-DD
    Expires { date: String },
    Save,
    Cancel,
    Delete { id: String },
    Close,
}

/// A filter value, where `all` turns the filter off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick<T> {
    All,
    Only(T),
}

impl<T> Pick<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Pick::All => None,
            Pick::Only(value) => Some(value),
        }
    }
}

/// Words that take the rest of the line, such as activity names.
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}

/// `Ok(None)` for a blank line. `help` comes back as an error carrying the
/// generated help text.
pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(words).map(|line| Some(line.command))
}

fn is_all(value: &str) -> bool {
    value.eq_ignore_ascii_case("all")
}

fn parse_category(value: &str) -> Result<Pick<Category>, String> {
    if is_all(value) {
        return Ok(Pick::All);
    }
    Category::from_key(value)
        .map(Pick::Only)
        .ok_or_else(|| format!("unknown category: {value}"))
}

fn parse_day(value: &str) -> Result<Pick<String>, String> {
    Ok(if is_all(value) {
        Pick::All
    } else {
        Pick::Only(value.to_string())
    })
}

fn parse_time_range(value: &str) -> Result<Pick<TimeRange>, String> {
    if is_all(value) {
        return Ok(Pick::All);
    }
    TimeRange::from_key(value)
        .map(Pick::Only)
        .ok_or_else(|| format!("unknown time range: {value}"))
}

/// `none` clears the start date.
fn parse_start_date(value: &str) -> Result<String, String> {
    Ok(if value.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        value.to_string()
    })
}
