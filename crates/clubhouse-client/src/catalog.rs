//! Activity catalog filtering: category inference, schedule formatting and
//! the client-side filter pipeline. Pure functions, no I/O.

use std::fmt;

use clubhouse_types::api::ActivityFilter;
use clubhouse_types::models::{Activity, Catalog, Schedule};

pub const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const WEEKEND_DAYS: [&str; 2] = ["Saturday", "Sunday"];

// -- Categories --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sports,
    Arts,
    Academic,
    Community,
    Technology,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Sports,
        Category::Arts,
        Category::Academic,
        Category::Community,
        Category::Technology,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Sports => "sports",
            Category::Arts => "arts",
            Category::Academic => "academic",
            Category::Community => "community",
            Category::Technology => "technology",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Sports => "Sports",
            Category::Arts => "Arts",
            Category::Academic => "Academic",
            Category::Community => "Community",
            Category::Technology => "Technology",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the keyword table. A rule matches when any name keyword is a
/// substring of the lowercased name, or any description keyword is a
/// substring of the lowercased description.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub name_keywords: &'static [&'static str],
    pub description_keywords: &'static [&'static str],
}

/// Checked top to bottom; the first match wins.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Sports,
        name_keywords: &[
            "soccer",
            "basketball",
            "sport",
            "fitness",
            "tennis",
            "swim",
            "volleyball",
        ],
        description_keywords: &["team", "game", "athletic"],
    },
    CategoryRule {
        category: Category::Arts,
        name_keywords: &["art", "music", "theater", "drama", "choir", "band"],
        description_keywords: &["creative", "paint"],
    },
    CategoryRule {
        category: Category::Academic,
        name_keywords: &["science", "math", "academic", "study", "olympiad", "debate"],
        description_keywords: &["learning", "education", "competition"],
    },
    CategoryRule {
        category: Category::Community,
        name_keywords: &["volunteer", "community"],
        description_keywords: &["service", "volunteer"],
    },
    CategoryRule {
        category: Category::Technology,
        name_keywords: &["computer", "coding", "tech", "robotics", "programming"],
        description_keywords: &["technology", "programming"],
    },
];

/// Used when no rule matches.
pub const DEFAULT_CATEGORY: Category = Category::Academic;

pub fn infer_category(name: &str, description: &str) -> Category {
    infer_category_with(CATEGORY_RULES, name, description)
}

pub fn infer_category_with(rules: &[CategoryRule], name: &str, description: &str) -> Category {
    let name = name.to_lowercase();
    let description = description.to_lowercase();

    rules
        .iter()
        .find(|rule| {
            rule.name_keywords.iter().any(|k| name.contains(k))
                || rule.description_keywords.iter().any(|k| description.contains(k))
        })
        .map(|rule| rule.category)
        .unwrap_or(DEFAULT_CATEGORY)
}

// -- Time filters --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// Before school.
    Morning,
    /// After school.
    Afternoon,
    /// Saturday or Sunday; resolved on the client only.
    Weekend,
}

impl TimeRange {
    pub fn key(self) -> &'static str {
        match self {
            TimeRange::Morning => "morning",
            TimeRange::Afternoon => "afternoon",
            TimeRange::Weekend => "weekend",
        }
    }

    pub fn from_key(key: &str) -> Option<TimeRange> {
        [TimeRange::Morning, TimeRange::Afternoon, TimeRange::Weekend]
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(key))
    }

    /// Clock window sent to the server, `None` for weekend.
    pub fn window(self) -> Option<(&'static str, &'static str)> {
        match self {
            TimeRange::Morning => Some(("06:00", "08:00")),
            TimeRange::Afternoon => Some(("15:00", "18:00")),
            TimeRange::Weekend => None,
        }
    }
}

/// Canonical day name for case-insensitive input.
pub fn normalize_day(input: &str) -> Option<&'static str> {
    WEEK_DAYS
        .into_iter()
        .find(|day| day.eq_ignore_ascii_case(input.trim()))
}

// -- Schedules --

/// `"13:30"` → `"1:30 PM"`. Input that is not `HH:MM` comes back unchanged.
pub fn format_time(time: &str) -> String {
    let parsed = time
        .split_once(':')
        .and_then(|(h, m)| Some((h.trim().parse::<u32>().ok()?, m.trim().parse::<u32>().ok()?)));

    let Some((hours, minutes)) = parsed else {
        return time.to_string();
    };

    let period = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hours}:{minutes:02} {period}")
}

pub fn format_schedule(activity: &Activity) -> String {
    match activity.schedule() {
        Schedule::Structured(details) => format!(
            "{}, {} - {}",
            details.days.join(", "),
            format_time(&details.start_time),
            format_time(&details.end_time)
        ),
        Schedule::Text(text) => text.to_string(),
    }
}

// -- Filter pipeline --

/// Everything the user has selected. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub category: Option<Category>,
    pub day: Option<String>,
    pub time: Option<TimeRange>,
    pub search: String,
}

impl Filters {
    /// The part of the filters the server applies.
    pub fn server_query(&self) -> ActivityFilter {
        let window = self.time.and_then(TimeRange::window);
        ActivityFilter {
            day: self.day.clone(),
            start_time: window.map(|(start, _)| start.to_string()),
            end_time: window.map(|(_, end)| end.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listed<'a> {
    pub name: &'a str,
    pub activity: &'a Activity,
    pub category: Category,
}

/// Apply category, weekend and search filters, in that order, keeping
/// catalog order.
pub fn filter_catalog<'a>(catalog: &'a Catalog, filters: &Filters) -> Vec<Listed<'a>> {
    let search = filters.search.trim().to_lowercase();

    catalog
        .iter()
        .map(|(name, activity)| Listed {
            name,
            activity,
            category: infer_category(name, &activity.description),
        })
        .filter(|listed| filters.category.is_none_or(|c| c == listed.category))
        .filter(|listed| {
            filters.time != Some(TimeRange::Weekend) || meets_on_weekend(listed.activity)
        })
        .filter(|listed| {
            search.is_empty() || search_text(listed.name, listed.activity).contains(&search)
        })
        .collect()
}

/// Activities without a structured schedule cannot be checked and are kept.
fn meets_on_weekend(activity: &Activity) -> bool {
    match activity.schedule() {
        Schedule::Structured(details) => details
            .days
            .iter()
            .any(|day| WEEKEND_DAYS.contains(&day.as_str())),
        Schedule::Text(_) => true,
    }
}

fn search_text(name: &str, activity: &Activity) -> String {
    format!(
        "{} {} {}",
        name,
        activity.description,
        format_schedule(activity)
    )
    .to_lowercase()
}
