use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarComponent {
    Date,
    Weekday,
    TimeOnly,
}

impl CalendarComponent {
    pub fn of(pattern: &str) -> Self {
        let mut has_weekday = false;
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                continue;
            }
            let mut spec = chars.next();
            if matches!(spec, Some('-' | '_' | '0')) {
                spec = chars.next();
            }
            match spec {
                Some('b' | 'B' | 'h' | 'm' | 'd' | 'e' | 'j' | 'D' | 'F' | 'x' | 'c') => {
                    return CalendarComponent::Date;
                }
                Some('a' | 'A' | 'u' | 'w') => has_weekday = true,
                _ => {}
            }
        }
        if has_weekday {
            CalendarComponent::Weekday
        } else {
            CalendarComponent::TimeOnly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    pattern: String,
    time_only: String,
}

impl Layout {
    pub fn new(pattern: impl Into<String>, time_only: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            time_only: time_only.into(),
        }
    }

    pub fn checked(pattern: &str, time_only: &str) -> Option<Self> {
        if is_valid_pattern(pattern) && is_valid_pattern(time_only) {
            Some(Self::new(pattern, time_only))
        } else {
            None
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn time_only(&self) -> &str {
        &self.time_only
    }

    pub fn calendar(&self) -> CalendarComponent {
        CalendarComponent::of(&self.pattern)
    }

    pub fn encodes_date(&self) -> bool {
        self.calendar() == CalendarComponent::Date
    }

    pub fn format(&self, instant: &NaiveDateTime) -> String {
        instant.format(&self.pattern).to_string()
    }

    pub fn format_time(&self, instant: &NaiveDateTime) -> String {
        instant.format(&self.time_only).to_string()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

// Offset and timezone specifiers parse as items but cannot be printed for a
// naive instant, so the pattern is also trial-formatted.
fn is_valid_pattern(pattern: &str) -> bool {
    if pattern.trim().is_empty()
        || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
    {
        return false;
    }
    let sample = NaiveDateTime::default();
    let mut out = String::new();
    write!(out, "{}", sample.format(pattern)).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutProfile {
    #[default]
    Dated,
    Weekday,
}

impl LayoutProfile {
    pub fn layouts(self) -> Vec<Layout> {
        match self {
            LayoutProfile::Dated => vec![
                Layout::new("%b %d %H:%M", "%H:%M"),
                Layout::new("%b %d %I%P", "%I%P"),
            ],
            LayoutProfile::Weekday => vec![
                Layout::new("%a %b %d %H:%M", "%H:%M"),
                Layout::new("%a %H:%M", "%H:%M"),
                Layout::new("%a %b %d %I%P", "%I%P"),
                Layout::new("%a %I%P", "%I%P"),
            ],
        }
    }
}

impl FromStr for LayoutProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dated" | "date" => Ok(LayoutProfile::Dated),
            "weekday" => Ok(LayoutProfile::Weekday),
            other => Err(format!("unknown layout profile `{other}`")),
        }
    }
}
