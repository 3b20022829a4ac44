use std::fmt;

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::interval::Interval;

/// Identity of a day in the schedule. The year is deliberately not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateKey {
    pub day: u32,
    pub month: u32,
}

impl DateKey {
    pub fn of(instant: &NaiveDateTime) -> Self {
        Self {
            day: instant.day(),
            month: instant.month(),
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.day, self.month)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Day {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub events: Vec<Event>,
}

impl Day {
    pub fn new(interval: &Interval) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start: interval.start(),
            end: interval.end(),
            events: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn date_key(&self) -> DateKey {
        DateKey::of(&self.start)
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.start <= event.start && event.end <= self.end
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn event_mut(&mut self, position: usize) -> Option<&mut Event> {
        position
            .checked_sub(1)
            .and_then(|index| self.events.get_mut(index))
    }
}
