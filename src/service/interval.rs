use chrono::{Datelike, NaiveDateTime};

use crate::error::ScheduleError;
use crate::models::day::Day;
use crate::models::event::Event;
use crate::models::interval::Interval;
use crate::models::layout::Layout;

/// Checks, in order: `end` strictly after `start`, for date-bearing layouts
/// the same day of month and month, and the same weekday.
pub fn validate(
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    layout: &Layout,
) -> Result<(), ScheduleError> {
    if end <= start {
        return Err(ScheduleError::IntervalInverted);
    }
    // A differing calendar date is reported as such before the weekday.
    if layout.encodes_date() && (start.day() != end.day() || start.month() != end.month()) {
        return Err(ScheduleError::DateMismatch);
    }
    if start.weekday() != end.weekday() {
        return Err(ScheduleError::WeekdayMismatch);
    }
    Ok(())
}

pub fn checked(
    start: NaiveDateTime,
    end: NaiveDateTime,
    layout: &Layout,
) -> Result<Interval, ScheduleError> {
    validate(&start, &end, layout)?;
    Ok(Interval::new(start, end, layout.clone()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventPolicy {
    pub containment: bool,
    pub reject_overlap: bool,
}

impl EventPolicy {
    pub fn check(&self, day: &Day, event: &Event) -> Result<(), ScheduleError> {
        if self.containment && !day.contains(event) {
            return Err(ScheduleError::OutsideDay);
        }
        if self.reject_overlap {
            if let Some(other) = day.events.iter().find(|other| other.overlaps(event)) {
                return Err(ScheduleError::Overlap {
                    other: other.name.clone(),
                });
            }
        }
        Ok(())
    }
}
