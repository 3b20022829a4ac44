use chrono::{Duration, NaiveDateTime};

use crate::models::layout::Layout;

/// A start/end pair that passed interval validation.
///
/// Only `service::interval::checked` builds one, so holding an `Interval`
/// means `end > start` and both ends share the same calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
    layout: Layout,
}

impl Interval {
    pub(crate) fn new(start: NaiveDateTime, end: NaiveDateTime, layout: Layout) -> Self {
        Self { start, end, layout }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
