//! Start/end entry for days and events as an explicit state machine.
//!
//! `AwaitingStart -> AwaitingEnd -> Accepted`, with `Cancelled` reachable from
//! either waiting state. A rejected submission leaves the state unchanged and
//! hands the failure back; the caller decides whether to ask again.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::ScheduleError;
use crate::models::day::DateKey;
use crate::models::interval::Interval;
use crate::models::layout::Layout;
use crate::service::interval;
use crate::service::schedule_store::ScheduleStore;
use crate::service::time_parser::TimeParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Day,
    Event,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Day => "day",
            ItemKind::Event => "event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    AwaitingStart,
    AwaitingEnd { start: NaiveDateTime, layout: Layout },
    Accepted(Interval),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    Retry(ScheduleError),
    AwaitEnd,
    Accepted(Interval),
    Finished,
}

#[derive(Debug, Clone)]
pub struct IntervalFlow {
    kind: ItemKind,
    state: FlowState,
    failures: u32,
}

impl IntervalFlow {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            state: FlowState::AwaitingStart,
            failures: 0,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, FlowState::Accepted(_) | FlowState::Cancelled)
    }

    pub fn prompt(&self) -> Option<String> {
        let label = self.kind.label();
        match self.state {
            FlowState::AwaitingStart => Some(format!("Please enter the start time of the {label}:")),
            FlowState::AwaitingEnd { .. } => Some(format!("Please enter the end time of the {label}:")),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        if !self.is_finished() {
            debug!(kind = self.kind.label(), "creation cancelled");
            self.state = FlowState::Cancelled;
        }
    }

    pub fn submit(&mut self, raw: &str, parser: &TimeParser, store: &ScheduleStore) -> FlowStep {
        match &self.state {
            FlowState::AwaitingStart => {
                let parsed = match store.pinned_layout() {
                    Some(layout) => parser
                        .parse_with(raw, layout)
                        .map(|instant| (instant, layout.clone())),
                    None => parser.parse(raw),
                };
                let (start, layout) = match parsed {
                    Ok(value) => value,
                    Err(err) => return self.reject(err),
                };
                if self.kind == ItemKind::Day && store.is_duplicate(&start) {
                    let key = DateKey::of(&start);
                    return self.reject(ScheduleError::DuplicateDate {
                        day: key.day,
                        month: key.month,
                    });
                }
                debug!(kind = self.kind.label(), %start, layout = %layout, "start accepted");
                self.state = FlowState::AwaitingEnd { start, layout };
                FlowStep::AwaitEnd
            }
            FlowState::AwaitingEnd { start, layout } => {
                let (start, layout) = (*start, layout.clone());
                let checked = parser
                    .parse_with(raw, &layout)
                    .and_then(|end| interval::checked(start, end, &layout));
                match checked {
                    Ok(accepted) => {
                        debug!(kind = self.kind.label(), end = %accepted.end(), "interval accepted");
                        self.state = FlowState::Accepted(accepted.clone());
                        FlowStep::Accepted(accepted)
                    }
                    Err(err) => self.reject(err),
                }
            }
            FlowState::Accepted(_) | FlowState::Cancelled => FlowStep::Finished,
        }
    }

    fn reject(&mut self, err: ScheduleError) -> FlowStep {
        self.failures += 1;
        debug!(kind = self.kind.label(), failures = self.failures, "rejected: {err}");
        FlowStep::Retry(err)
    }
}
