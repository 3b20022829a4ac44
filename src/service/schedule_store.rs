//! The in-memory schedule: days sorted by start, each owning its events.
//!
//! # Invariants
//! - `days` is sorted ascending by start after every mutation; equal starts
//!   keep insertion order.
//! - No two days share a `(day-of-month, month)` key. The year is ignored.
//! - The layout is pinned by the first accepted day and never replaced.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::models::day::{DateKey, Day};
use crate::models::event::Event;
use crate::models::interval::Interval;
use crate::models::layout::Layout;
use crate::models::todo::Todo;
use crate::service::interval::{self, EventPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub layout: Option<Layout>,
    pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    days: Vec<Day>,
    pinned: Option<Layout>,
    policy: EventPolicy,
}

impl ScheduleStore {
    pub fn new(policy: EventPolicy) -> Self {
        Self {
            days: Vec::new(),
            pinned: None,
            policy,
        }
    }

    pub fn policy(&self) -> EventPolicy {
        self.policy
    }

    pub fn pinned_layout(&self) -> Option<&Layout> {
        self.pinned.as_ref()
    }

    pub fn pin_layout(&mut self, layout: &Layout) -> &Layout {
        self.pinned.get_or_insert_with(|| {
            info!(layout = %layout, "pinned session layout");
            layout.clone()
        })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn is_duplicate(&self, candidate: &NaiveDateTime) -> bool {
        let key = DateKey::of(candidate);
        self.days.iter().any(|day| day.date_key() == key)
    }

    pub fn insert_day(&mut self, day: Day) -> Result<usize, ScheduleError> {
        if self.is_duplicate(&day.start) {
            let key = day.date_key();
            return Err(ScheduleError::DuplicateDate {
                day: key.day,
                month: key.month,
            });
        }
        let index = self.days.partition_point(|existing| existing.start <= day.start);
        debug!(key = %day.date_key(), position = index + 1, "inserting day");
        self.days.insert(index, day);
        Ok(index + 1)
    }

    pub fn create_day(&mut self, interval: &Interval) -> Result<usize, ScheduleError> {
        let position = self.insert_day(Day::new(interval))?;
        self.pin_layout(interval.layout());
        Ok(position)
    }

    pub fn sort_days(&mut self) {
        self.days.sort_by_key(|day| day.start);
    }

    pub fn is_sorted(&self) -> bool {
        self.days.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }

    pub fn find_by_position(&self, position: usize) -> Result<&Day, ScheduleError> {
        let index = self.index_of(position)?;
        Ok(&self.days[index])
    }

    pub fn find_by_position_mut(&mut self, position: usize) -> Result<&mut Day, ScheduleError> {
        let index = self.index_of(position)?;
        Ok(&mut self.days[index])
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.days.iter().position(|day| day.id == id).map(|index| index + 1)
    }

    pub fn add_event_to_day(
        &mut self,
        day_position: usize,
        event: Event,
    ) -> Result<usize, ScheduleError> {
        let policy = self.policy;
        let day = self.find_by_position_mut(day_position)?;
        policy.check(day, &event)?;
        day.add_event(event);
        Ok(day.events.len())
    }

    pub fn add_todo(
        &mut self,
        day_position: usize,
        event_position: usize,
        todo: Todo,
    ) -> Result<usize, ScheduleError> {
        let event = self.event_mut(day_position, event_position)?;
        event.add_todo(todo);
        Ok(event.todos.len())
    }

    pub fn mark_todo_done(
        &mut self,
        day_position: usize,
        event_position: usize,
        todo_position: usize,
    ) -> Result<(), ScheduleError> {
        let event = self.event_mut(day_position, event_position)?;
        let len = event.todos.len();
        let todo = todo_position
            .checked_sub(1)
            .and_then(|index| event.todos.get_mut(index))
            .ok_or(ScheduleError::IndexOutOfBounds {
                index: todo_position,
                len,
            })?;
        todo.mark_done();
        Ok(())
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            layout: self.pinned.clone(),
            days: self.days.clone(),
        }
    }

    /// Rebuilds a store from a snapshot, re-validating every day and event
    /// against the snapshot's layout and the given policy.
    pub fn restore(snapshot: ScheduleSnapshot, policy: EventPolicy) -> Result<Self, ScheduleError> {
        let mut store = Self::new(policy);
        let Some(layout) = snapshot.layout else {
            if snapshot.days.is_empty() {
                return Ok(store);
            }
            return Err(ScheduleError::EmptyCollection);
        };
        let layout = Layout::checked(layout.pattern(), layout.time_only()).ok_or_else(|| {
            ScheduleError::InvalidLayout {
                pattern: layout.to_string(),
            }
        })?;
        store.pin_layout(&layout);
        for day in snapshot.days {
            interval::validate(&day.start, &day.end, &layout)?;
            let mut restored = Day {
                events: Vec::with_capacity(day.events.len()),
                ..day
            };
            for event in day.events {
                interval::validate(&event.start, &event.end, &layout)?;
                policy.check(&restored, &event)?;
                restored.add_event(event);
            }
            store.insert_day(restored)?;
        }
        Ok(store)
    }

    fn index_of(&self, position: usize) -> Result<usize, ScheduleError> {
        if self.days.is_empty() || self.pinned.is_none() {
            return Err(ScheduleError::EmptyCollection);
        }
        match position.checked_sub(1) {
            Some(index) if index < self.days.len() => Ok(index),
            _ => Err(ScheduleError::IndexOutOfBounds {
                index: position,
                len: self.days.len(),
            }),
        }
    }

    fn event_mut(
        &mut self,
        day_position: usize,
        event_position: usize,
    ) -> Result<&mut Event, ScheduleError> {
        let day = self.find_by_position_mut(day_position)?;
        let len = day.events.len();
        day.event_mut(event_position)
            .ok_or(ScheduleError::IndexOutOfBounds {
                index: event_position,
                len,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::LayoutProfile;
    use chrono::{NaiveDate, NaiveTime};

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    fn layout() -> Layout {
        LayoutProfile::Dated.layouts().remove(0)
    }

    fn day(year: i32, month: u32, date: u32) -> Interval {
        interval::checked(at(year, month, date, 8), at(year, month, date, 18), &layout()).unwrap()
    }

    #[test]
    fn keeps_days_sorted_on_insert() {
        let mut store = ScheduleStore::default();
        assert_eq!(store.create_day(&day(2026, 3, 10)), Ok(1));
        assert_eq!(store.create_day(&day(2026, 1, 2)), Ok(1));
        assert_eq!(store.create_day(&day(2026, 2, 20)), Ok(2));
        let starts: Vec<_> = store.days().iter().map(|d| d.start).collect();
        assert_eq!(
            starts,
            vec![at(2026, 1, 2, 8), at(2026, 2, 20, 8), at(2026, 3, 10, 8)]
        );

        let before = store.days().to_vec();
        store.sort_days();
        assert_eq!(store.days(), before.as_slice());
        assert!(store.is_sorted());
    }

    #[test]
    fn duplicate_detection_ignores_year() {
        let mut store = ScheduleStore::default();
        store.create_day(&day(2026, 1, 5)).unwrap();
        assert!(store.is_duplicate(&at(1999, 1, 5, 23)));
        assert!(!store.is_duplicate(&at(2026, 1, 6, 8)));
        assert_eq!(
            store.create_day(&day(2027, 1, 5)),
            Err(ScheduleError::DuplicateDate { day: 5, month: 1 })
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn equal_starts_keep_insertion_order() {
        let mut store = ScheduleStore::default();
        let first = Day::new(&day(2026, 1, 5));
        let second = Day::new(&day(2026, 1, 5));
        // Bypasses the duplicate rule to exercise ordering of ties.
        store.days.push(first.clone());
        store.days.push(second.clone());
        store.sort_days();
        assert_eq!(store.days()[0].id, first.id);
        assert_eq!(store.days()[1].id, second.id);
    }

    #[test]
    fn lookup_requires_days_and_valid_ordinal() {
        let mut store = ScheduleStore::default();
        assert_eq!(store.find_by_position(1).unwrap_err(), ScheduleError::EmptyCollection);

        store.create_day(&day(2026, 1, 5)).unwrap();
        store.create_day(&day(2026, 1, 6)).unwrap();
        assert_eq!(store.find_by_position(2).unwrap().start, at(2026, 1, 6, 8));
        assert_eq!(
            store.find_by_position(0).unwrap_err(),
            ScheduleError::IndexOutOfBounds { index: 0, len: 2 }
        );
        assert_eq!(
            store.find_by_position(3).unwrap_err(),
            ScheduleError::IndexOutOfBounds { index: 3, len: 2 }
        );
    }

    #[test]
    fn first_day_pins_layout() {
        let mut store = ScheduleStore::default();
        assert!(store.pinned_layout().is_none());
        store.create_day(&day(2026, 1, 5)).unwrap();
        assert_eq!(store.pinned_layout(), Some(&layout()));

        let other = LayoutProfile::Dated.layouts().remove(1);
        assert_eq!(store.pin_layout(&other), &layout());
    }

    #[test]
    fn events_and_todos_are_addressed_by_ordinal() {
        let mut store = ScheduleStore::default();
        store.create_day(&day(2026, 1, 5)).unwrap();
        let meeting = interval::checked(at(2026, 1, 5, 10), at(2026, 1, 5, 11), &layout()).unwrap();
        assert_eq!(store.add_event_to_day(1, Event::new("sync", None, &meeting)), Ok(1));
        assert_eq!(store.add_todo(1, 1, Todo::new("agenda", "write it", None)), Ok(1));
        assert_eq!(
            store.add_todo(1, 2, Todo::new("x", "", None)),
            Err(ScheduleError::IndexOutOfBounds { index: 2, len: 1 })
        );

        store.mark_todo_done(1, 1, 1).unwrap();
        assert!(store.days()[0].events[0].todos[0].done);
        assert_eq!(
            store.mark_todo_done(1, 1, 2),
            Err(ScheduleError::IndexOutOfBounds { index: 2, len: 1 })
        );
    }

    #[test]
    fn restore_revalidates_snapshot() {
        let mut store = ScheduleStore::default();
        store.create_day(&day(2026, 1, 6)).unwrap();
        store.create_day(&day(2026, 1, 5)).unwrap();
        let snapshot = store.snapshot();

        let restored = ScheduleStore::restore(snapshot.clone(), EventPolicy::default()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);

        let mut broken = snapshot;
        broken.days[0].end = broken.days[0].start;
        assert_eq!(
            ScheduleStore::restore(broken, EventPolicy::default()).unwrap_err(),
            ScheduleError::IntervalInverted
        );
    }

    #[test]
    fn restore_rejects_unusable_layout() {
        let mut store = ScheduleStore::default();
        store.create_day(&day(2026, 1, 5)).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.layout = Some(Layout::new("%Q %H:%M", "%H:%M"));

        assert_eq!(
            ScheduleStore::restore(snapshot, EventPolicy::default()).unwrap_err(),
            ScheduleError::InvalidLayout {
                pattern: "%Q %H:%M".to_string()
            }
        );
    }
}
