use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::interval::Interval;
use crate::models::todo::Todo;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub deadline: Option<NaiveDateTime>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub todos: Vec<Todo>,
}

impl Event {
    pub fn new(name: &str, deadline: Option<NaiveDateTime>, interval: &Interval) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            deadline,
            start: interval.start(),
            end: interval.end(),
            todos: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap: events that only touch at a boundary do not overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn add_todo(&mut self, todo: Todo) {
        self.todos.push(todo);
    }
}
