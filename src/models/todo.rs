use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: Option<NaiveDateTime>,
    pub done: bool,
}

impl Todo {
    pub fn new(name: &str, description: &str, deadline: Option<NaiveDateTime>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            deadline,
            done: false,
        }
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn status_label(&self) -> &'static str {
        if self.done { "Done" } else { "Not Done" }
    }
}
