use std::fmt::Write;

use chrono::{Duration, NaiveDateTime};

use crate::error::ScheduleError;
use crate::models::layout::Layout;
use crate::service::schedule_store::ScheduleSnapshot;

/// `"{H}h {M}min"` when there are leftover minutes, otherwise `"{H}h"`.
/// Hours are never rolled over into days.
pub fn format_duration(duration: Duration) -> String {
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    if minutes > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{hours}h")
    }
}

fn format_deadline(deadline: Option<&NaiveDateTime>, layout: &Layout) -> String {
    deadline.map_or_else(|| "none".to_string(), |d| layout.format_time(d))
}

pub fn render_days(snapshot: &ScheduleSnapshot) -> Result<String, ScheduleError> {
    let layout = match &snapshot.layout {
        Some(layout) if !snapshot.days.is_empty() => layout,
        _ => return Err(ScheduleError::EmptyCollection),
    };

    let mut out = String::new();
    for (index, day) in snapshot.days.iter().enumerate() {
        let _ = writeln!(out, "{}. {{", index + 1);
        let _ = writeln!(out, "  Start of day: {}", layout.format(&day.start));
        let _ = writeln!(out, "  End of day: {}", layout.format(&day.end));
        let _ = writeln!(out, "  Duration: {}", format_duration(day.duration()));
        if day.events.is_empty() {
            let _ = writeln!(out, "  Events: []");
            let _ = writeln!(out, "}}");
            continue;
        }
        let _ = writeln!(out, "  Events: [");
        for (event_index, event) in day.events.iter().enumerate() {
            let _ = write!(
                out,
                "    {}. {{ Title: {}, Duration: {}, Start: {}, End: {}, Deadline: {}, Todos: [",
                event_index + 1,
                event.name,
                format_duration(event.duration()),
                layout.format(&event.start),
                layout.format(&event.end),
                format_deadline(event.deadline.as_ref(), layout),
            );
            if event.todos.is_empty() {
                let _ = writeln!(out, "] }}");
                continue;
            }
            let _ = writeln!(out);
            for (todo_index, todo) in event.todos.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "      {}. {{ Name: {}, Description: {}, Deadline: {}, {} }}",
                    todo_index + 1,
                    todo.name,
                    todo.description,
                    format_deadline(todo.deadline.as_ref(), layout),
                    todo.status_label(),
                );
            }
            let _ = writeln!(out, "    ] }}");
        }
        let _ = writeln!(out, "  ]");
        let _ = writeln!(out, "}}");
    }
    Ok(out)
}

pub fn render_json(snapshot: &ScheduleSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}
