//! Interactive planner session: the menu loop driving the scheduling core.
//!
//! The session never holds the store lock while waiting for input. Every
//! read-modify step takes the lock once, so another writer of the same store
//! can interleave only between prompts, and ordinals are re-resolved by id
//! before each mutation.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::config::PlannerSettings;
use crate::error::{PromptError, ScheduleError, SessionError};
use crate::handlers::prompter::Prompter;
use crate::models::day::Day;
use crate::models::event::Event;
use crate::models::interval::Interval;
use crate::models::layout::Layout;
use crate::models::todo::Todo;
use crate::service::creation_flow::{FlowStep, IntervalFlow, ItemKind};
use crate::service::registry::SharedStore;
use crate::service::render;
use crate::service::schedule_store::{ScheduleSnapshot, ScheduleStore};
use crate::service::time_parser::TimeParser;

pub const MENU: &str = "1. Create a new day
2. Add a new event to a day
3. Add a new todo to an event
4. Print all days
5. Mark a todo as done
6. Export schedule as JSON
0. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateDay,
    AddEvent,
    AddTodo,
    PrintDays,
    MarkTodoDone,
    Export,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::CreateDay),
            "2" => Ok(MenuChoice::AddEvent),
            "3" => Ok(MenuChoice::AddTodo),
            "4" => Ok(MenuChoice::PrintDays),
            "5" => Ok(MenuChoice::MarkTodoDone),
            "6" => Ok(MenuChoice::Export),
            "0" => Ok(MenuChoice::Exit),
            other => Err(format!("{other} is an invalid option!")),
        }
    }
}

pub struct PlannerSession<P: Prompter> {
    prompter: P,
    parser: TimeParser,
    store: SharedStore,
    settings: PlannerSettings,
}

impl<P: Prompter> PlannerSession<P> {
    pub fn new(prompter: P, store: SharedStore, settings: PlannerSettings) -> Self {
        let parser = TimeParser::new(settings.layouts.clone(), settings.anchor);
        Self {
            prompter,
            parser,
            store,
            settings,
        }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Runs the menu until the user exits. Only a failing input source ends
    /// the loop with an error; every other failure is reported and the menu
    /// is shown again.
    pub fn run(&mut self) -> Result<(), PromptError> {
        loop {
            self.prompter.say(MENU);
            let input = match self.prompter.ask("Choose an option:") {
                Ok(input) => input,
                Err(PromptError::Cancelled) => {
                    self.prompter.say("Exiting...");
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            let choice = match input.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(message) => {
                    self.prompter.say(&message);
                    continue;
                }
            };
            if choice == MenuChoice::Exit {
                self.prompter.say("Exiting...");
                return Ok(());
            }
            match self.dispatch(choice) {
                Ok(message) => self.prompter.say(&message),
                Err(SessionError::Prompt(PromptError::Cancelled)) => self.prompter.say("Cancelled."),
                Err(SessionError::Prompt(err)) => return Err(err),
                Err(err) => {
                    warn!(?choice, "menu action failed: {err}");
                    self.prompter.say(&format!("Error: {err}"));
                }
            }
        }
    }

    pub fn dispatch(&mut self, choice: MenuChoice) -> Result<String, SessionError> {
        match choice {
            MenuChoice::CreateDay => self
                .create_day()
                .map(|position| format!("Successfully added new day (position {position})")),
            MenuChoice::AddEvent => self
                .add_event()
                .map(|_| "Successfully added a new event".to_string()),
            MenuChoice::AddTodo => self
                .add_todo()
                .map(|_| "Successfully added a new todo".to_string()),
            MenuChoice::PrintDays => self.print_days(),
            MenuChoice::MarkTodoDone => self
                .mark_todo_done()
                .map(|_| "Marked todo as done".to_string()),
            MenuChoice::Export => self
                .export()
                .map(|path| format!("Exported schedule to {}", path.display())),
            MenuChoice::Exit => Ok(String::new()),
        }
    }

    pub fn create_day(&mut self) -> Result<usize, SessionError> {
        let interval = self.run_interval(ItemKind::Day)?;
        let position = self.store.blocking_lock().create_day(&interval)?;
        info!(user = %self.settings.user, position, "day created");
        Ok(position)
    }

    pub fn add_event(&mut self) -> Result<usize, SessionError> {
        let layout = self.ensure_days()?;
        self.show_listing()?;
        let day_id = self.ask_day("Please enter the index of the day you want to add an event to:")?;
        let title = self.prompter.ask("Please enter the title of the event:")?;
        let day_date = self.with_day(&day_id, |store, position| {
            Ok(store.find_by_position(position)?.start.date())
        })?;
        let deadline = self.ask_deadline(
            "Please enter a deadline for the event (just press enter for none):",
            &layout,
            day_date,
        )?;

        let mut failures = 0;
        loop {
            let interval = self.run_interval(ItemKind::Event)?;
            let event = Event::new(title.trim(), deadline, &interval);
            let added = self.with_day(&day_id, |store, position| {
                store.add_event_to_day(position, event)
            });
            match added {
                Ok(position) => {
                    info!(user = %self.settings.user, position, "event added");
                    return Ok(position);
                }
                Err(SessionError::Schedule(
                    err @ (ScheduleError::OutsideDay | ScheduleError::Overlap { .. }),
                )) => {
                    failures += 1;
                    self.prompter.say(&format!("Invalid event: {err}. Please try again."));
                    self.check_attempts(failures)?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn add_todo(&mut self) -> Result<usize, SessionError> {
        let layout = self.ensure_days()?;
        self.show_listing()?;
        let day_id = self.ask_day("Please enter the index of the day:")?;
        let event_position = self.ask_event(&day_id)?;
        let name = self.prompter.ask("Please enter the name of the todo:")?;
        let description = self.prompter.ask("Please enter a description of the todo:")?;
        let event_date = self.with_day(&day_id, |store, position| {
            let day = store.find_by_position(position)?;
            Ok(day.events[event_position - 1].start.date())
        })?;
        let deadline = self.ask_deadline(
            "Please enter a deadline for the todo (just press enter for none):",
            &layout,
            event_date,
        )?;
        let todo = Todo::new(name.trim(), description.trim(), deadline);
        let position = self.with_day(&day_id, |store, position| {
            store.add_todo(position, event_position, todo)
        })?;
        Ok(position)
    }

    pub fn mark_todo_done(&mut self) -> Result<(), SessionError> {
        self.ensure_days()?;
        self.show_listing()?;
        let day_id = self.ask_day("Please enter the index of the day:")?;
        let event_position = self.ask_event(&day_id)?;
        let id = day_id.clone();
        let todo_position = self.ask_valid("Please enter the index of the todo:", move |raw, _, store| {
            let position = parse_position(raw)?;
            let day = find_day(store, &id)?;
            let todos = day.events[event_position - 1].todos.len();
            if position == 0 || position > todos {
                return Err(ScheduleError::IndexOutOfBounds {
                    index: position,
                    len: todos,
                });
            }
            Ok(position)
        })?;
        self.with_day(&day_id, |store, position| {
            store.mark_todo_done(position, event_position, todo_position)
        })?;
        Ok(())
    }

    pub fn print_days(&mut self) -> Result<String, SessionError> {
        let snapshot = self.store.blocking_lock().snapshot();
        Ok(render::render_days(&snapshot)?)
    }

    pub fn export(&mut self) -> Result<PathBuf, SessionError> {
        let snapshot = self.store.blocking_lock().snapshot();
        let path = PathBuf::from(&self.settings.export_path);
        write_snapshot(&path, &snapshot)?;
        info!(path = %path.display(), days = snapshot.days.len(), "schedule exported");
        Ok(path)
    }

    fn run_interval(&mut self, kind: ItemKind) -> Result<Interval, SessionError> {
        let mut flow = IntervalFlow::new(kind);
        while let Some(prompt) = flow.prompt() {
            let raw = match self.prompter.ask(&prompt) {
                Ok(raw) => raw,
                Err(err) => {
                    flow.cancel();
                    return Err(err.into());
                }
            };
            let step = {
                let store = self.store.blocking_lock();
                flow.submit(&raw, &self.parser, &store)
            };
            match step {
                FlowStep::Retry(err) => {
                    self.prompter
                        .say(&format!("Invalid {} time: {err}. Please try again.", kind.label()));
                    self.check_attempts(flow.failures())?;
                }
                FlowStep::AwaitEnd => {}
                FlowStep::Accepted(interval) => return Ok(interval),
                FlowStep::Finished => break,
            }
        }
        Err(PromptError::Cancelled.into())
    }

    /// Asks until `check` accepts the trimmed answer. An empty schedule ends
    /// the question immediately.
    fn ask_valid<T>(
        &mut self,
        message: &str,
        mut check: impl FnMut(&str, &TimeParser, &ScheduleStore) -> Result<T, ScheduleError>,
    ) -> Result<T, SessionError> {
        let mut failures = 0;
        loop {
            let raw = self.prompter.ask(message)?;
            let outcome = {
                let store = self.store.blocking_lock();
                check(raw.trim(), &self.parser, &*store)
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(ScheduleError::EmptyCollection) => {
                    return Err(ScheduleError::EmptyCollection.into());
                }
                Err(err) => {
                    failures += 1;
                    self.prompter.say(&format!("{err}. Please try again."));
                    self.check_attempts(failures)?;
                }
            }
        }
    }

    fn ask_day(&mut self, message: &str) -> Result<String, SessionError> {
        self.ask_valid(message, |raw, _, store| {
            let position = parse_position(raw)?;
            Ok(store.find_by_position(position)?.id.clone())
        })
    }

    fn ask_event(&mut self, day_id: &str) -> Result<usize, SessionError> {
        let id = day_id.to_string();
        self.ask_valid("Please enter the index of the event:", move |raw, _, store| {
            let position = parse_position(raw)?;
            let events = find_day(store, &id)?.events.len();
            if position == 0 || position > events {
                return Err(ScheduleError::IndexOutOfBounds {
                    index: position,
                    len: events,
                });
            }
            Ok(position)
        })
    }

    fn ask_deadline(
        &mut self,
        message: &str,
        layout: &Layout,
        on: NaiveDate,
    ) -> Result<Option<NaiveDateTime>, SessionError> {
        self.ask_valid(message, |raw, parser, _| {
            if raw.is_empty() {
                return Ok(None);
            }
            parser.parse_deadline(raw, layout, on).map(Some)
        })
    }

    fn with_day<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ScheduleStore, usize) -> Result<T, ScheduleError>,
    ) -> Result<T, SessionError> {
        let mut store = self.store.blocking_lock();
        let position = store.position_of(id).ok_or(ScheduleError::EmptyCollection)?;
        Ok(f(&mut *store, position)?)
    }

    fn ensure_days(&self) -> Result<Layout, SessionError> {
        let store = self.store.blocking_lock();
        match store.pinned_layout() {
            Some(layout) if !store.is_empty() => Ok(layout.clone()),
            _ => Err(ScheduleError::EmptyCollection.into()),
        }
    }

    fn show_listing(&mut self) -> Result<(), SessionError> {
        let listing = self.print_days()?;
        self.prompter.say(&listing);
        Ok(())
    }

    fn check_attempts(&self, failures: u32) -> Result<(), SessionError> {
        match self.settings.max_attempts {
            Some(limit) if failures >= limit => Err(SessionError::RetryLimit { attempts: failures }),
            _ => Ok(()),
        }
    }
}

fn parse_position(raw: &str) -> Result<usize, ScheduleError> {
    raw.parse::<usize>().map_err(|_| ScheduleError::ParseFailure {
        input: raw.to_string(),
    })
}

fn find_day<'a>(store: &'a ScheduleStore, id: &str) -> Result<&'a Day, ScheduleError> {
    let position = store.position_of(id).ok_or(ScheduleError::EmptyCollection)?;
    store.find_by_position(position)
}

pub fn write_snapshot(path: &Path, snapshot: &ScheduleSnapshot) -> Result<(), SessionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render::render_json(snapshot)?)?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<ScheduleSnapshot, SessionError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
