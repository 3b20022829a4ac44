pub mod creation_flow;
pub mod interval;
pub mod registry;
pub mod render;
pub mod schedule_store;
pub mod time_parser;
