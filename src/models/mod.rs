pub mod day;
pub mod event;
pub mod interval;
pub mod layout;
pub mod todo;
