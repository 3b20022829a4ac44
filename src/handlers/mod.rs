pub mod prompter;
pub mod session;
