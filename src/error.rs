use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("could not parse `{input}`")]
    ParseFailure { input: String },

    #[error("a day for {day:02}/{month:02} already exists")]
    DuplicateDate { day: u32, month: u32 },

    #[error("the end time must be after the start time")]
    IntervalInverted,

    #[error("start and end have to be on the same weekday")]
    WeekdayMismatch,

    #[error("start and end have to be on the same day")]
    DateMismatch,

    #[error("index {index} is out of bounds (1..={len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("there were no days created so far")]
    EmptyCollection,

    #[error("the event has to lie within its day")]
    OutsideDay,

    #[error("the event overlaps `{other}`")]
    Overlap { other: String },

    #[error("`{pattern}` is not a usable layout")]
    InvalidLayout { pattern: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("input cancelled")]
    Cancelled,

    #[error("input interrupted")]
    Interrupted,

    #[error("failed to read input: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("giving up after {attempts} failed attempts")]
    RetryLimit { attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
