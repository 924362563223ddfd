pub mod args;
pub mod command;

pub use args::{ArgKind, ArgSpec};
pub use command::{Command, Eligibility, HttpMethod, Rejection};
