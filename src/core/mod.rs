pub mod action;
pub mod command;
pub mod state;

pub use action::{Action, NotifyLevel, Tab};
pub use command::{parse_command, Command};
pub use state::{reduce, Notice, ViewState};
