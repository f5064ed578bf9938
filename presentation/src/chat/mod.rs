//! Interactive chat mode

mod command;
mod repl;

pub use command::{CommandError, HELP, ReplCommand};
pub use repl::ChatRepl;
