use super::{Command, CommandError};
use crate::core::ShellState;

/// Leaves immediately; background children are not waited for.
#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute(&self, _args: &[String], _state: &mut ShellState) -> Result<(), CommandError> {
        tracing::debug!("exit builtin");
        std::process::exit(0);
    }
}
