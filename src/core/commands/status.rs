use super::{Command, CommandError};
use crate::core::ShellState;
use std::io::{self, Write};

#[derive(Clone)]
pub struct StatusCommand;

impl Default for StatusCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, state: &ShellState) -> String {
        state.last_status().to_string()
    }
}

impl Command for StatusCommand {
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<(), CommandError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", self.report(state))?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TerminalStatus;

    #[test]
    fn test_status_before_any_command() {
        let state = ShellState::new();
        assert_eq!(StatusCommand::new().report(&state), "exit value 0");
    }

    #[test]
    fn test_status_after_signal() {
        let mut state = ShellState::new();
        state.record(TerminalStatus::Signaled(2));
        assert_eq!(StatusCommand::new().report(&state), "terminated by signal 2");
    }
}
