use std::collections::BTreeMap;

mod cd;
mod exit;
mod status;

pub use cd::CdCommand;
pub use exit::ExitCommand;
pub use status::StatusCommand;

use crate::core::ShellState;
use crate::input::ParsedCommand;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    ExecutionError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A command that runs inside the interpreter's own process.
pub trait Command {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<(), CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cd(CdCommand),
    Exit(ExitCommand),
    Status(StatusCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<(), CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, state),
            CommandType::Exit(cmd) => cmd.execute(args, state),
            CommandType::Status(cmd) => cmd.execute(args, state),
        }
    }
}

#[derive(Clone)]
pub struct BuiltinDispatcher {
    commands: BTreeMap<String, CommandType>,
}

impl Default for BuiltinDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinDispatcher {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd".to_string(), CommandType::Cd(CdCommand::new()));
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        commands.insert(
            "status".to_string(),
            CommandType::Status(StatusCommand::new()),
        );

        Self { commands }
    }

    /// Runs `command` if it names a built-in. `Ok(false)` means the caller
    /// must launch it as an external program. Redirections and `&` are
    /// ignored for built-ins.
    pub fn dispatch(
        &self,
        command: &ParsedCommand,
        state: &mut ShellState,
    ) -> Result<bool, CommandError> {
        let Some(cmd) = self.commands.get(command.program()) else {
            return Ok(false);
        };

        tracing::debug!(builtin = command.program(), "running builtin");
        cmd.execute(&command.args[1..], state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> ParsedCommand {
        ParsedCommand {
            args: args.iter().map(|s| s.to_string()).collect(),
            ..ParsedCommand::default()
        }
    }

    #[test]
    fn test_builtin_command_detection() {
        let dispatcher = BuiltinDispatcher::new();

        let names: Vec<&str> = dispatcher.commands.keys().map(String::as_str).collect();

        assert_eq!(names, ["cd", "exit", "status"]);
    }

    #[test]
    fn test_status_is_dispatched() {
        let dispatcher = BuiltinDispatcher::new();
        let mut state = ShellState::new();

        assert!(dispatcher.dispatch(&command(&["status"]), &mut state).unwrap());
    }

    #[test]
    fn test_external_falls_through() {
        let dispatcher = BuiltinDispatcher::new();
        let mut state = ShellState::new();

        assert!(!dispatcher
            .dispatch(&command(&["echo", "hello"]), &mut state)
            .unwrap());
    }

    #[test]
    fn test_cd_failure_is_reported() {
        let dispatcher = BuiltinDispatcher::new();
        let mut state = ShellState::new();

        let result = dispatcher.dispatch(&command(&["cd", "/path/that/does/not/exist"]), &mut state);
        assert!(matches!(result, Err(CommandError::ExecutionError(_))));
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::ExecutionError("failed".to_string()),
            CommandError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "io error",
            )),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
