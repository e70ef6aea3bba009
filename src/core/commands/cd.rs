use super::{Command, CommandError};
use crate::core::ShellState;
use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct CdCommand;

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self
    }

    fn home_dir() -> Result<PathBuf, CommandError> {
        env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or_else(|| CommandError::ExecutionError("cd: HOME not set".to_string()))
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String], _state: &mut ShellState) -> Result<(), CommandError> {
        let target = match args.first() {
            Some(path) => PathBuf::from(path),
            None => Self::home_dir()?,
        };

        env::set_current_dir(&target).map_err(|e| {
            CommandError::ExecutionError(format!("cd: {}: {}", target.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // One test owns the working directory and HOME so parallel tests never
    // observe a half-changed process.
    #[test]
    fn test_cd_targets() {
        let cmd = CdCommand::new();
        let mut state = ShellState::new();
        let original = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let saved_home = env::var_os("HOME");

        cmd.execute(&[dir.path().to_str().unwrap().to_string()], &mut state)
            .unwrap();
        assert_eq!(
            env::current_dir().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        env::set_var("HOME", home.path());
        cmd.execute(&[], &mut state).unwrap();
        assert_eq!(
            env::current_dir().unwrap().canonicalize().unwrap(),
            home.path().canonicalize().unwrap()
        );

        let result = cmd.execute(&["/nonexistent/path".to_string()], &mut state);
        assert!(matches!(result, Err(CommandError::ExecutionError(_))));

        match saved_home {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
        env::set_current_dir(original).unwrap();
    }
}
