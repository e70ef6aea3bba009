use crate::error::ShellError;
use crate::process::ProcessError;

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> Result<(), ShellError>;
}

impl CommandHandler for super::Shell {
    /// Errors returned from here end the interpreter; everything a single
    /// command can get wrong is reported and swallowed.
    fn execute_line(&mut self, line: &str) -> Result<(), ShellError> {
        let command = match self.parser.parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                eprintln!("smallsh: {}", e);
                return Ok(());
            }
        };

        match self.builtins.dispatch(&command, &mut self.state) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                eprintln!("smallsh: {}", e);
                return Ok(());
            }
        }

        match self.launcher.launch(&command, &mut self.state) {
            Ok(launch) => {
                tracing::debug!(?launch, "command finished");
                Ok(())
            }
            Err(ProcessError::InvalidArgument(arg)) => {
                eprintln!("smallsh: invalid argument {:?}", arg);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
