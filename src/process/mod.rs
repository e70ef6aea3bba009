use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::core::TerminalStatus;

pub mod executor;
pub mod signal;

pub use executor::{Launch, ProcessLauncher};
pub use signal::{toggle_foreground_only, BackgroundReport, SignalController};

/// Exit code of a child whose redirection file could not be opened.
pub const REDIRECT_FAILURE: i32 = 1;
/// Exit code of a child whose program could not be executed.
pub const EXEC_FAILURE: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("fork failed: {0}")]
    Fork(Errno),
    #[error("waitpid failed: {0}")]
    Wait(Errno),
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),
    #[error("cannot install signal handler: {0}")]
    SignalError(String),
}

/// Terminal outcome of a wait, or `None` if the child has not finished.
pub fn terminal_status(status: WaitStatus) -> Option<(Pid, TerminalStatus)> {
    match status {
        WaitStatus::Exited(pid, code) => Some((pid, TerminalStatus::Exited(code))),
        WaitStatus::Signaled(pid, signal, _) => Some((pid, TerminalStatus::Signaled(signal as i32))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn test_terminal_status_conversion() {
        let pid = Pid::from_raw(42);

        assert_eq!(
            terminal_status(WaitStatus::Exited(pid, 3)),
            Some((pid, TerminalStatus::Exited(3)))
        );
        assert_eq!(
            terminal_status(WaitStatus::Signaled(pid, Signal::SIGTERM, false)),
            Some((pid, TerminalStatus::Signaled(15)))
        );
        assert_eq!(terminal_status(WaitStatus::StillAlive), None);
    }
}
