use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How the most recent foreground job or reaped background job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Exited(i32),
    Signaled(i32),
}

impl Default for TerminalStatus {
    fn default() -> Self {
        TerminalStatus::Exited(0)
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalStatus::Exited(code) => write!(f, "exit value {}", code),
            TerminalStatus::Signaled(signo) => write!(f, "terminated by signal {}", signo),
        }
    }
}

/// Interpreter-wide state. `last_status` is only written from the main
/// flow (foreground wait and the deferred reaper); the background flag is
/// shared with the SIGTSTP handler and therefore atomic.
#[derive(Debug)]
pub struct ShellState {
    last_status: TerminalStatus,
    background_allowed: Arc<AtomicBool>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            last_status: TerminalStatus::default(),
            background_allowed: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn last_status(&self) -> TerminalStatus {
        self.last_status
    }

    pub fn record(&mut self, status: TerminalStatus) {
        self.last_status = status;
    }

    pub fn background_allowed(&self) -> bool {
        self.background_allowed.load(Ordering::SeqCst)
    }

    /// Handle for the signal layer, which is the only writer of the flag.
    pub fn background_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.background_allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        let state = ShellState::new();
        assert_eq!(state.last_status(), TerminalStatus::Exited(0));
        assert_eq!(state.last_status().to_string(), "exit value 0");
        assert!(state.background_allowed());
    }

    #[test]
    fn test_record_replaces_status() {
        let mut state = ShellState::new();
        state.record(TerminalStatus::Signaled(15));
        assert_eq!(state.last_status().to_string(), "terminated by signal 15");

        state.record(TerminalStatus::Exited(3));
        assert_eq!(state.last_status().to_string(), "exit value 3");
    }

    #[test]
    fn test_background_flag_is_shared() {
        let state = ShellState::new();
        state.background_flag().store(false, Ordering::SeqCst);
        assert!(!state.background_allowed());
    }
}
