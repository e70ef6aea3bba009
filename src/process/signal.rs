use std::fmt;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use signal_hook::consts::{SIGCHLD, SIGTSTP};
use signal_hook::low_level;

use super::{terminal_status, ProcessError};
use crate::core::{ShellState, TerminalStatus};

pub const ENTER_FOREGROUND_ONLY: &str = "Entering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &str = "Exiting foreground-only mode\n";

/// Flips the background flag and returns the message announcing the new
/// mode. Async-signal-safe: one atomic op, no allocation.
pub fn toggle_foreground_only(background_allowed: &AtomicBool) -> &'static str {
    if background_allowed.fetch_xor(true, Ordering::SeqCst) {
        ENTER_FOREGROUND_ONLY
    } else {
        EXIT_FOREGROUND_ONLY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundReport {
    pub pid: Pid,
    pub status: TerminalStatus,
}

impl fmt::Display for BackgroundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background pid {} is done: {}", self.pid, self.status)
    }
}

fn install_error(e: impl fmt::Display) -> ProcessError {
    ProcessError::SignalError(e.to_string())
}

/// Owns the interpreter's signal dispositions.
///
/// SIGINT is ignored outright. SIGTSTP is handled entirely in signal
/// context. SIGCHLD only pokes a self-pipe; the reaping itself happens on
/// the main flow through [`SignalController::reap_background`].
#[derive(Debug)]
pub struct SignalController {
    child_events: UnixStream,
}

impl SignalController {
    pub fn install(state: &ShellState) -> Result<Self, ProcessError> {
        // SAFETY: replacing a disposition with SIG_IGN runs no code.
        let ignored = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigIgn) };
        ignored.map_err(install_error)?;

        let background_allowed = state.background_flag();
        let on_stop = move || {
            let message = toggle_foreground_only(&background_allowed);
            // SAFETY: write(2) is async-signal-safe and the buffer is static.
            unsafe { libc::write(libc::STDOUT_FILENO, message.as_ptr().cast(), message.len()) };
        };
        // SAFETY: the handler only touches an atomic and calls write(2).
        let _stop_id = unsafe { low_level::register(SIGTSTP, on_stop) }.map_err(install_error)?;

        let (child_events, notifier) = UnixStream::pair().map_err(install_error)?;
        child_events.set_nonblocking(true).map_err(install_error)?;
        low_level::pipe::register(SIGCHLD, notifier).map_err(install_error)?;

        tracing::debug!("signal handlers installed");
        Ok(Self { child_events })
    }

    /// Descriptor that turns readable whenever SIGCHLD has been delivered.
    pub fn event_fd(&self) -> RawFd {
        self.child_events.as_raw_fd()
    }

    /// Empties the self-pipe; true if at least one SIGCHLD was pending.
    pub fn drain(&self) -> bool {
        let mut buf = [0u8; 64];
        let mut seen = false;
        loop {
            match (&self.child_events).read(&mut buf) {
                Ok(0) => break,
                Ok(_) => seen = true,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        seen
    }

    /// Collects every finished child; see [`reap_finished`].
    pub fn reap_background(
        &self,
        state: &mut ShellState,
    ) -> Result<Vec<BackgroundReport>, ProcessError> {
        reap_finished(state)
    }
}

/// Collects every finished child without blocking and records each status.
/// Must not run while a foreground child is still being waited on.
pub fn reap_finished(state: &mut ShellState) -> Result<Vec<BackgroundReport>, ProcessError> {
    let mut reports = Vec::new();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => {
                if let Some((pid, status)) = terminal_status(status) {
                    state.record(status);
                    reports.push(BackgroundReport { pid, status });
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ProcessError::Wait(e)),
        }
    }
    if !reports.is_empty() {
        tracing::debug!(count = reports.len(), "reaped background children");
    }
    Ok(reports)
}
