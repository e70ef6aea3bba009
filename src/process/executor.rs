use std::ffi::CString;
use std::io::{self, Write};
use std::os::raw::c_int;

use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::{execvp, fork, ForkResult, Pid};

use super::signal::reap_finished;
use super::{terminal_status, BackgroundReport, ProcessError, EXEC_FAILURE, REDIRECT_FAILURE};
use crate::core::{ShellState, TerminalStatus};
use crate::input::ParsedCommand;

/// Permissions for output files the child creates.
const OUTPUT_MODE: libc::c_uint = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Foreground(TerminalStatus),
    /// `finished` is set when the child was already gone at launch time.
    Background {
        pid: Pid,
        finished: Option<TerminalStatus>,
    },
}

/// Everything the child needs, converted before forking so the child does
/// no fallible conversions of its own.
struct PreparedCommand {
    argv: Vec<CString>,
    input: Option<CString>,
    output: Option<CString>,
}

fn to_cstring(value: &str) -> Result<CString, ProcessError> {
    CString::new(value).map_err(|_| ProcessError::InvalidArgument(value.to_string()))
}

impl PreparedCommand {
    fn new(command: &ParsedCommand) -> Result<Self, ProcessError> {
        let argv = command
            .args
            .iter()
            .map(|arg| to_cstring(arg))
            .collect::<Result<Vec<_>, _>>()?;
        if argv.is_empty() {
            return Err(ProcessError::InvalidArgument(String::new()));
        }

        Ok(Self {
            argv,
            input: command.input_file.as_deref().map(to_cstring).transpose()?,
            output: command.output_file.as_deref().map(to_cstring).transpose()?,
        })
    }

    fn exec_child(&self, background: bool) -> ! {
        let interrupt = if background {
            SigHandler::SigIgn
        } else {
            SigHandler::SigDfl
        };
        // SAFETY: the child is single-threaded and about to exec; both
        // dispositions run no code in this process.
        unsafe {
            let _ = signal::signal(Signal::SIGINT, interrupt);
            let _ = signal::signal(Signal::SIGTSTP, SigHandler::SigIgn);
        }

        if let Some(path) = &self.input {
            redirect(path, libc::O_RDONLY, libc::STDIN_FILENO);
        }
        if let Some(path) = &self.output {
            redirect(
                path,
                libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
                libc::STDOUT_FILENO,
            );
        }

        match execvp(&self.argv[0], &self.argv) {
            Ok(never) => match never {},
            Err(errno) => {
                eprintln!(
                    "smallsh: {}: {}",
                    self.argv[0].to_string_lossy(),
                    errno.desc()
                );
                child_exit(EXEC_FAILURE)
            }
        }
    }
}

fn child_exit(code: c_int) -> ! {
    // SAFETY: _exit skips atexit handlers and Rust-side buffers inherited
    // from the parent.
    unsafe { libc::_exit(code) }
}

/// Opens `path` close-on-exec and installs it as `target`. Only returns on
/// success; failure ends the child with [`REDIRECT_FAILURE`].
fn redirect(path: &CString, flags: c_int, target: c_int) {
    // SAFETY: `path` is NUL-terminated; mode is only read with O_CREAT.
    let fd = unsafe { libc::open(path.as_ptr(), flags | libc::O_CLOEXEC, OUTPUT_MODE) };
    // SAFETY: dup2 on a descriptor we just opened.
    if fd == -1 || unsafe { libc::dup2(fd, target) } == -1 {
        let err = io::Error::last_os_error();
        eprintln!("smallsh: {}: {}", path.to_string_lossy(), err);
        child_exit(REDIRECT_FAILURE);
    }
}

#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    /// Reap background jobs that finished during a foreground wait before
    /// the foreground status is recorded.
    reap_siblings: bool,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self {
            reap_siblings: true,
        }
    }

    /// Forks and execs `command`. Foreground launches return only after the
    /// child's status is recorded; background launches never block.
    pub fn launch(
        &self,
        command: &ParsedCommand,
        state: &mut ShellState,
    ) -> Result<Launch, ProcessError> {
        let prepared = PreparedCommand::new(command)?;
        let background = command.background && state.background_allowed();

        // The child inherits any unflushed output otherwise.
        let _ = io::stdout().flush();

        // SAFETY: the interpreter is single-threaded; the child only calls
        // signal(2), open(2), dup2(2), execvp(3) and _exit(2) before exec
        // apart from the error report.
        match unsafe { fork() }.map_err(ProcessError::Fork)? {
            ForkResult::Child => prepared.exec_child(background),
            ForkResult::Parent { child } => {
                tracing::debug!(pid = %child, program = command.program(), background, "spawned");
                if background {
                    self.detach(child, state)
                } else {
                    self.wait_foreground(child, state)
                }
            }
        }
    }

    fn wait_foreground(&self, child: Pid, state: &mut ShellState) -> Result<Launch, ProcessError> {
        loop {
            match waitpid(child, None) {
                Ok(status) => {
                    if let Some((_, status)) = terminal_status(status) {
                        self.report_siblings(state)?;
                        // Recorded last so `status` names the foreground job.
                        state.record(status);
                        return Ok(Launch::Foreground(status));
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ProcessError::Wait(e)),
            }
        }
    }

    fn report_siblings(&self, state: &mut ShellState) -> Result<(), ProcessError> {
        if !self.reap_siblings {
            return Ok(());
        }
        let reports = reap_finished(state)?;
        if reports.is_empty() {
            return Ok(());
        }

        let mut stdout = io::stdout().lock();
        for report in &reports {
            let _ = writeln!(stdout, "{}", report);
        }
        let _ = stdout.flush();
        Ok(())
    }

    fn detach(&self, child: Pid, state: &mut ShellState) -> Result<Launch, ProcessError> {
        let finished = match waitpid(child, Some(WaitPidFlag::WNOHANG)) {
            Ok(status) => terminal_status(status).map(|(_, status)| status),
            Err(e) => {
                tracing::warn!(pid = %child, error = %e, "non-blocking wait failed");
                None
            }
        };

        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "background pid is {}", child);
        if let Some(status) = finished {
            state.record(status);
            let _ = writeln!(stdout, "{}", BackgroundReport { pid: child, status });
        }
        let _ = stdout.flush();

        Ok(Launch::Background {
            pid: child,
            finished,
        })
    }
}
