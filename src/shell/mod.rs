use std::io::{self, Write};

mod executor;

use crate::{
    config::Config,
    core::{commands::BuiltinDispatcher, ShellState},
    error::ShellError,
    input::{LineParser, LineReader, ReadEvent},
    process::{BackgroundReport, ProcessLauncher, SignalController},
};

use executor::CommandHandler;

pub struct Shell {
    pub(crate) config: Config,
    pub(crate) parser: LineParser,
    pub(crate) reader: LineReader,
    pub(crate) builtins: BuiltinDispatcher,
    pub(crate) launcher: ProcessLauncher,
    pub(crate) signals: SignalController,
    pub(crate) state: ShellState,
}

impl Shell {
    pub fn new(config: Config) -> Result<Self, ShellError> {
        let state = ShellState::new();
        let signals = SignalController::install(&state)?;

        Ok(Shell {
            parser: LineParser::new(std::process::id(), config.max_args),
            reader: LineReader::stdin(config.max_line_len),
            builtins: BuiltinDispatcher::new(),
            launcher: ProcessLauncher::new(),
            signals,
            state,
            config,
        })
    }

    /// Runs until `exit` or end of input.
    pub fn run(&mut self) -> Result<(), ShellError> {
        tracing::debug!(pid = self.parser.pid(), "interpreter started");

        loop {
            // Completions that landed during a foreground wait.
            self.signals.drain();
            self.report_background()?;

            self.show_prompt()?;
            let Some(line) = self.next_line()? else {
                tracing::debug!("end of input");
                return Ok(());
            };

            self.execute_line(&line)?;
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, ShellError> {
        loop {
            match self.reader.next_event(Some(self.signals.event_fd()))? {
                ReadEvent::Line(line) => return Ok(Some(line)),
                ReadEvent::Eof => return Ok(None),
                ReadEvent::Signal => {
                    self.signals.drain();
                    if self.report_background()? > 0 {
                        self.show_prompt()?;
                    }
                }
            }
        }
    }

    fn report_background(&mut self) -> Result<usize, ShellError> {
        let reports = self.signals.reap_background(&mut self.state)?;
        if reports.is_empty() {
            return Ok(0);
        }

        let mut stdout = io::stdout().lock();
        for report in &reports {
            Self::write_report(&mut stdout, report)?;
        }
        stdout.flush()?;
        Ok(reports.len())
    }

    fn write_report(out: &mut impl Write, report: &BackgroundReport) -> io::Result<()> {
        writeln!(out, "{}", report)
    }

    fn show_prompt(&self) -> io::Result<()> {
        if self.config.prompt.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", self.config.prompt)?;
        stdout.flush()
    }
}
