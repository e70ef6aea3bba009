use std::io;
use std::os::unix::io::RawFd;

const READ_CHUNK: usize = 4096;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadEvent {
    /// A complete line, without its newline.
    Line(String),
    /// The event descriptor became readable; nothing was consumed from it.
    Signal,
    Eof,
}

/// Newline-framed reader over a raw descriptor that can also wake up on a
/// second descriptor (the SIGCHLD self-pipe) while it waits for input.
#[derive(Debug)]
pub struct LineReader {
    fd: RawFd,
    max_line_len: usize,
    pending: Vec<u8>,
    // Set while the bytes of an over-long line are being thrown away.
    discarding: bool,
    eof: bool,
}

impl LineReader {
    pub fn new(fd: RawFd, max_line_len: usize) -> Self {
        Self {
            fd,
            max_line_len: max_line_len.max(2),
            pending: Vec::new(),
            discarding: false,
            eof: false,
        }
    }

    pub fn stdin(max_line_len: usize) -> Self {
        Self::new(libc::STDIN_FILENO, max_line_len)
    }

    fn limit(&self) -> usize {
        self.max_line_len - 1
    }

    fn take_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        line.truncate(self.limit());
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn absorb(&mut self, bytes: &[u8]) {
        let mut bytes = bytes;
        if self.discarding {
            match bytes.iter().position(|&b| b == b'\n') {
                Some(newline) => {
                    self.discarding = false;
                    bytes = &bytes[newline + 1..];
                }
                None => return,
            }
        }
        self.pending.extend_from_slice(bytes);

        // An unterminated line that already hit the limit keeps its head
        // and drops everything up to the next newline.
        if !self.pending.contains(&b'\n') && self.pending.len() > self.limit() {
            self.pending.truncate(self.limit());
            self.pending.push(b'\n');
            self.discarding = true;
        }
    }

    fn wait_readable(&self, event_fd: Option<RawFd>) -> io::Result<(bool, bool)> {
        let mut fds = [
            libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: event_fd.unwrap_or(-1),
                events: libc::POLLIN,
                revents: 0,
            },
        ];

        loop {
            let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
            if rc >= 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }

        let ready = libc::POLLIN | libc::POLLHUP | libc::POLLERR;
        Ok((fds[0].revents & ready != 0, fds[1].revents & ready != 0))
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut buf = [0u8; READ_CHUNK];
        let n = loop {
            let rc = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
            if rc >= 0 {
                break rc as usize;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        };

        if n == 0 {
            self.eof = true;
        } else {
            self.absorb(&buf[..n]);
        }
        Ok(())
    }

    /// Blocks until a full line is available, input ends, or `event_fd`
    /// becomes readable. Buffered lines are returned before any event.
    pub fn next_event(&mut self, event_fd: Option<RawFd>) -> io::Result<ReadEvent> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(ReadEvent::Line(line));
            }

            if self.eof {
                if self.pending.is_empty() || self.discarding {
                    self.pending.clear();
                    return Ok(ReadEvent::Eof);
                }
                // final line without a newline
                self.pending.push(b'\n');
                continue;
            }

            let (input_ready, event_ready) = self.wait_readable(event_fd)?;
            if event_ready {
                return Ok(ReadEvent::Signal);
            }
            if input_ready {
                self.fill()?;
            }
        }
    }
}
