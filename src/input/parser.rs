const PID_TOKEN: &str = "$$";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: expected a command before '{0}'")]
    MissingCommand(String),
    #[error("syntax error: expected a file name after '{0}'")]
    MissingRedirectTarget(String),
    #[error("too many arguments (limit is {0})")]
    TooManyArguments(usize),
}

/// One command line, owned for a single loop iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Program name followed by its arguments. Never empty once parsed.
    pub args: Vec<String>,
    pub input_file: Option<String>,
    pub output_file: Option<String>,
    pub background: bool,
}

impl ParsedCommand {
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Replaces every non-overlapping `$$`, scanning left to right, with `pid`.
pub fn expand_pid(line: &str, pid: &str) -> String {
    let count = line.matches(PID_TOKEN).count();
    if count == 0 {
        return line.to_string();
    }

    let mut expanded =
        String::with_capacity(line.len() + count * pid.len().saturating_sub(PID_TOKEN.len()));
    let mut rest = line;
    while let Some(pos) = rest.find(PID_TOKEN) {
        expanded.push_str(&rest[..pos]);
        expanded.push_str(pid);
        rest = &rest[pos + PID_TOKEN.len()..];
    }
    expanded.push_str(rest);
    expanded
}

fn is_operator(token: &str) -> bool {
    matches!(token, "<" | ">" | "&")
}

#[derive(Debug, Clone)]
pub struct LineParser {
    pid: String,
    max_args: usize,
}

impl LineParser {
    pub fn new(pid: u32, max_args: usize) -> Self {
        Self {
            pid: pid.to_string(),
            max_args,
        }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    fn is_skippable(line: &str) -> bool {
        let content = line.trim_start();
        content.trim_end().is_empty() || content.starts_with('#')
    }

    /// `Ok(None)` for blank lines and comments, which produce no command.
    pub fn parse(&self, line: &str) -> Result<Option<ParsedCommand>, ParseError> {
        if Self::is_skippable(line) {
            return Ok(None);
        }

        let expanded = expand_pid(line, &self.pid);
        let mut tokens = expanded.split(' ').filter(|t| !t.is_empty()).peekable();
        let mut command = ParsedCommand::default();

        while let Some(token) = tokens.next_if(|t| !is_operator(t)) {
            if command.args.len() == self.max_args {
                return Err(ParseError::TooManyArguments(self.max_args));
            }
            command.args.push(token.to_string());
        }

        if command.args.is_empty() {
            let op = tokens.peek().copied().unwrap_or_default();
            return Err(ParseError::MissingCommand(op.to_string()));
        }

        // Scanning goes on past `&` and file names, so `cmd & > out` still
        // redirects.
        while let Some(token) = tokens.next() {
            match token {
                "<" => {
                    let path = tokens
                        .next()
                        .ok_or_else(|| ParseError::MissingRedirectTarget(token.to_string()))?;
                    command.input_file = Some(path.to_string());
                }
                ">" => {
                    let path = tokens
                        .next()
                        .ok_or_else(|| ParseError::MissingRedirectTarget(token.to_string()))?;
                    command.output_file = Some(path.to_string());
                }
                "&" => command.background = true,
                _ => {}
            }
        }

        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LineParser {
        LineParser::new(4567, 512)
    }

    fn parse(line: &str) -> ParsedCommand {
        parser().parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_expand_pid_counts() {
        for n in 0..6 {
            let line = vec!["x$$"; n].join(" ");
            let expanded = expand_pid(&line, "4567");

            assert_eq!(expanded.matches("4567").count(), n);
            assert!(!expanded.contains("$$"));
            assert_eq!(expanded.len(), line.len() + n * 2);
        }
    }

    #[test]
    fn test_expand_pid_is_non_overlapping() {
        assert_eq!(expand_pid("$$$", "12"), "12$");
        assert_eq!(expand_pid("$$$$", "12"), "1212");
        assert_eq!(expand_pid("a$b", "12"), "a$b");
    }

    #[test]
    fn test_blank_and_comment_lines_skip() {
        let parser = parser();
        for line in ["", "   ", "\t ", "#", "# comment", "   # indented comment"] {
            assert_eq!(parser.parse(line), Ok(None), "line {:?}", line);
        }
    }

    #[test]
    fn test_pid_substitution_in_args() {
        let command = parse("echo hello $$");
        assert_eq!(command.args, vec!["echo", "hello", "4567"]);
        assert_eq!(command.input_file, None);
        assert_eq!(command.output_file, None);
        assert!(!command.background);
    }

    #[test]
    fn test_output_redirect_and_background() {
        let command = parse("ls > out.txt &");
        assert_eq!(command.args, vec!["ls"]);
        assert_eq!(command.output_file.as_deref(), Some("out.txt"));
        assert!(command.background);
    }

    #[test]
    fn test_both_redirections() {
        let command = parse("sort -r < in.txt > out.txt");
        assert_eq!(command.args, vec!["sort", "-r"]);
        assert_eq!(command.input_file.as_deref(), Some("in.txt"));
        assert_eq!(command.output_file.as_deref(), Some("out.txt"));
        assert!(!command.background);
    }

    #[test]
    fn test_scan_continues_after_ampersand() {
        let command = parse("sleep 5 & > log");
        assert_eq!(command.args, vec!["sleep", "5"]);
        assert_eq!(command.output_file.as_deref(), Some("log"));
        assert!(command.background);
    }

    #[test]
    fn test_ampersand_inside_word_is_literal() {
        let command = parse("echo a&b");
        assert_eq!(command.args, vec!["echo", "a&b"]);
        assert!(!command.background);
    }

    #[test]
    fn test_runs_of_spaces_collapse() {
        let command = parse("  echo   spaced    out  ");
        assert_eq!(command.args, vec!["echo", "spaced", "out"]);
    }

    #[test]
    fn test_missing_redirect_target() {
        assert_eq!(
            parser().parse("cat <"),
            Err(ParseError::MissingRedirectTarget("<".to_string()))
        );
        assert_eq!(
            parser().parse("ls >"),
            Err(ParseError::MissingRedirectTarget(">".to_string()))
        );
    }

    #[test]
    fn test_missing_command() {
        assert_eq!(
            parser().parse("> out.txt"),
            Err(ParseError::MissingCommand(">".to_string()))
        );
        assert_eq!(
            parser().parse("&"),
            Err(ParseError::MissingCommand("&".to_string()))
        );
    }

    #[test]
    fn test_argument_limit() {
        let parser = LineParser::new(1, 3);
        assert!(parser.parse("a b c").unwrap().is_some());
        assert_eq!(parser.parse("a b c d"), Err(ParseError::TooManyArguments(3)));
    }
}
