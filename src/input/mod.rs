mod parser;
mod reader;

pub use parser::{expand_pid, LineParser, ParseError, ParsedCommand};
pub use reader::{LineReader, ReadEvent};
