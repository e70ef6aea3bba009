use crate::flags::Flags;

pub const DEFAULT_PROMPT: &str = ": ";
/// Longest accepted line, counting the terminating newline.
pub const MAX_LINE_LEN: usize = 2048;
pub const MAX_ARGS: usize = 512;

#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub max_line_len: usize,
    pub max_args: usize,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_line_len: MAX_LINE_LEN,
            max_args: MAX_ARGS,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_flags(flags: &Flags) -> Self {
        let mut config = Self::default();

        if let Some(prompt) = flags.get_value("prompt") {
            config.prompt = prompt.clone();
        }
        // --quiet wins over --prompt
        if flags.is_set("quiet") {
            config.prompt.clear();
        }
        config.debug = flags.is_set("debug");

        config
    }
}
