use crate::error::ShellError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: HashMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = HashMap::new();

        let table = [
            ("help", "-h", "--help", "Print this help message", false),
            ("version", "-v", "--version", "Show version information", false),
            ("debug", "-d", "--debug", "Enable debug logging on stderr", false),
            ("quiet", "-q", "--quiet", "Do not print the command prompt", false),
            ("prompt", "-p", "--prompt", "Use a custom prompt string", true),
        ];

        for (name, short, long, description, takes_value) in table {
            flags.insert(
                name.to_string(),
                Flag {
                    short: short.to_string(),
                    long: long.to_string(),
                    description: description.to_string(),
                    takes_value,
                    value: None,
                },
            );
        }

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            for flag in self.flags.values_mut() {
                if arg == &flag.short || arg == &flag.long {
                    if flag.takes_value {
                        if i + 1 < args.len() {
                            flag.value = Some(args[i + 1].clone());
                            i += 1;
                        } else {
                            return Err(ShellError::FlagError(format!(
                                "Flag {} requires a value",
                                arg
                            )));
                        }
                    } else {
                        flag.value = Some("true".to_string());
                    }
                    break;
                }
            }
            i += 1;
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: smallsh [OPTIONS]");
        println!("\nOptions:");
        let mut flags: Vec<&Flag> = self.flags.values().collect();
        flags.sort_by(|a, b| a.long.cmp(&b.long));
        for flag in flags {
            println!("  {}, {:<15} {}", flag.short, flag.long, flag.description);
        }
    }
}
