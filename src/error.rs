use crate::process::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Flag error: {0}")]
    FlagError(String),
    #[error("Process error: {0}")]
    ProcessError(#[from] ProcessError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            ShellError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
            ShellError::FlagError("Flag -p requires a value".to_string()),
            ShellError::ProcessError(ProcessError::InvalidArgument("a\0b".to_string())),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
