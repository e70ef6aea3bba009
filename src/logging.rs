use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

pub const LOG_ENV: &str = "SMALLSH_LOG";

fn filter_for(config: &Config) -> EnvFilter {
    if config.debug {
        return EnvFilter::new("smallsh=debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber. Diagnostics go to stderr only.
pub fn init(config: &Config) {
    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter_for(config))
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        let config = Config::default();
        init(&config);
        init(&config);

        assert!(tracing::dispatcher::has_been_set());
    }
}
