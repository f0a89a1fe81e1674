//! Logging setup
//!
//! Binaries log through `env_logger`; `RUST_LOG` overrides the default level.

use env_logger::Env;

/// Setup logging with the specified default level
pub fn setup_logging(level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        setup_logging("debug");
        setup_logging("info");
        log::info!("logging initialized twice without panicking");
    }
}
