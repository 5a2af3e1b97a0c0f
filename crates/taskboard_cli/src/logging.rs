use std::io::IsTerminal;
use taskboard_core::error::AppError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKBOARD_LOG";

pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Directives from `TASKBOARD_LOG` win over `-v`; a malformed value is an
/// error rather than a silent fallback.
pub fn build_filter(directives: Option<&str>, verbose: u8) -> Result<EnvFilter, AppError> {
    match directives.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => EnvFilter::try_new(value).map_err(|err| {
            AppError::invalid_input(format!("invalid {LOG_ENV_VAR} filter '{value}': {err}"))
        }),
        None => Ok(EnvFilter::new(default_level(verbose))),
    }
}

/// Logs go to stderr so board output on stdout stays clean.
pub fn init_tracing(verbose: u8) -> Result<(), AppError> {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let env_filter = build_filter(directives.as_deref(), verbose)?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
