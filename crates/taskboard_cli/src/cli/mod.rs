use clap::{ArgAction, Parser, Subcommand};
use taskboard_core::config::{ConfigOverrides, MAX_HIDE_DELAY_SECS};
use taskboard_core::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "taskboard", author, version, about = "A single-board task tracker", long_about = None)]
pub struct Cli {
    /// Run one command; without one an interactive session starts
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskboard add Buy milk
    /// Without a name the pending input is added, even when empty.
    Add {
        #[arg(num_args = 0..)]
        name: Vec<String>,
    },
    /// Set the pending input for the next task (interactive session only)
    ///
    /// Example: type Buy milk
    Type {
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: taskboard complete task-1
    /// Example: taskboard complete 1
    Complete { id: String },
    /// Show the board
    ///
    /// Example: taskboard list
    List,
    /// Show totals and percentages
    ///
    /// Example: taskboard stats
    Stats,
}

/// `None` when no words were given, so the caller can fall back to the
/// pending input.
pub fn join_words(words: &[String]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    HideDelaySecs(u64),
    KeepPositionOnComplete(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "theme" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::Theme,
            value,
        }),
        "hide_delay_secs" | "hide_delay" => {
            let seconds = value
                .parse::<u64>()
                .map_err(|_| format!("hide_delay_secs must be a whole number, got '{value}'"))?;
            if seconds > MAX_HIDE_DELAY_SECS {
                return Err(format!(
                    "hide_delay_secs must be at most {MAX_HIDE_DELAY_SECS}, got {seconds}"
                ));
            }
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::HideDelaySecs(seconds),
                value,
            })
        }
        "keep_position_on_complete" | "keep_position" => {
            let keep = parse_flag(&value)
                .ok_or_else(|| format!("keep_position_on_complete must be true or false, got '{value}'"))?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::KeepPositionOnComplete(keep),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` value into one set of overrides; later
/// values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::HideDelaySecs(seconds) => {
                overrides.hide_delay_secs = Some(seconds)
            }
            ConfigOverrideTarget::KeepPositionOnComplete(keep) => {
                overrides.keep_position_on_complete = Some(keep)
            }
        }
    }
    Ok(overrides)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
