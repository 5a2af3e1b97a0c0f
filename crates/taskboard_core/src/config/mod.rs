use crate::board::BoardOptions;
use crate::error::AppError;
use crate::scheduler::DEFAULT_HIDE_DELAY_SECS;
use crate::storage::store_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKBOARD_CONFIG_PATH";

pub const MAX_HIDE_DELAY_SECS: u64 = i64::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub positive: &'static str,
    pub negative: &'static str,
    pub muted: &'static str,
    pub strike: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const PLAIN: Palette = Palette {
        positive: "",
        negative: "",
        muted: "",
        strike: "",
        reset: "",
    };

    pub fn is_plain(&self) -> bool {
        self.reset.is_empty()
    }

    pub fn positive(&self, text: &str) -> String {
        self.paint(self.positive, text)
    }

    pub fn negative(&self, text: &str) -> String {
        self.paint(self.negative, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    /// Dimmed and struck through; plain palettes fall back to `~~text~~`.
    pub fn struck(&self, text: &str) -> String {
        if self.is_plain() {
            format!("~~{text}~~")
        } else {
            format!("{}{}{}{}", self.muted, self.strike, text, self.reset)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", code, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match canonical_theme_name_option(theme) {
        Some(ref name) if name == "plain" => Palette::PLAIN,
        Some(ref name) if name == "noir" => Palette {
            positive: "\x1b[38;5;114m",
            negative: "\x1b[38;5;208m",
            muted: "\x1b[38;5;244m",
            strike: "\x1b[9m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "solarized" => Palette {
            positive: "\x1b[38;5;108m",
            negative: "\x1b[38;5;160m",
            muted: "\x1b[38;5;250m",
            strike: "\x1b[9m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            positive: "\x1b[32m",
            negative: "\x1b[31m",
            muted: "\x1b[2m",
            strike: "\x1b[9m",
            reset: "\x1b[0m",
        },
    }
}

fn canonical_theme_name_option(theme: Option<&str>) -> Option<String> {
    theme.and_then(canonical_theme_name)
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
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
        return Some("default".into());
    }

    match trimmed {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        "none" | "no_color" | "nocolor" | "monochrome" => Some("plain".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// Seconds between completing a task and hiding it.
    #[serde(default)]
    pub hide_delay_secs: Option<u64>,
    /// Update completed tasks where they stand instead of moving them last.
    #[serde(default)]
    pub keep_position_on_complete: Option<bool>,
}

impl Config {
    pub fn hide_delay_secs(&self) -> u64 {
        self.hide_delay_secs.unwrap_or(DEFAULT_HIDE_DELAY_SECS)
    }

    /// Fails when the delay does not fit in a signed count of seconds.
    pub fn hide_delay(&self) -> Result<time::Duration, AppError> {
        let seconds = self.hide_delay_secs();
        i64::try_from(seconds)
            .map(time::Duration::seconds)
            .map_err(|_| {
                AppError::invalid_input(format!(
                    "hide_delay_secs must be at most {MAX_HIDE_DELAY_SECS}, got {seconds}"
                ))
            })
    }

    pub fn board_options(&self) -> Result<BoardOptions, AppError> {
        Ok(BoardOptions {
            hide_delay: self.hide_delay()?,
            keep_position_on_complete: self.keep_position_on_complete.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub hide_delay_secs: Option<u64>,
    pub keep_position_on_complete: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(store_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config
        .hide_delay()
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    if let Some(delay) = overrides.hide_delay_secs {
        merged.hide_delay_secs = Some(delay);
    }

    if let Some(keep) = overrides.keep_position_on_complete {
        merged.keep_position_on_complete = Some(keep);
    }

    merged
}
