//! Configuration loading and parsing.
//!
//! Looks for `oxprompt.toml` in the working directory first, then in the
//! platform config directory (`<config_dir>/oxprompt/oxprompt.toml`). A
//! missing file yields defaults; so does a file that fails to parse, after a
//! `warn` on the `config` target.
//!
//! Every `[prompt]` key is optional: only keys present in the file override
//! what the program configured. Color values stay strings here and are
//! resolved by the prompt, which knows the palette slots.
//!
//! ```toml
//! [prompt]
//! prefix = ">>> "
//! max_suggestion = 8
//! key_bind_mode = "emacs"
//! reverse_search = true
//!
//! [colors]
//! prefix_text = "dark_green"
//! suggestion_bg = "#303030"
//!
//! [history]
//! entries = ["select 1", "show tables"]
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "oxprompt.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub prefix: Option<String>,
    pub title: Option<String>,
    pub max_suggestion: Option<u16>,
    pub key_bind_mode: Option<String>,
    pub completion_on_down: Option<bool>,
    pub show_completion_at_start: Option<bool>,
    pub word_separator: Option<String>,
    pub reverse_search: Option<bool>,
    pub auto_history: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub entries: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    pub prompt: PromptConfig,
    /// Palette slot name to color name.
    pub colors: BTreeMap<String, String>,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub path: Option<PathBuf>, // file the values came from, if any
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxprompt").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                colors = file.colors.len(),
                history = file.history.entries.len(),
                "config_loaded"
            );
            Ok(Config {
                path: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}
