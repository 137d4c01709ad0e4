use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_WORD_LIST_DIR: &str = "/usr/share/reo";

/// Runtime settings shared by the resolver and the command backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReoConfig {
    pub home: PathBuf,
    pub custom_dir: PathBuf,
    pub word_list_dir: PathBuf,
    pub database: String,
    pub strategy: String,
    pub voice: String,
    pub timeout_ms: u64,
    pub dict_program: String,
    pub espeak_program: String,
    pub fortune_program: String,
    pub cowsay_program: String,
}

impl Default for ReoConfig {
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".reo");
        Self {
            custom_dir: home.join("cdef"),
            home,
            word_list_dir: PathBuf::from(DEFAULT_WORD_LIST_DIR),
            database: "wn".to_string(),
            strategy: "lev".to_string(),
            voice: "en-uk-rp".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            dict_program: "dict".to_string(),
            espeak_program: "espeak".to_string(),
            fortune_program: "fortune".to_string(),
            cowsay_program: "cowsay".to_string(),
        }
    }
}

impl ReoConfig {
    /// Defaults overlaid with `REO_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    ///
    /// `REO_HOME` moves the custom definition directory along with it unless
    /// `REO_CUSTOM_DIR` is also given.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(home) = value("REO_HOME") {
            self.home = PathBuf::from(home);
            self.custom_dir = self.home.join("cdef");
        }
        if let Some(dir) = value("REO_CUSTOM_DIR") {
            self.custom_dir = PathBuf::from(dir);
        }
        if let Some(dir) = value("REO_WORDLIST_DIR") {
            self.word_list_dir = PathBuf::from(dir);
        }
        if let Some(database) = value("REO_DATABASE") {
            self.database = database;
        }
        if let Some(strategy) = value("REO_STRATEGY") {
            self.strategy = strategy;
        }
        if let Some(voice) = value("REO_VOICE") {
            self.voice = voice;
        }
        if let Some(raw) = value("REO_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.timeout_ms = ms,
                _ => warn!(value = %raw, "ignoring invalid REO_TIMEOUT_MS"),
            }
        }
        if let Some(program) = value("REO_DICT") {
            self.dict_program = program;
        }
        if let Some(program) = value("REO_ESPEAK") {
            self.espeak_program = program;
        }
        if let Some(program) = value("REO_FORTUNE") {
            self.fortune_program = program;
        }
        if let Some(program) = value("REO_COWSAY") {
            self.cowsay_program = program;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
