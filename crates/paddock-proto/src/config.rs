use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Put the output panel beside the tree instead of below it.
    #[serde(default)]
    pub horizontal_layout: bool,
    /// Extra entries offered under every playable item. Each command runs in
    /// order with `$url` and `$title` substituted.
    #[serde(default)]
    pub custom_playback_options: Vec<CustomPlaybackOption>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_preferred_language")]
    pub preferred_language: String,
    /// Maximum simultaneous catalog requests per tree build. 0 = unbounded.
    #[serde(default = "default_fanout_limit")]
    pub fanout_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Seconds between live-session checks while nothing is live. 0 disables
    /// rechecking after startup.
    #[serde(default = "default_live_retry_timeout")]
    pub retry_timeout_secs: u64,
}

/// User-configurable paths for downloads and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory `.m3u8` playlists are written to.
    #[serde(default = "platform::downloads_dir")]
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_save_logs")]
    pub save_logs: bool,
    #[serde(default = "platform::data_dir")]
    pub log_dir: PathBuf,
}

/// Display colors. Each value is a color name (`red`, `lightblue`), an
/// `#rrggbb` hex triplet or a 256-color index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background_color: String,
    pub border_color: String,
    /// Top-level entries: race weekends and archive categories.
    pub category_node_color: String,
    /// Seasons, events, sessions, year groups.
    pub folder_node_color: String,
    /// Playable episodes and feeds.
    pub item_node_color: String,
    /// Playback actions.
    pub action_node_color: String,
    pub loading_color: String,
    pub live_color: String,
    pub no_content_color: String,
    pub info_color: String,
    pub error_color: String,
    pub terminal_accent_color: String,
    pub terminal_text_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomPlaybackOption {
    pub title: String,
    /// Each inner list is one program invocation: binary followed by args.
    #[serde(default)]
    pub commands: Vec<Vec<String>>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_color: "#121212".to_string(),
            border_color: "#7864c8".to_string(),
            category_node_color: "#78a0dc".to_string(),
            folder_node_color: "#d2d2e1".to_string(),
            item_node_color: "#50c878".to_string(),
            action_node_color: "#ffb850".to_string(),
            loading_color: "#ffb850".to_string(),
            live_color: "#ff5050".to_string(),
            no_content_color: "#73738a".to_string(),
            info_color: "#50a0dc".to_string(),
            error_color: "#ff5f5f".to_string(),
            terminal_accent_color: "#7864c8".to_string(),
            terminal_text_color: "#d2d2e1".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            preferred_language: default_preferred_language(),
            fanout_limit: default_fanout_limit(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            retry_timeout_secs: default_live_retry_timeout(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: platform::downloads_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            save_logs: default_save_logs(),
            log_dir: platform::data_dir(),
        }
    }
}

fn default_base_url() -> String {
    crate::api::DEFAULT_BASE_URL.to_string()
}

fn default_preferred_language() -> String {
    "en".to_string()
}

fn default_fanout_limit() -> usize {
    16
}

fn default_live_retry_timeout() -> u64 {
    60
}

fn default_save_logs() -> bool {
    true
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Custom options that actually have something to run.
    pub fn runnable_playback_options(&self) -> impl Iterator<Item = &CustomPlaybackOption> {
        self.custom_playback_options
            .iter()
            .filter(|o| !o.commands.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            horizontal_layout: false,
            custom_playback_options: Vec::new(),
            network: NetworkConfig::default(),
            live: LiveConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}
