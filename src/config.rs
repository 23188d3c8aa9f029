use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::mode::Scheme;
use crate::services::{Theme, FONT_SIZE_DEFAULT, FONT_SIZE_MAX, FONT_SIZE_MIN};

const DEFAULT_ENV_PREFIX: &str = "EBLOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default)]
    pub posts: Option<PathBuf>,
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_list_url")]
    pub list_url: String,
    #[serde(default = "default_posts_url")]
    pub posts_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts: None,
            base_url: String::new(),
            list_url: default_list_url(),
            posts_url: default_posts_url(),
        }
    }
}

fn default_list_url() -> String {
    "/".into()
}

fn default_posts_url() -> String {
    "/post/".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeysConfig {
    #[serde(default = "default_chord_timeout", with = "humantime_serde")]
    pub chord_timeout: Duration,
    #[serde(default = "default_echo_timeout", with = "humantime_serde")]
    pub echo_timeout: Duration,
    #[serde(default = "default_scroll_suppression", with = "humantime_serde")]
    pub scroll_suppression: Duration,
    #[serde(default)]
    pub scheme: Scheme,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            chord_timeout: default_chord_timeout(),
            echo_timeout: default_echo_timeout(),
            scroll_suppression: default_scroll_suppression(),
            scheme: Scheme::default(),
        }
    }
}

fn default_chord_timeout() -> Duration {
    Duration::from_millis(1000)
}

fn default_echo_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_scroll_suppression() -> Duration {
    Duration::from_millis(150)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_font_size")]
    pub font_size: u16,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            font_size: default_font_size(),
        }
    }
}

impl UIConfig {
    pub fn theme(&self) -> Theme {
        Theme::parse(&self.theme).unwrap_or_else(|| {
            log::warn!("unknown theme {:?}, using dark", self.theme);
            Theme::Dark
        })
    }

    pub fn font_size(&self) -> u16 {
        self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
    }
}

fn default_theme() -> String {
    Theme::Dark.as_str().into()
}

fn default_font_size() -> u16 {
    FONT_SIZE_DEFAULT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_config(cfg, load_env(prefix)?);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    let defaults = Config::default();

    if other.site.posts.is_some() {
        base.site.posts = other.site.posts;
    }
    if !other.site.base_url.is_empty() {
        base.site.base_url = other.site.base_url;
    }
    if other.site.list_url != defaults.site.list_url {
        base.site.list_url = other.site.list_url;
    }
    if other.site.posts_url != defaults.site.posts_url {
        base.site.posts_url = other.site.posts_url;
    }

    if other.keys.chord_timeout != defaults.keys.chord_timeout {
        base.keys.chord_timeout = other.keys.chord_timeout;
    }
    if other.keys.echo_timeout != defaults.keys.echo_timeout {
        base.keys.echo_timeout = other.keys.echo_timeout;
    }
    if other.keys.scroll_suppression != defaults.keys.scroll_suppression {
        base.keys.scroll_suppression = other.keys.scroll_suppression;
    }
    if other.keys.scheme != defaults.keys.scheme {
        base.keys.scheme = other.keys.scheme;
    }

    if other.ui.theme != defaults.ui.theme && !other.ui.theme.is_empty() {
        base.ui.theme = other.ui.theme;
    }
    if other.ui.font_size != defaults.ui.font_size {
        base.ui.font_size = other.ui.font_size;
    }

    if other.log.level != defaults.log.level && !other.log.level.is_empty() {
        base.log.level = other.log.level;
    }
    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }

    base
}

fn load_env(prefix: &str) -> Result<Config> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    if map.is_empty() {
        return Ok(Config::default());
    }

    let mut cfg = Config::default();

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    Ok(cfg)
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "site.posts" => cfg.site.posts = Some(PathBuf::from(value)),
        "site.base_url" => cfg.site.base_url = value,
        "site.list_url" => cfg.site.list_url = value,
        "site.posts_url" => cfg.site.posts_url = value,
        "keys.chord_timeout" => set_duration(&mut cfg.keys.chord_timeout, key, &value),
        "keys.echo_timeout" => set_duration(&mut cfg.keys.echo_timeout, key, &value),
        "keys.scroll_suppression" => {
            set_duration(&mut cfg.keys.scroll_suppression, key, &value)
        }
        "keys.scheme" => {
            if let Some(scheme) = Scheme::parse(&value) {
                cfg.keys.scheme = scheme;
            }
        }
        "ui.theme" => cfg.ui.theme = value,
        "ui.font_size" => {
            if let Ok(parsed) = value.parse::<u16>() {
                cfg.ui.font_size = parsed;
            }
        }
        "log.level" => cfg.log.level = value,
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

fn set_duration(slot: &mut Duration, key: &str, value: &str) {
    match humantime::parse_duration(value) {
        Ok(duration) => *slot = duration,
        Err(err) => log::warn!("ignoring {key}={value}: {err}"),
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eblog").join("config.yaml"))
}
