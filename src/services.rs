use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use url::Url;

pub const PREF_SCHEME: &str = "binding-scheme";
pub const PREF_THEME: &str = "theme";
pub const PREF_FONT_SIZE: &str = "font-size";

pub const FONT_SIZE_MIN: u16 = 80;
pub const FONT_SIZE_MAX: u16 = 150;
pub const FONT_SIZE_DEFAULT: u16 = 100;
const FONT_SIZE_STEP: i32 = 10;

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait Navigator {
    fn visit(&mut self, url: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Dark => "Modus Vivendi",
            Theme::Light => "Modus Operandi",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

pub trait Appearance {
    fn theme(&self) -> Theme;
    fn font_size(&self) -> u16;
    fn toggle_theme(&mut self) -> Theme;
    fn adjust_font(&mut self, delta: i32) -> u16;
    fn reset_font(&mut self) -> u16;
}

#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn visit(&mut self, url: &str) -> Result<()> {
        log::debug!("navigation to {url} ignored");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn visit(&mut self, url: &str) -> Result<()> {
        self.visits.lock().push(url.to_string());
        Ok(())
    }
}

pub struct BrowserNavigator {
    base: Option<Url>,
}

impl BrowserNavigator {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let base = match base_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(Url::parse(raw).with_context(|| format!("parse base url {raw}"))?),
            None => None,
        };
        Ok(Self { base })
    }

    pub fn resolve(&self, target: &str) -> Result<Url> {
        if let Ok(absolute) = Url::parse(target) {
            return Ok(absolute);
        }
        let base = self
            .base
            .as_ref()
            .with_context(|| format!("no site.base_url configured to open {target}"))?;
        base.join(target)
            .with_context(|| format!("resolve {target} against {base}"))
    }
}

impl Navigator for BrowserNavigator {
    fn visit(&mut self, url: &str) -> Result<()> {
        let resolved = self.resolve(url)?;
        log::info!("opening {resolved} in browser");
        webbrowser::open(resolved.as_str())
            .with_context(|| format!("open {resolved} in browser"))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedAppearance {
    pub theme: Theme,
    pub font_size: u16,
}

impl Default for FixedAppearance {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            font_size: FONT_SIZE_DEFAULT,
        }
    }
}

impl Appearance for FixedAppearance {
    fn theme(&self) -> Theme {
        self.theme
    }

    fn font_size(&self) -> u16 {
        self.font_size
    }

    fn toggle_theme(&mut self) -> Theme {
        self.theme
    }

    fn adjust_font(&mut self, _delta: i32) -> u16 {
        self.font_size
    }

    fn reset_font(&mut self) -> u16 {
        self.font_size
    }
}

pub struct StoredAppearance {
    prefs: Arc<dyn PreferenceStore>,
    theme: Theme,
    font_size: u16,
}

impl StoredAppearance {
    pub fn load(prefs: Arc<dyn PreferenceStore>, default_theme: Theme, default_font: u16) -> Self {
        let theme = match prefs.get(PREF_THEME) {
            Ok(value) => value.as_deref().and_then(Theme::parse).unwrap_or(default_theme),
            Err(err) => {
                log::warn!("reading theme preference failed: {err:#}");
                default_theme
            }
        };
        let font_size = match prefs.get(PREF_FONT_SIZE) {
            Ok(value) => value
                .and_then(|raw| raw.trim().parse::<u16>().ok())
                .filter(|size| (FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(size))
                .unwrap_or(default_font),
            Err(err) => {
                log::warn!("reading font-size preference failed: {err:#}");
                default_font
            }
        };
        Self {
            prefs,
            theme,
            font_size: font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX),
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.prefs.set(key, value) {
            log::warn!("persisting {key} failed: {err:#}");
        }
    }
}

impl Appearance for StoredAppearance {
    fn theme(&self) -> Theme {
        self.theme
    }

    fn font_size(&self) -> u16 {
        self.font_size
    }

    fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.persist(PREF_THEME, self.theme.as_str());
        self.theme
    }

    fn adjust_font(&mut self, delta: i32) -> u16 {
        let next = (self.font_size as i32 + delta * FONT_SIZE_STEP)
            .clamp(FONT_SIZE_MIN as i32, FONT_SIZE_MAX as i32);
        self.font_size = next as u16;
        self.persist(PREF_FONT_SIZE, &self.font_size.to_string());
        self.font_size
    }

    fn reset_font(&mut self) -> u16 {
        self.font_size = FONT_SIZE_DEFAULT;
        if let Err(err) = self.prefs.remove(PREF_FONT_SIZE) {
            log::warn!("clearing font-size failed: {err:#}");
        }
        self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_appearance_round_trips_through_prefs() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPrefs::new());
        let mut appearance = StoredAppearance::load(prefs.clone(), Theme::Dark, 100);
        assert_eq!(appearance.toggle_theme(), Theme::Light);
        assert_eq!(appearance.adjust_font(1), 110);

        let reloaded = StoredAppearance::load(prefs.clone(), Theme::Dark, 100);
        assert_eq!(reloaded.theme(), Theme::Light);
        assert_eq!(reloaded.font_size(), 110);
    }

    #[test]
    fn font_size_is_bounded() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPrefs::new());
        let mut appearance = StoredAppearance::load(prefs.clone(), Theme::Dark, 100);
        for _ in 0..10 {
            appearance.adjust_font(1);
        }
        assert_eq!(appearance.font_size(), FONT_SIZE_MAX);
        for _ in 0..20 {
            appearance.adjust_font(-1);
        }
        assert_eq!(appearance.font_size(), FONT_SIZE_MIN);
        assert_eq!(appearance.reset_font(), FONT_SIZE_DEFAULT);
        assert_eq!(prefs.get(PREF_FONT_SIZE).unwrap(), None);
    }

    #[test]
    fn out_of_range_saved_font_is_ignored() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPrefs::new());
        prefs.set(PREF_FONT_SIZE, "400").unwrap();
        let appearance = StoredAppearance::load(prefs, Theme::Dark, 100);
        assert_eq!(appearance.font_size(), 100);
    }

    #[test]
    fn browser_navigator_resolves_relative_urls() {
        let nav = BrowserNavigator::new(Some("https://blog.example/")).unwrap();
        assert_eq!(
            nav.resolve("/post/hello/").unwrap().as_str(),
            "https://blog.example/post/hello/"
        );
        assert_eq!(
            nav.resolve("https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
        let bare = BrowserNavigator::new(None).unwrap();
        assert!(bare.resolve("/post/").is_err());
    }
}
