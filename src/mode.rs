use serde::{Deserialize, Serialize};

use crate::services::{PreferenceStore, PREF_SCHEME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Emacs,
    Evil,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Emacs => "emacs",
            Scheme::Evil => "evil",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "emacs" => Some(Scheme::Emacs),
            "evil" | "vim" => Some(Scheme::Evil),
            _ => None,
        }
    }

    pub fn lighter(self) -> &'static str {
        match self {
            Scheme::Emacs => "<E>",
            Scheme::Evil => "<N>",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModeManager {
    scheme: Scheme,
}

impl ModeManager {
    pub fn init(prefs: &dyn PreferenceStore, default: Scheme) -> Self {
        let scheme = match prefs.get(PREF_SCHEME) {
            Ok(Some(value)) => Scheme::parse(&value).unwrap_or(default),
            Ok(None) => default,
            Err(err) => {
                log::warn!("reading binding scheme failed: {err:#}");
                default
            }
        };
        log::debug!("binding scheme restored as {}", scheme.as_str());
        Self { scheme }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn is_evil(&self) -> bool {
        self.scheme == Scheme::Evil
    }

    pub fn override_for_session(&mut self, scheme: Scheme) {
        self.scheme = scheme;
    }

    pub fn toggle(&mut self, prefs: &dyn PreferenceStore) -> Scheme {
        self.scheme = match self.scheme {
            Scheme::Emacs => Scheme::Evil,
            Scheme::Evil => Scheme::Emacs,
        };
        if let Err(err) = prefs.set(PREF_SCHEME, self.scheme.as_str()) {
            log::warn!("persisting binding scheme failed: {err:#}");
        }
        self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryPrefs;

    #[test]
    fn defaults_when_nothing_saved() {
        let prefs = MemoryPrefs::new();
        assert_eq!(ModeManager::init(&prefs, Scheme::Emacs).scheme(), Scheme::Emacs);
        assert_eq!(ModeManager::init(&prefs, Scheme::Evil).scheme(), Scheme::Evil);
    }

    #[test]
    fn toggle_persists_choice() {
        let prefs = MemoryPrefs::new();
        let mut mode = ModeManager::init(&prefs, Scheme::Emacs);
        assert_eq!(mode.toggle(&prefs), Scheme::Evil);
        assert_eq!(prefs.get(PREF_SCHEME).unwrap().as_deref(), Some("evil"));
        assert!(ModeManager::init(&prefs, Scheme::Emacs).is_evil());
    }

    #[test]
    fn garbage_preference_falls_back() {
        let prefs = MemoryPrefs::new();
        prefs.set(PREF_SCHEME, "nano").unwrap();
        assert_eq!(ModeManager::init(&prefs, Scheme::Emacs).scheme(), Scheme::Emacs);
    }
}
