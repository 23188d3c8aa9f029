use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::{self, Config};
use crate::controller::{Controller, ControllerOptions};
use crate::data;
use crate::mode::Scheme;
use crate::services::{BrowserNavigator, PreferenceStore, StoredAppearance};
use crate::storage;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub posts: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub evil: bool,
    pub log_file: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;

    init_logging(&cfg, options.log_file.as_ref());
    log::info!("eblog {} starting", crate::VERSION);

    let Some(posts) = options.posts.clone().or_else(|| cfg.site.posts.clone()) else {
        bail!("no posts given; pass a directory or index file, or set site.posts in the config");
    };
    let site = data::load_site(&posts)
        .with_context(|| format!("load posts from {}", posts.display()))?;
    log::info!("loaded {} articles from {}", site.items.len(), posts.display());

    let store = storage::Store::open(storage::Options::default()).context("open storage")?;
    let prefs: Arc<dyn PreferenceStore> = Arc::new(store);

    let navigator = BrowserNavigator::new(Some(cfg.site.base_url.as_str())).context("site base url")?;
    let appearance = StoredAppearance::load(prefs.clone(), cfg.ui.theme(), cfg.ui.font_size());

    let controller = Controller::new(site, controller_options(&cfg, options.evil), prefs)
        .with_navigator(Box::new(navigator))
        .with_appearance(Box::new(appearance));

    ui::Model::new(controller).run()
}

fn controller_options(cfg: &Config, evil: bool) -> ControllerOptions {
    ControllerOptions {
        list_url: cfg.site.list_url.clone(),
        posts_url: cfg.site.posts_url.clone(),
        chord_timeout: cfg.keys.chord_timeout,
        echo_timeout: cfg.keys.echo_timeout,
        scroll_suppression: cfg.keys.scroll_suppression,
        default_scheme: cfg.keys.scheme,
        scheme_override: evil.then_some(Scheme::Evil),
    }
}

fn init_logging(cfg: &Config, cli_path: Option<&PathBuf>) {
    let Some(path) = cli_path
        .cloned()
        .or_else(|| cfg.log.file.clone())
        .or_else(default_log_path)
    else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(cfg.log.level_filter(), log_config, log_file);
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("eblog").join("eblog.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn evil_flag_overrides_scheme_for_the_session() {
        let cfg = Config::default();
        let options = controller_options(&cfg, true);
        assert_eq!(options.scheme_override, Some(Scheme::Evil));
        assert_eq!(options.default_scheme, Scheme::Emacs);
        assert_eq!(options.chord_timeout, Duration::from_millis(1000));
        assert!(controller_options(&cfg, false).scheme_override.is_none());
    }
}
