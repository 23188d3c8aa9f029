use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::content::{ContentBuffer, ContentLoader, LoadOutcome};
use crate::data::Site;
use crate::echo::{EchoArea, EchoKind, DEFAULT_CLEAR_AFTER};
use crate::history::{EntryKind, HistoryBridge, HistoryEntry};
use crate::keys::{Command, KeyContext, KeyInput, KeyInterpreter, Resolution, DEFAULT_CHORD_TIMEOUT};
use crate::mode::{ModeManager, Scheme};
use crate::scroll_sync::{uniform_extents, ScrollSync, DEFAULT_SUPPRESSION};
use crate::selection::{SelectionChange, SelectionModel, Step};
use crate::services::{
    Appearance, FixedAppearance, Navigator, NoopNavigator, PreferenceStore, Theme,
};
use crate::timer::earliest;
use crate::window::{Buffer, SplitMode, WindowChange, WindowState};

pub const LIST_ITEM_HEIGHT: usize = 2;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub list_url: String,
    pub posts_url: String,
    pub chord_timeout: Duration,
    pub echo_timeout: Duration,
    pub scroll_suppression: Duration,
    pub default_scheme: Scheme,
    pub scheme_override: Option<Scheme>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            list_url: "/".to_string(),
            posts_url: "/post/".to_string(),
            chord_timeout: DEFAULT_CHORD_TIMEOUT,
            echo_timeout: DEFAULT_CLEAR_AFTER,
            scroll_suppression: DEFAULT_SUPPRESSION,
            default_scheme: Scheme::Emacs,
            scheme_override: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    Quit,
}

pub struct Controller {
    site: Site,
    selection: SelectionModel,
    mode: ModeManager,
    windows: WindowState,
    content: ContentLoader,
    history: HistoryBridge,
    scroll_sync: ScrollSync,
    echo: EchoArea,
    keys: KeyInterpreter,
    help_open: bool,
    quit: bool,
    list_scroll: usize,
    list_viewport: usize,
    options: ControllerOptions,
    prefs: Arc<dyn PreferenceStore>,
    navigator: Box<dyn Navigator>,
    appearance: Box<dyn Appearance>,
}

impl Controller {
    pub fn new(site: Site, options: ControllerOptions, prefs: Arc<dyn PreferenceStore>) -> Self {
        let mut mode = ModeManager::init(prefs.as_ref(), options.default_scheme);
        if let Some(scheme) = options.scheme_override {
            mode.override_for_session(scheme);
        }
        let history = HistoryBridge::new(site.has_store(), &options.list_url, Buffer::List.name());
        let mut selection = SelectionModel::new(site.items.len());
        selection.set_index(0, false);
        log::info!(
            "controller ready: {} items, content store {}",
            site.items.len(),
            if site.has_store() { "present" } else { "absent" }
        );
        Self {
            site,
            selection,
            mode,
            windows: WindowState::new(),
            content: ContentLoader::new(),
            history,
            scroll_sync: ScrollSync::new(options.scroll_suppression),
            echo: EchoArea::new(options.echo_timeout),
            keys: KeyInterpreter::new(options.chord_timeout),
            help_open: false,
            quit: false,
            list_scroll: 0,
            list_viewport: 0,
            options,
            prefs,
            navigator: Box::new(NoopNavigator),
            appearance: Box::new(FixedAppearance::default()),
        }
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_appearance(mut self, appearance: Box<dyn Appearance>) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn windows(&self) -> &WindowState {
        &self.windows
    }

    pub fn content(&self) -> &ContentBuffer {
        self.content.buffer()
    }

    pub fn history(&self) -> &HistoryBridge {
        &self.history
    }

    pub fn scheme(&self) -> Scheme {
        self.mode.scheme()
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn theme(&self) -> Theme {
        self.appearance.theme()
    }

    pub fn font_size(&self) -> u16 {
        self.appearance.font_size()
    }

    pub fn echo_text(&self) -> String {
        self.echo.text(self.windows.focused(), self.mode.scheme())
    }

    pub fn echo_kind(&self) -> Option<EchoKind> {
        self.echo.kind()
    }

    pub fn list_scroll(&self) -> usize {
        self.list_scroll
    }

    pub fn set_list_viewport(&mut self, rows: usize) {
        self.list_viewport = rows;
        self.list_scroll = self.list_scroll.min(self.max_list_scroll());
    }

    pub fn set_content_metrics(&mut self, total_lines: usize, viewport: usize) {
        self.content.buffer_mut().set_metrics(total_lines, viewport);
    }

    pub fn handle_key(&mut self, input: KeyInput, now: Instant) -> KeyOutcome {
        let ctx = KeyContext {
            scheme: self.mode.scheme(),
            focused: self.windows.focused(),
            help_open: self.help_open,
        };
        match self.keys.feed(input, ctx, now) {
            Resolution::Pass => return KeyOutcome::Ignored,
            Resolution::Swallow => {}
            Resolution::Pending(text) => self.echo.pending(text),
            Resolution::Command(command) => {
                if self.echo.kind() == Some(EchoKind::Pending) {
                    self.echo.clear();
                }
                self.execute(command, now);
            }
            Resolution::Undefined(text) => {
                log::debug!("{text}");
                self.echo.info(text, now);
            }
            Resolution::Cancelled => self.echo.info("Quit", now),
        }
        if self.quit {
            KeyOutcome::Quit
        } else {
            KeyOutcome::Handled
        }
    }

    pub fn execute(&mut self, command: Command, now: Instant) {
        log::debug!("command {command:?}");
        match command {
            Command::NextItem => {
                let step = self.selection.next();
                self.apply_step(step, now);
            }
            Command::PrevItem => {
                let step = self.selection.prev();
                self.apply_step(step, now);
            }
            Command::OpenSelected => {
                if !self.selection.is_empty() {
                    self.load(self.selection.selected(), true, now);
                }
            }
            Command::FirstItem => self.select(0, true, now),
            Command::LastItem => {
                if let Some(last) = self.selection.last_index() {
                    self.select(last, true, now);
                }
            }
            Command::NextArticle => self.navigate_article(true, now),
            Command::PrevArticle => self.navigate_article(false, now),
            Command::ScrollDown => self.content.buffer_mut().scroll_by(1),
            Command::ScrollUp => self.content.buffer_mut().scroll_by(-1),
            Command::HalfPageDown => self.content.buffer_mut().half_page(true),
            Command::HalfPageUp => self.content.buffer_mut().half_page(false),
            Command::PageDown => self.content.buffer_mut().page(true),
            Command::PageUp => self.content.buffer_mut().page(false),
            Command::ContentTop => self.content.buffer_mut().to_top(),
            Command::ContentBottom => self.content.buffer_mut().to_bottom(),
            Command::BackToList => self.back_to_list(now),
            Command::OtherWindow => {
                let change = self.windows.other_window();
                self.report(change, now);
            }
            Command::SwitchToList => {
                let change = self.windows.focus(Buffer::List);
                self.report(change, now);
            }
            Command::SplitStacked => self.split(SplitMode::Vertical, now),
            Command::SplitSideBySide => self.split(SplitMode::Horizontal, now),
            Command::DeleteOtherWindows => {
                let change = self.windows.close_other();
                self.report(change, now);
            }
            Command::DeleteWindow => {
                let change = self.windows.close_current();
                self.report(change, now);
            }
            Command::KillContent => self.kill_content(now),
            Command::FocusDirection(direction) => {
                let change = self.windows.focus_direction(direction);
                self.report(change, now);
            }
            Command::GoTop => match self.windows.focused() {
                Buffer::List => self.select(0, true, now),
                Buffer::Content => self.content.buffer_mut().to_top(),
            },
            Command::GoHome => {
                let url = self.options.list_url.clone();
                self.visit(&url, now);
            }
            Command::GoPosts => {
                let url = self.options.posts_url.clone();
                self.visit(&url, now);
            }
            Command::ToggleHelp => self.help_open = !self.help_open,
            Command::KeyboardQuit => {
                self.help_open = false;
                self.keys.reset();
                self.echo.info("Quit", now);
            }
            Command::ToggleTheme => {
                let theme = self.appearance.toggle_theme();
                self.echo.info(format!("Theme: {}", theme.display_name()), now);
            }
            Command::FontLarger => {
                let size = self.appearance.adjust_font(1);
                self.echo.info(format!("Font size: {size}%"), now);
            }
            Command::FontSmaller => {
                let size = self.appearance.adjust_font(-1);
                self.echo.info(format!("Font size: {size}%"), now);
            }
            Command::FontReset => {
                let size = self.appearance.reset_font();
                log::debug!("font size reset to {size}%");
                self.echo.info("Font size reset", now);
            }
            Command::ToggleEvil => {
                let scheme = self.mode.toggle(self.prefs.as_ref());
                self.keys.reset();
                let state = if scheme == Scheme::Evil { "enabled" } else { "disabled" };
                log::info!("binding scheme now {}", scheme.as_str());
                self.echo.info(format!("Evil mode {state}"), now);
            }
            Command::HistoryBack => self.history_back(now),
            Command::HistoryForward => self.history_forward(now),
            Command::QuitApp => self.quit = true,
        }
    }

    pub fn click(&mut self, index: usize, now: Instant) {
        if index >= self.selection.count() {
            return;
        }
        if self.windows.focused() != Buffer::List {
            self.windows.focus(Buffer::List);
        }
        if self.selection.is_marked(index) {
            self.load(index, true, now);
        } else {
            self.select(index, false, now);
        }
    }

    pub fn double_click(&mut self, index: usize, now: Instant) {
        if index >= self.selection.count() {
            return;
        }
        self.select(index, false, now);
        self.load(index, true, now);
    }

    pub fn focus_window(&mut self, buffer: Buffer) {
        if self.windows.visibility().is_visible(buffer) {
            self.windows.focus(buffer);
        }
    }

    pub fn scroll_list(&mut self, delta: i64, now: Instant) {
        let target = (self.list_scroll as i64 + delta).max(0) as usize;
        self.list_scroll = target.min(self.max_list_scroll());
        self.list_scrolled(self.list_scroll, now);
    }

    pub fn list_scrolled(&mut self, scroll_top: usize, now: Instant) {
        let extents = uniform_extents(self.selection.count(), LIST_ITEM_HEIGHT);
        if let Some(index) =
            self.scroll_sync
                .on_scroll(scroll_top, &extents, self.selection.selected(), now)
        {
            self.select(index, false, now);
        }
    }

    pub fn scroll_content(&mut self, delta: i64) {
        self.content.buffer_mut().scroll_by(delta);
    }

    pub fn history_back(&mut self, now: Instant) {
        if !self.history.is_enabled() {
            self.leave_page(now);
            return;
        }
        match self.history.back() {
            Some(entry) => self.on_pop_state(Some(&entry), now),
            None => self.echo.info("Beginning of history", now),
        }
    }

    pub fn history_forward(&mut self, now: Instant) {
        if !self.history.is_enabled() {
            return;
        }
        match self.history.forward() {
            Some(entry) => self.on_pop_state(Some(&entry), now),
            None => self.echo.info("End of history", now),
        }
    }

    // Replay never records a new entry.
    pub fn on_pop_state(&mut self, entry: Option<&HistoryEntry>, now: Instant) {
        log::info!("history replay {:?}", entry.map(|entry| entry.kind));
        match entry.map(|entry| entry.kind) {
            Some(EntryKind::ArticleView(index)) => {
                if let Some(change) = self.selection.set_index(index, true) {
                    self.after_selection(change, false, now);
                }
                let index = self.selection.selected();
                if let LoadOutcome::Rendered { .. } = self.content.resolve(&self.site, index) {
                    self.windows.focus(Buffer::Content);
                    self.echo.clear();
                }
            }
            Some(EntryKind::ListView) | None => {
                self.windows.focus(Buffer::List);
                self.echo.clear();
            }
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.keys.tick(now) && self.echo.kind() == Some(EchoKind::Pending) {
            self.echo.clear();
            changed = true;
        }
        changed |= self.echo.tick(now);
        self.scroll_sync.tick(now);
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            earliest(self.keys.deadline(), self.echo.deadline()),
            self.scroll_sync.deadline(),
        )
    }

    fn apply_step(&mut self, step: Step, now: Instant) {
        match step {
            Step::Moved(change) => self.after_selection(change, true, now),
            Step::AtEnd => self.echo.info("End of buffer", now),
            Step::AtBeginning => self.echo.info("Beginning of buffer", now),
            Step::Empty => {}
        }
    }

    fn select(&mut self, index: usize, scroll: bool, now: Instant) {
        if let Some(change) = self.selection.set_index(index, scroll) {
            self.after_selection(change, true, now);
        }
    }

    fn after_selection(&mut self, change: SelectionChange, preview: bool, now: Instant) {
        if change.scroll {
            self.scroll_into_view(change.to, now);
        }
        if preview && self.windows.is_split() {
            self.load(change.to, false, now);
        }
    }

    fn scroll_into_view(&mut self, index: usize, now: Instant) {
        let top = index * LIST_ITEM_HEIGHT;
        let bottom = top + LIST_ITEM_HEIGHT;
        let before = self.list_scroll;
        if top < self.list_scroll {
            self.list_scroll = top;
        } else if self.list_viewport > 0 && bottom > self.list_scroll + self.list_viewport {
            self.list_scroll = bottom - self.list_viewport;
        }
        if self.list_scroll != before {
            self.scroll_sync.suppress(now);
        }
    }

    fn max_list_scroll(&self) -> usize {
        (self.selection.count() * LIST_ITEM_HEIGHT).saturating_sub(self.list_viewport)
    }

    fn load(&mut self, index: usize, commit: bool, now: Instant) {
        match self.content.resolve(&self.site, index) {
            LoadOutcome::Rendered { index, title } => {
                if !commit {
                    return;
                }
                self.windows.focus(Buffer::Content);
                let url = self
                    .site
                    .item(index)
                    .map(|item| item.url.clone())
                    .unwrap_or_default();
                self.history.commit_article_view(index, &url, &title);
                self.echo.info(format!("Switched to buffer: {title}"), now);
            }
            LoadOutcome::Navigate(url) => {
                if commit {
                    self.visit(&url, now);
                }
            }
            LoadOutcome::Missing => {}
        }
    }

    fn navigate_article(&mut self, forward: bool, now: Instant) {
        if self.selection.is_empty() {
            return;
        }
        let current = self.selection.selected();
        let target = if forward {
            Some(current + 1).filter(|next| *next < self.selection.count())
        } else {
            current.checked_sub(1)
        };
        let Some(target) = target else {
            let text = if forward { "End of buffer" } else { "Beginning of buffer" };
            self.echo.info(text, now);
            return;
        };
        if let Some(change) = self.selection.set_index(target, true) {
            self.after_selection(change, false, now);
        }
        if self.site.article(target).is_some() {
            self.load(target, true, now);
        }
    }

    fn back_to_list(&mut self, now: Instant) {
        if !self.site.has_store() {
            self.history_back(now);
            return;
        }
        self.windows.focus(Buffer::List);
        self.history.commit_list_view();
        self.echo
            .info(format!("Switched to buffer: {}", Buffer::List.name()), now);
    }

    fn kill_content(&mut self, now: Instant) {
        self.windows.focus(Buffer::List);
        self.windows.close_other();
        self.history.commit_list_view();
        self.echo
            .info(format!("Killed buffer {}", Buffer::Content.name()), now);
    }

    fn split(&mut self, orientation: SplitMode, now: Instant) {
        let change = self.windows.split_window(orientation);
        if change == WindowChange::Changed && !self.selection.is_empty() {
            self.load(self.selection.selected(), false, now);
        }
        self.report(change, now);
    }

    fn report(&mut self, change: WindowChange, now: Instant) {
        match change {
            WindowChange::Changed => self.echo.clear(),
            WindowChange::Already(text) => self.echo.info(text, now),
        }
    }

    fn leave_page(&mut self, now: Instant) {
        let url = self.options.list_url.clone();
        self.visit(&url, now);
    }

    fn visit(&mut self, url: &str, now: Instant) {
        if url == self.options.list_url {
            self.reset_to_list(now);
            return;
        }
        log::info!("navigating to {url}");
        if let Err(err) = self.navigator.visit(url) {
            log::warn!("navigation to {url} failed: {err:#}");
            self.echo.error(format!("Error: {err:#}"), now);
        }
    }

    fn reset_to_list(&mut self, now: Instant) {
        self.windows = WindowState::new();
        self.help_open = false;
        self.keys.reset();
        self.echo.clear();
        self.select(0, true, now);
        self.history.commit_list_view();
    }
}
