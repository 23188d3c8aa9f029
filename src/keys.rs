use std::time::{Duration, Instant};

use crate::mode::Scheme;
use crate::timer::Timer;
use crate::window::{Buffer, Direction};

pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(1000);

// C-x and C-w are anchored: they wait for the next key however long it
// takes. g is unanchored and dropped silently after the chord timeout.
const G_SEQUENCES: &[(&str, Command)] = &[
    ("gg", Command::GoTop),
    ("gh", Command::GoHome),
    ("gp", Command::GoPosts),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    BackTab,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub mods: Modifiers,
    pub from_text_input: bool,
}

impl KeyInput {
    pub fn new(key: Key, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            from_text_input: false,
        }
    }

    pub fn key(key: Key) -> Self {
        Self::new(key, Modifiers::default())
    }

    pub fn char(c: char) -> Self {
        Self::key(Key::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(
            Key::Char(c),
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        )
    }

    pub fn alt(key: Key) -> Self {
        Self::new(
            key,
            Modifiers {
                alt: true,
                ..Modifiers::default()
            },
        )
    }

    pub fn shift(key: Key) -> Self {
        Self::new(
            key,
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        )
    }

    fn plain(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.mods.ctrl && !self.mods.alt => Some(c),
            _ => None,
        }
    }

    fn ctrl_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if self.mods.ctrl && !self.mods.alt => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }

    fn alt_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if self.mods.alt && !self.mods.ctrl => Some(c),
            _ => None,
        }
    }

    fn bare(&self) -> Option<Key> {
        (!self.mods.ctrl && !self.mods.alt).then_some(self.key)
    }

    fn is_cancel(&self) -> bool {
        self.ctrl_char() == Some('g') || self.bare() == Some(Key::Esc)
    }

    pub fn describe(&self) -> String {
        let mut out = String::new();
        if self.mods.ctrl {
            out.push_str("C-");
        }
        if self.mods.alt {
            out.push_str("M-");
        }
        let name = match self.key {
            Key::Char(' ') => "SPC".to_string(),
            Key::Char(c) => c.to_string(),
            Key::Enter => "RET".to_string(),
            Key::Esc => "ESC".to_string(),
            Key::Up => "<up>".to_string(),
            Key::Down => "<down>".to_string(),
            Key::Left => "<left>".to_string(),
            Key::Right => "<right>".to_string(),
            Key::PageUp => "<prior>".to_string(),
            Key::PageDown => "<next>".to_string(),
            Key::Home => "<home>".to_string(),
            Key::End => "<end>".to_string(),
            Key::Tab => "TAB".to_string(),
            Key::BackTab => "<backtab>".to_string(),
            Key::Backspace => "DEL".to_string(),
        };
        out.push_str(&name);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    CtrlX,
    CtrlW,
}

impl Prefix {
    pub fn label(self) -> &'static str {
        match self {
            Prefix::CtrlX => "C-x",
            Prefix::CtrlW => "C-w",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextItem,
    PrevItem,
    OpenSelected,
    FirstItem,
    LastItem,

    NextArticle,
    PrevArticle,
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    ContentTop,
    ContentBottom,
    BackToList,

    OtherWindow,
    SwitchToList,
    SplitStacked,
    SplitSideBySide,
    DeleteOtherWindows,
    DeleteWindow,
    KillContent,
    FocusDirection(Direction),

    GoTop,
    GoHome,
    GoPosts,

    ToggleHelp,
    KeyboardQuit,
    ToggleTheme,
    FontLarger,
    FontSmaller,
    FontReset,
    ToggleEvil,
    HistoryBack,
    HistoryForward,
    QuitApp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordState {
    Idle,
    Anchored(Prefix),
    Unanchored { keys: String, expiry: Timer },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pass,
    Swallow,
    Pending(String),
    Command(Command),
    Undefined(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub scheme: Scheme,
    pub focused: Buffer,
    pub help_open: bool,
}

#[derive(Debug, Clone)]
pub struct KeyInterpreter {
    state: ChordState,
    timeout: Duration,
}

impl Default for KeyInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_CHORD_TIMEOUT)
    }
}

impl KeyInterpreter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ChordState::Idle,
            timeout,
        }
    }

    pub fn state(&self) -> &ChordState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ChordState::Idle
    }

    pub fn reset(&mut self) {
        self.state = ChordState::Idle;
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if let ChordState::Unanchored { expiry, .. } = &mut self.state {
            if expiry.fire(now) {
                log::trace!("chord sequence expired");
                self.state = ChordState::Idle;
                return true;
            }
        }
        false
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            ChordState::Unanchored { expiry, .. } => expiry.deadline(),
            _ => None,
        }
    }

    pub fn feed(&mut self, input: KeyInput, ctx: KeyContext, now: Instant) -> Resolution {
        if input.from_text_input {
            return Resolution::Pass;
        }
        self.tick(now);

        if ctx.help_open {
            self.reset();
            return if input.is_cancel()
                || matches!(input.plain(), Some('q') | Some('?'))
            {
                Resolution::Command(Command::ToggleHelp)
            } else {
                Resolution::Swallow
            };
        }

        match std::mem::replace(&mut self.state, ChordState::Idle) {
            ChordState::Anchored(prefix) => return resolve_prefix(prefix, &input),
            ChordState::Unanchored { keys, expiry } => {
                return self.continue_sequence(keys, expiry, &input, now);
            }
            ChordState::Idle => {}
        }

        if input.plain() == Some('g') {
            return self.continue_sequence(String::new(), Timer::new(), &input, now);
        }

        match input.ctrl_char() {
            Some('x') => return self.open_prefix(Prefix::CtrlX),
            Some('w') if ctx.scheme == Scheme::Evil => return self.open_prefix(Prefix::CtrlW),
            _ => {}
        }

        buffer_binding(ctx.scheme, ctx.focused, &input)
            .or_else(|| global_binding(&input))
            .map_or(Resolution::Pass, Resolution::Command)
    }

    fn open_prefix(&mut self, prefix: Prefix) -> Resolution {
        self.state = ChordState::Anchored(prefix);
        Resolution::Pending(format!("{}-", prefix.label()))
    }

    fn continue_sequence(
        &mut self,
        mut keys: String,
        mut expiry: Timer,
        input: &KeyInput,
        now: Instant,
    ) -> Resolution {
        if input.is_cancel() {
            return Resolution::Cancelled;
        }
        let Some(c) = input.plain() else {
            return Resolution::Undefined(format!("{keys} {} is undefined", input.describe()));
        };
        keys.push(c);
        if let Some((_, command)) = G_SEQUENCES.iter().find(|(seq, _)| *seq == keys) {
            return Resolution::Command(*command);
        }
        if G_SEQUENCES.iter().any(|(seq, _)| seq.starts_with(keys.as_str())) {
            expiry.schedule(now, self.timeout);
            let echo = format!("{keys}-");
            self.state = ChordState::Unanchored { keys, expiry };
            return Resolution::Pending(echo);
        }
        let (head, _) = keys.split_at(keys.len() - c.len_utf8());
        Resolution::Undefined(format!("{head} {} is undefined", input.describe()))
    }
}

fn resolve_prefix(prefix: Prefix, input: &KeyInput) -> Resolution {
    if input.is_cancel() {
        return Resolution::Cancelled;
    }
    let command = match prefix {
        Prefix::CtrlX => ctrl_x_binding(input),
        Prefix::CtrlW => ctrl_w_binding(input),
    };
    match command {
        Some(command) => Resolution::Command(command),
        None => Resolution::Undefined(format!(
            "{} {} is undefined",
            prefix.label(),
            input.describe()
        )),
    }
}

fn ctrl_x_binding(input: &KeyInput) -> Option<Command> {
    if input.ctrl_char() == Some('c') {
        return Some(Command::QuitApp);
    }
    match input.plain()? {
        'o' => Some(Command::OtherWindow),
        'b' => Some(Command::SwitchToList),
        '2' => Some(Command::SplitStacked),
        '3' => Some(Command::SplitSideBySide),
        '1' => Some(Command::DeleteOtherWindows),
        '0' => Some(Command::DeleteWindow),
        'k' => Some(Command::KillContent),
        _ => None,
    }
}

fn ctrl_w_binding(input: &KeyInput) -> Option<Command> {
    if input.ctrl_char() == Some('w') {
        return Some(Command::OtherWindow);
    }
    match input.plain()? {
        's' => Some(Command::SplitStacked),
        'v' => Some(Command::SplitSideBySide),
        'w' => Some(Command::OtherWindow),
        'o' => Some(Command::DeleteOtherWindows),
        'q' | 'c' => Some(Command::DeleteWindow),
        'h' => Some(Command::FocusDirection(Direction::Left)),
        'j' => Some(Command::FocusDirection(Direction::Down)),
        'k' => Some(Command::FocusDirection(Direction::Up)),
        'l' => Some(Command::FocusDirection(Direction::Right)),
        _ => None,
    }
}

fn buffer_binding(scheme: Scheme, focused: Buffer, input: &KeyInput) -> Option<Command> {
    match (scheme, focused) {
        (Scheme::Emacs, Buffer::List) => emacs_list(input),
        (Scheme::Emacs, Buffer::Content) => emacs_content(input),
        (Scheme::Evil, Buffer::List) => evil_list(input),
        (Scheme::Evil, Buffer::Content) => evil_content(input),
    }
}

fn emacs_list(input: &KeyInput) -> Option<Command> {
    match (input.bare(), input.ctrl_char(), input.alt_char()) {
        (Some(Key::Char('n')), _, _) | (_, Some('n'), _) | (Some(Key::Down), _, _) => {
            Some(Command::NextItem)
        }
        (Some(Key::Char('p')), _, _) | (_, Some('p'), _) | (Some(Key::Up), _, _) => {
            Some(Command::PrevItem)
        }
        (Some(Key::Enter), _, _) | (Some(Key::Char('o')), _, _) | (Some(Key::Char(' ')), _, _) => {
            Some(Command::OpenSelected)
        }
        (Some(Key::Char('<')), _, _) | (_, _, Some('<')) | (Some(Key::Home), _, _) => {
            Some(Command::FirstItem)
        }
        (Some(Key::Char('>')), _, _) | (_, _, Some('>')) | (Some(Key::End), _, _) => {
            Some(Command::LastItem)
        }
        _ => None,
    }
}

fn emacs_content(input: &KeyInput) -> Option<Command> {
    match (input.bare(), input.ctrl_char(), input.alt_char()) {
        (Some(Key::Char('n')), _, _) => Some(Command::NextArticle),
        (Some(Key::Char('p')), _, _) => Some(Command::PrevArticle),
        (Some(Key::Down), _, _) => Some(Command::ScrollDown),
        (Some(Key::Up), _, _) => Some(Command::ScrollUp),
        (Some(Key::Char(' ')), _, _) if input.mods.shift => Some(Command::PageUp),
        (Some(Key::Char(' ')), _, _) | (_, Some('v'), _) | (Some(Key::PageDown), _, _) => {
            Some(Command::PageDown)
        }
        (_, _, Some('v')) | (Some(Key::PageUp), _, _) => Some(Command::PageUp),
        (Some(Key::Char('<')), _, _) | (_, _, Some('<')) | (Some(Key::Home), _, _) => {
            Some(Command::ContentTop)
        }
        (Some(Key::Char('>')), _, _) | (_, _, Some('>')) | (Some(Key::End), _, _) => {
            Some(Command::ContentBottom)
        }
        (Some(Key::Char('q')), _, _) => Some(Command::BackToList),
        _ => None,
    }
}

fn evil_list(input: &KeyInput) -> Option<Command> {
    match input.bare()? {
        Key::Char('j') | Key::Down => Some(Command::NextItem),
        Key::Char('k') | Key::Up => Some(Command::PrevItem),
        Key::Enter | Key::Char('l') | Key::Char('o') => Some(Command::OpenSelected),
        Key::Char('G') | Key::End => Some(Command::LastItem),
        Key::Home => Some(Command::FirstItem),
        _ => None,
    }
}

fn evil_content(input: &KeyInput) -> Option<Command> {
    match input.ctrl_char() {
        Some('d') => return Some(Command::HalfPageDown),
        Some('u') => return Some(Command::HalfPageUp),
        Some('f') => return Some(Command::PageDown),
        Some('b') => return Some(Command::PageUp),
        _ => {}
    }
    match input.bare()? {
        Key::Char('j') | Key::Down => Some(Command::ScrollDown),
        Key::Char('k') | Key::Up => Some(Command::ScrollUp),
        Key::Char(' ') | Key::PageDown => Some(Command::PageDown),
        Key::PageUp => Some(Command::PageUp),
        Key::Char(']') => Some(Command::NextArticle),
        Key::Char('[') => Some(Command::PrevArticle),
        Key::Char('G') | Key::End => Some(Command::ContentBottom),
        Key::Home => Some(Command::ContentTop),
        Key::Char('q') | Key::Char('h') => Some(Command::BackToList),
        _ => None,
    }
}

fn global_binding(input: &KeyInput) -> Option<Command> {
    match input.ctrl_char() {
        Some('g') => return Some(Command::KeyboardQuit),
        Some('z') => return Some(Command::ToggleEvil),
        Some('c') => return Some(Command::QuitApp),
        _ => {}
    }
    if input.mods.alt && !input.mods.ctrl {
        return match input.key {
            Key::Left => Some(Command::HistoryBack),
            Key::Right => Some(Command::HistoryForward),
            _ => None,
        };
    }
    match input.plain()? {
        '?' => Some(Command::ToggleHelp),
        't' => Some(Command::ToggleTheme),
        '+' | '=' => Some(Command::FontLarger),
        '-' => Some(Command::FontSmaller),
        '0' => Some(Command::FontReset),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(scheme: Scheme, focused: Buffer) -> KeyContext {
        KeyContext {
            scheme,
            focused,
            help_open: false,
        }
    }

    fn emacs_list_ctx() -> KeyContext {
        ctx(Scheme::Emacs, Buffer::List)
    }

    #[test]
    fn anchored_prefix_never_expires() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        assert_eq!(
            keys.feed(KeyInput::ctrl('x'), emacs_list_ctx(), now),
            Resolution::Pending("C-x-".to_string())
        );
        assert_eq!(keys.deadline(), None);
        let much_later = now + Duration::from_secs(3600);
        assert!(!keys.tick(much_later));
        assert_eq!(
            keys.feed(KeyInput::char('o'), emacs_list_ctx(), much_later),
            Resolution::Command(Command::OtherWindow)
        );
        assert!(keys.is_idle());
    }

    #[test]
    fn unanchored_prefix_expires_silently() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        assert_eq!(
            keys.feed(KeyInput::char('g'), emacs_list_ctx(), now),
            Resolution::Pending("g-".to_string())
        );
        assert_eq!(keys.deadline(), Some(now + DEFAULT_CHORD_TIMEOUT));
        assert!(keys.tick(now + DEFAULT_CHORD_TIMEOUT));
        assert!(keys.is_idle());
        // A second g after expiry starts over instead of completing gg.
        assert_eq!(
            keys.feed(KeyInput::char('g'), emacs_list_ctx(), now + DEFAULT_CHORD_TIMEOUT),
            Resolution::Pending("g-".to_string())
        );
    }

    #[test]
    fn g_sequences_complete_within_timeout() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        keys.feed(KeyInput::char('g'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(
                KeyInput::char('h'),
                emacs_list_ctx(),
                now + Duration::from_millis(900)
            ),
            Resolution::Command(Command::GoHome)
        );
        keys.feed(KeyInput::char('g'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(KeyInput::char('g'), emacs_list_ctx(), now),
            Resolution::Command(Command::GoTop)
        );
    }

    #[test]
    fn unknown_continuations_are_reported() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        keys.feed(KeyInput::char('g'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(KeyInput::char('x'), emacs_list_ctx(), now),
            Resolution::Undefined("g x is undefined".to_string())
        );
        keys.feed(KeyInput::ctrl('x'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(KeyInput::char('z'), emacs_list_ctx(), now),
            Resolution::Undefined("C-x z is undefined".to_string())
        );
        assert!(keys.is_idle());
    }

    #[test]
    fn cancel_keys_drop_pending_prefixes() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        keys.feed(KeyInput::ctrl('x'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(KeyInput::ctrl('g'), emacs_list_ctx(), now),
            Resolution::Cancelled
        );
        keys.feed(KeyInput::char('g'), emacs_list_ctx(), now);
        assert_eq!(
            keys.feed(KeyInput::key(Key::Esc), emacs_list_ctx(), now),
            Resolution::Cancelled
        );
        assert_eq!(
            keys.feed(KeyInput::ctrl('g'), emacs_list_ctx(), now),
            Resolution::Command(Command::KeyboardQuit)
        );
    }

    #[test]
    fn ctrl_w_prefix_is_evil_only() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        assert_eq!(
            keys.feed(KeyInput::ctrl('w'), emacs_list_ctx(), now),
            Resolution::Pass
        );
        let evil = ctx(Scheme::Evil, Buffer::List);
        assert_eq!(
            keys.feed(KeyInput::ctrl('w'), evil, now),
            Resolution::Pending("C-w-".to_string())
        );
        assert_eq!(
            keys.feed(KeyInput::char('l'), evil, now),
            Resolution::Command(Command::FocusDirection(Direction::Right))
        );
    }

    #[test]
    fn text_input_is_never_interpreted() {
        let mut keys = KeyInterpreter::default();
        let mut input = KeyInput::char('n');
        input.from_text_input = true;
        assert_eq!(
            keys.feed(input, emacs_list_ctx(), Instant::now()),
            Resolution::Pass
        );
    }

    #[test]
    fn help_overlay_swallows_everything_but_close_keys() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        let help = KeyContext {
            help_open: true,
            ..emacs_list_ctx()
        };
        assert_eq!(keys.feed(KeyInput::char('n'), help, now), Resolution::Swallow);
        assert_eq!(
            keys.feed(KeyInput::key(Key::Esc), help, now),
            Resolution::Command(Command::ToggleHelp)
        );
        assert_eq!(
            keys.feed(KeyInput::char('q'), help, now),
            Resolution::Command(Command::ToggleHelp)
        );
    }

    #[test]
    fn tables_depend_on_scheme_and_buffer() {
        let now = Instant::now();
        let mut keys = KeyInterpreter::default();
        let cases = [
            (Scheme::Emacs, Buffer::List, KeyInput::char('n'), Command::NextItem),
            (Scheme::Emacs, Buffer::List, KeyInput::ctrl('p'), Command::PrevItem),
            (Scheme::Emacs, Buffer::List, KeyInput::alt(Key::Char('>')), Command::LastItem),
            (Scheme::Emacs, Buffer::Content, KeyInput::char('n'), Command::NextArticle),
            (Scheme::Emacs, Buffer::Content, KeyInput::ctrl('v'), Command::PageDown),
            (Scheme::Emacs, Buffer::Content, KeyInput::shift(Key::Char(' ')), Command::PageUp),
            (Scheme::Evil, Buffer::List, KeyInput::char('j'), Command::NextItem),
            (Scheme::Evil, Buffer::List, KeyInput::char('G'), Command::LastItem),
            (Scheme::Evil, Buffer::Content, KeyInput::ctrl('d'), Command::HalfPageDown),
            (Scheme::Evil, Buffer::Content, KeyInput::char(']'), Command::NextArticle),
            (Scheme::Evil, Buffer::Content, KeyInput::char('t'), Command::ToggleTheme),
            (Scheme::Evil, Buffer::List, KeyInput::alt(Key::Left), Command::HistoryBack),
        ];
        for (scheme, focused, input, expected) in cases {
            assert_eq!(
                keys.feed(input, ctx(scheme, focused), now),
                Resolution::Command(expected),
                "{scheme:?} {focused:?} {}",
                input.describe()
            );
        }
        assert_eq!(
            keys.feed(KeyInput::char('j'), emacs_list_ctx(), now),
            Resolution::Pass
        );
    }
}
