use std::time::{Duration, Instant};

use crate::mode::Scheme;
use crate::timer::Timer;
use crate::window::Buffer;

pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoKind {
    Info,
    Pending,
    Error,
}

#[derive(Debug, Clone)]
pub struct EchoArea {
    message: Option<(EchoKind, String)>,
    clear: Timer,
    clear_after: Duration,
}

impl Default for EchoArea {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

impl EchoArea {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            message: None,
            clear: Timer::new(),
            clear_after,
        }
    }

    pub fn show(&mut self, kind: EchoKind, text: impl Into<String>, now: Instant) {
        self.message = Some((kind, text.into()));
        self.clear.schedule(now, self.clear_after);
    }

    pub fn info(&mut self, text: impl Into<String>, now: Instant) {
        self.show(EchoKind::Info, text, now);
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.show(EchoKind::Error, text, now);
    }

    pub fn pending(&mut self, text: impl Into<String>) {
        self.message = Some((EchoKind::Pending, text.into()));
        self.clear.cancel();
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.clear.cancel();
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn kind(&self) -> Option<EchoKind> {
        self.message.as_ref().map(|(kind, _)| *kind)
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if self.clear.fire(now) {
            self.message = None;
            return true;
        }
        false
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.clear.deadline()
    }

    pub fn text(&self, focused: Buffer, scheme: Scheme) -> String {
        match self.message() {
            Some(text) => text.to_string(),
            None => hint(focused, scheme).to_string(),
        }
    }
}

pub fn hint(focused: Buffer, scheme: Scheme) -> &'static str {
    match (scheme, focused) {
        (Scheme::Emacs, Buffer::List) => "n/p to navigate, RET to open, ? for help",
        (Scheme::Emacs, Buffer::Content) => "n/p for next/prev article, q to go back, ? for help",
        (Scheme::Evil, Buffer::List) => "j/k to navigate, RET to open, ? for help",
        (Scheme::Evil, Buffer::Content) => "]/[ for next/prev article, q to go back, ? for help",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_reverts_to_hint_after_delay() {
        let now = Instant::now();
        let mut echo = EchoArea::default();
        echo.info("End of buffer", now);
        assert_eq!(echo.text(Buffer::List, Scheme::Emacs), "End of buffer");
        assert!(!echo.tick(now + Duration::from_secs(2)));
        assert!(echo.tick(now + DEFAULT_CLEAR_AFTER));
        assert_eq!(
            echo.text(Buffer::List, Scheme::Emacs),
            hint(Buffer::List, Scheme::Emacs)
        );
    }

    #[test]
    fn later_message_restarts_the_clock() {
        let now = Instant::now();
        let mut echo = EchoArea::default();
        echo.info("first", now);
        echo.info("second", now + Duration::from_secs(2));
        assert!(!echo.tick(now + DEFAULT_CLEAR_AFTER));
        assert_eq!(echo.message(), Some("second"));
    }

    #[test]
    fn pending_prefix_does_not_time_out() {
        let now = Instant::now();
        let mut echo = EchoArea::default();
        echo.info("old", now);
        echo.pending("C-x-");
        assert_eq!(echo.deadline(), None);
        assert!(!echo.tick(now + Duration::from_secs(60)));
        assert_eq!(echo.kind(), Some(EchoKind::Pending));
    }
}
