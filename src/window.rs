#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffer {
    List,
    Content,
}

impl Buffer {
    pub fn other(self) -> Self {
        match self {
            Buffer::List => Buffer::Content,
            Buffer::Content => Buffer::List,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Buffer::List => "*posts*",
            Buffer::Content => "*article*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    #[default]
    None,
    // side by side
    Horizontal,
    // stacked
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub list_visible: bool,
    pub content_visible: bool,
    pub active: Buffer,
}

impl Visibility {
    pub fn is_visible(&self, buffer: Buffer) -> bool {
        match buffer {
            Buffer::List => self.list_visible,
            Buffer::Content => self.content_visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowChange {
    Changed,
    Already(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    focused: Buffer,
    split: SplitMode,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            focused: Buffer::List,
            split: SplitMode::None,
        }
    }
}

impl WindowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Buffer {
        self.focused
    }

    pub fn split(&self) -> SplitMode {
        self.split
    }

    pub fn is_split(&self) -> bool {
        self.split != SplitMode::None
    }

    pub fn visibility(&self) -> Visibility {
        match self.split {
            SplitMode::None => Visibility {
                list_visible: self.focused == Buffer::List,
                content_visible: self.focused == Buffer::Content,
                active: self.focused,
            },
            SplitMode::Horizontal | SplitMode::Vertical => Visibility {
                list_visible: true,
                content_visible: true,
                active: self.focused,
            },
        }
    }

    pub fn split_window(&mut self, orientation: SplitMode) -> WindowChange {
        if orientation == SplitMode::None {
            return self.close_other();
        }
        if self.split == orientation {
            let label = match orientation {
                SplitMode::Horizontal => "side by side",
                _ => "stacked",
            };
            return WindowChange::Already(format!("Windows already split {label}"));
        }
        self.split = orientation;
        WindowChange::Changed
    }

    pub fn close_other(&mut self) -> WindowChange {
        if !self.is_split() {
            return WindowChange::Already("Only one window".to_string());
        }
        self.split = SplitMode::None;
        WindowChange::Changed
    }

    pub fn close_current(&mut self) -> WindowChange {
        if !self.is_split() {
            return WindowChange::Already(
                "Attempt to delete minibuffer or sole ordinary window".to_string(),
            );
        }
        self.focused = self.focused.other();
        self.split = SplitMode::None;
        WindowChange::Changed
    }

    pub fn focus(&mut self, buffer: Buffer) -> WindowChange {
        if self.focused == buffer {
            return WindowChange::Already(format!("Already in {}", buffer.name()));
        }
        self.focused = buffer;
        WindowChange::Changed
    }

    pub fn other_window(&mut self) -> WindowChange {
        self.focus(self.focused.other())
    }

    pub fn focus_direction(&mut self, direction: Direction) -> WindowChange {
        let target = match (self.split, direction) {
            (SplitMode::Horizontal, Direction::Left) => Some(Buffer::List),
            (SplitMode::Horizontal, Direction::Right) => Some(Buffer::Content),
            (SplitMode::Vertical, Direction::Up) => Some(Buffer::List),
            (SplitMode::Vertical, Direction::Down) => Some(Buffer::Content),
            _ => None,
        };
        match target {
            Some(buffer) => self.focus(buffer),
            None => WindowChange::Already("No window in that direction".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(state: &WindowState) {
        let vis = state.visibility();
        assert_eq!(vis.active, state.focused());
        match state.split() {
            SplitMode::None => {
                assert!(vis.is_visible(state.focused()));
                assert!(!vis.is_visible(state.focused().other()));
            }
            _ => {
                assert!(vis.list_visible && vis.content_visible);
            }
        }
    }

    #[test]
    fn starts_on_list_unsplit() {
        let state = WindowState::new();
        assert_eq!(state.focused(), Buffer::List);
        assert_eq!(state.split(), SplitMode::None);
        assert_invariant(&state);
    }

    #[test]
    fn invariant_holds_for_every_operation_sequence() {
        type Op = fn(&mut WindowState) -> WindowChange;
        let ops: [Op; 7] = [
            |s| s.split_window(SplitMode::Horizontal),
            |s| s.split_window(SplitMode::Vertical),
            |s| s.close_other(),
            |s| s.close_current(),
            |s| s.focus(Buffer::List),
            |s| s.focus(Buffer::Content),
            |s| s.other_window(),
        ];
        for a in ops.iter() {
            for b in ops.iter() {
                for c in ops.iter() {
                    let mut state = WindowState::new();
                    a(&mut state);
                    assert_invariant(&state);
                    b(&mut state);
                    assert_invariant(&state);
                    c(&mut state);
                    assert_invariant(&state);
                }
            }
        }
    }

    #[test]
    fn repeated_split_reports_already() {
        let mut state = WindowState::new();
        assert_eq!(state.split_window(SplitMode::Vertical), WindowChange::Changed);
        assert!(matches!(
            state.split_window(SplitMode::Vertical),
            WindowChange::Already(_)
        ));
        assert_eq!(state.split_window(SplitMode::Horizontal), WindowChange::Changed);
    }

    #[test]
    fn close_other_keeps_focused_buffer() {
        let mut state = WindowState::new();
        state.split_window(SplitMode::Horizontal);
        state.other_window();
        assert_eq!(state.close_other(), WindowChange::Changed);
        assert_eq!(state.focused(), Buffer::Content);
        assert!(state.visibility().content_visible);
        assert!(!state.visibility().list_visible);
        assert_eq!(
            state.close_other(),
            WindowChange::Already("Only one window".to_string())
        );
    }

    #[test]
    fn close_current_hands_focus_to_other() {
        let mut state = WindowState::new();
        state.split_window(SplitMode::Vertical);
        assert_eq!(state.close_current(), WindowChange::Changed);
        assert_eq!(state.focused(), Buffer::Content);
        assert!(!state.is_split());
    }

    #[test]
    fn directional_focus_follows_orientation() {
        let mut state = WindowState::new();
        state.split_window(SplitMode::Horizontal);
        assert_eq!(state.focus_direction(Direction::Right), WindowChange::Changed);
        assert_eq!(state.focused(), Buffer::Content);
        assert!(matches!(
            state.focus_direction(Direction::Down),
            WindowChange::Already(_)
        ));
        state.split_window(SplitMode::Vertical);
        assert_eq!(state.focus_direction(Direction::Up), WindowChange::Changed);
        assert_eq!(state.focused(), Buffer::List);
    }
}
