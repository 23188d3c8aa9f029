#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub from: Option<usize>,
    pub to: usize,
    pub scroll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(SelectionChange),
    AtEnd,
    AtBeginning,
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selected: usize,
    marked: Option<usize>,
    count: usize,
}

impl SelectionModel {
    pub fn new(count: usize) -> Self {
        Self {
            selected: 0,
            marked: None,
            count,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn marked(&self) -> Option<usize> {
        self.marked
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked == Some(index)
    }

    pub fn set_index(&mut self, index: usize, scroll: bool) -> Option<SelectionChange> {
        if self.count == 0 {
            return None;
        }
        let clamped = index.min(self.count - 1);
        if clamped == self.selected && self.marked == Some(clamped) {
            return None;
        }
        let from = self.marked;
        self.selected = clamped;
        self.marked = Some(clamped);
        Some(SelectionChange {
            from,
            to: clamped,
            scroll,
        })
    }

    pub fn next(&mut self) -> Step {
        if self.count == 0 {
            return Step::Empty;
        }
        if self.selected + 1 >= self.count {
            return Step::AtEnd;
        }
        match self.set_index(self.selected + 1, true) {
            Some(change) => Step::Moved(change),
            None => Step::AtEnd,
        }
    }

    pub fn prev(&mut self) -> Step {
        if self.count == 0 {
            return Step::Empty;
        }
        if self.selected == 0 {
            return Step::AtBeginning;
        }
        match self.set_index(self.selected - 1, true) {
            Some(change) => Step::Moved(change),
            None => Step::AtBeginning,
        }
    }

    pub fn last_index(&self) -> Option<usize> {
        self.count.checked_sub(1)
    }

    pub fn position_label(&self) -> String {
        if self.count == 0 {
            "Empty".to_string()
        } else if self.selected == 0 {
            "Top".to_string()
        } else if self.selected == self.count - 1 {
            "Bot".to_string()
        } else {
            let pct = (self.selected as f64 / (self.count - 1) as f64 * 100.0).round();
            format!("{}%", pct as u32)
        }
    }

    pub fn line_number(&self) -> usize {
        self.selected + 1
    }
}
