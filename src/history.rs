#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    ListView,
    ArticleView(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: EntryKind,
    pub url: String,
    pub title: String,
}

impl HistoryEntry {
    pub fn index(&self) -> Option<usize> {
        match self.kind {
            EntryKind::ArticleView(index) => Some(index),
            EntryKind::ListView => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryBridge {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    enabled: bool,
    list_url: String,
    list_title: String,
}

impl HistoryBridge {
    pub fn new(enabled: bool, list_url: &str, list_title: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                kind: EntryKind::ListView,
                url: list_url.to_string(),
                title: list_title.to_string(),
            }],
            cursor: 0,
            enabled,
            list_url: list_url.to_string(),
            list_title: list_title.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.enabled && self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.enabled && self.cursor + 1 < self.entries.len()
    }

    pub fn commit_article_view(&mut self, index: usize, url: &str, title: &str) -> bool {
        self.push(HistoryEntry {
            kind: EntryKind::ArticleView(index),
            url: url.to_string(),
            title: title.to_string(),
        })
    }

    pub fn commit_list_view(&mut self) -> bool {
        let entry = HistoryEntry {
            kind: EntryKind::ListView,
            url: self.list_url.clone(),
            title: self.list_title.clone(),
        };
        self.push(entry)
    }

    fn push(&mut self, entry: HistoryEntry) -> bool {
        if !self.enabled {
            return false;
        }
        if self.current().is_some_and(|current| current.url == entry.url) {
            return false;
        }
        log::info!("history push {:?} {}", entry.kind, entry.url);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
        true
    }

    pub fn back(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.current().cloned()
    }

    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.current().cloned()
    }
}
