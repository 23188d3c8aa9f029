use crate::data::Site;

pub const TITLE_LIMIT: usize = 50;
const PAGE_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { index: usize, title: String },
    Navigate(String),
    Missing,
}

#[derive(Debug, Clone, Default)]
pub struct ContentBuffer {
    index: Option<usize>,
    title: String,
    full_title: String,
    body: String,
    scroll: usize,
    total_lines: usize,
    viewport: usize,
    revision: u64,
}

impl ContentBuffer {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn full_title(&self) -> &str {
        &self.full_title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_metrics(&mut self, total_lines: usize, viewport: usize) {
        self.total_lines = total_lines;
        self.viewport = viewport;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport)
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let target = (self.scroll as i64 + delta).max(0) as usize;
        self.scroll = target.min(self.max_scroll());
    }

    pub fn page(&mut self, forward: bool) {
        let amount = ((self.viewport as f64 * PAGE_FRACTION).round() as i64).max(1);
        self.scroll_by(if forward { amount } else { -amount });
    }

    pub fn half_page(&mut self, forward: bool) {
        let amount = (self.viewport as i64 / 2).max(1);
        self.scroll_by(if forward { amount } else { -amount });
    }

    pub fn to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn position_label(&self) -> String {
        let scrollable = self.max_scroll();
        if scrollable == 0 {
            "All".to_string()
        } else if self.scroll == 0 {
            "Top".to_string()
        } else if self.scroll + 1 >= scrollable {
            "Bot".to_string()
        } else {
            let pct = (self.scroll as f64 / scrollable as f64 * 100.0).round();
            format!("{}%", pct as u32)
        }
    }

    pub fn line_number(&self) -> usize {
        self.scroll + 1
    }

    fn replace(&mut self, index: usize, title: &str, body: &str) {
        self.index = Some(index);
        self.full_title = title.to_string();
        self.title = truncate_title(title);
        self.body = body.to_string();
        self.scroll = 0;
        self.total_lines = 0;
        self.revision = self.revision.wrapping_add(1);
    }
}

pub fn truncate_title(title: &str) -> String {
    title.chars().take(TITLE_LIMIT).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ContentLoader {
    buffer: ContentBuffer,
}

impl ContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &ContentBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ContentBuffer {
        &mut self.buffer
    }

    pub fn resolve(&mut self, site: &Site, index: usize) -> LoadOutcome {
        let Some(item) = site.item(index) else {
            return LoadOutcome::Missing;
        };
        match site.article(index) {
            Some(article) => {
                if self.buffer.index != Some(index) || self.buffer.revision == 0 {
                    self.buffer.replace(index, &item.title, &article.body);
                } else {
                    self.buffer.to_top();
                }
                LoadOutcome::Rendered {
                    index,
                    title: item.title.clone(),
                }
            }
            None => LoadOutcome::Navigate(item.url.clone()),
        }
    }
}
