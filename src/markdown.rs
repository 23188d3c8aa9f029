use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy)]
pub struct MarkdownStyle {
    pub heading: Color,
    pub subheading: Color,
    pub marker: Color,
    pub quote: Color,
    pub code: Color,
}

impl Default for MarkdownStyle {
    fn default() -> Self {
        Self {
            heading: Color::Yellow,
            subheading: Color::Magenta,
            marker: Color::Yellow,
            quote: Color::Green,
            code: Color::Cyan,
        }
    }
}

pub struct Renderer {
    width: usize,
    style: MarkdownStyle,
}

impl Renderer {
    pub fn new(width: usize, style: MarkdownStyle) -> Self {
        Self {
            width: width.max(8),
            style,
        }
    }

    pub fn render(&self, input: &str) -> Text<'static> {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_TASKLISTS);
        opts.insert(Options::ENABLE_FOOTNOTES);

        let parser = Parser::new_ext(input, opts);
        let mut writer = MarkdownWriter::default();
        writer.render(parser);
        writer.into_text(self.width, &self.style)
    }
}

#[derive(Default)]
struct MarkdownWriter {
    blocks: Vec<Block>,
    buffer: String,
    list_stack: Vec<ListState>,
    current_item: Option<ListMeta>,
    blockquote_depth: usize,
    heading_level: Option<u8>,
    code_block: Option<CodeMeta>,
    link_target: Option<String>,
}

#[derive(Clone, Copy)]
struct ListState {
    ordered: bool,
    index: usize,
}

#[derive(Clone)]
struct ListMeta {
    indent: usize,
    marker: String,
}

#[derive(Default)]
struct CodeMeta {
    language: Option<String>,
    buffer: String,
}

enum Block {
    Text(String),
    Heading { level: u8, text: String },
    Bullet { indent: usize, marker: String, text: String },
    Quote { depth: usize, text: String },
    Code(String),
    Rule,
    Separator,
}

impl MarkdownWriter {
    fn render<'a, I>(&mut self, parser: I)
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(text),
                Event::Code(code) => self.append_text(format!("`{code}`")),
                Event::Html(_) | Event::InlineHtml(_) => {}
                Event::FootnoteReference(name) => self.append_text(format!("[{name}]")),
                Event::HardBreak => self.flush_buffer(),
                Event::SoftBreak => self.append_text(" "),
                Event::Rule => {
                    self.flush_buffer();
                    self.blocks.push(Block::Rule);
                    self.blocks.push(Block::Separator);
                }
                Event::TaskListMarker(done) => {
                    self.append_text(if done { "[x] " } else { "[ ] " });
                }
            }
        }
        self.flush_buffer();
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.flush_buffer(),
            Tag::Heading { level, .. } => {
                self.flush_buffer();
                self.heading_level = Some(level_to_u8(level));
            }
            Tag::BlockQuote => {
                self.flush_buffer();
                self.blockquote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_buffer();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.into_string()),
                    _ => None,
                };
                self.code_block = Some(CodeMeta {
                    language,
                    buffer: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_buffer();
                self.list_stack.push(ListState {
                    ordered: start.is_some(),
                    index: start.unwrap_or(1) as usize,
                });
            }
            Tag::Item => {
                self.flush_buffer();
                let indent = self.list_stack.len().saturating_sub(1);
                if let Some(state) = self.list_stack.last() {
                    let marker = if state.ordered {
                        format!("{}.", state.index)
                    } else {
                        "•".to_string()
                    };
                    self.current_item = Some(ListMeta { indent, marker });
                }
            }
            Tag::Link { dest_url, .. } => {
                self.link_target = Some(dest_url.into_string());
            }
            Tag::Image { dest_url, .. } => {
                self.append_text(format!("[image: {dest_url}]"));
            }
            Tag::TableCell => self.append_text("| "),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_buffer();
                self.push_separator();
            }
            TagEnd::Heading(_) => {
                self.flush_buffer();
                self.heading_level = None;
                self.push_separator();
            }
            TagEnd::BlockQuote => {
                self.flush_buffer();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                self.push_separator();
            }
            TagEnd::CodeBlock => {
                if let Some(meta) = self.code_block.take() {
                    let fence = match meta.language {
                        Some(lang) => format!("```{lang}"),
                        None => "```".to_string(),
                    };
                    self.blocks.push(Block::Code(fence));
                    for line in meta.buffer.trim_end_matches('\n').split('\n') {
                        self.blocks.push(Block::Code(line.to_string()));
                    }
                    self.blocks.push(Block::Code("```".to_string()));
                    self.push_separator();
                }
            }
            TagEnd::List(_) => {
                self.flush_buffer();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_separator();
                }
            }
            TagEnd::Item => {
                self.flush_buffer();
                if let Some(state) = self.list_stack.last_mut() {
                    state.index += 1;
                }
                self.current_item = None;
            }
            TagEnd::Link => {
                if let Some(target) = self.link_target.take() {
                    if !target.starts_with('#') {
                        self.append_text(format!(" <{target}>"));
                    }
                }
            }
            TagEnd::TableRow | TagEnd::TableHead => self.flush_buffer(),
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        if let Some(code) = self.code_block.as_mut() {
            code.buffer.push_str(&text);
        } else {
            self.append_text(text);
        }
    }

    fn append_text<T: AsRef<str>>(&mut self, text: T) {
        self.buffer.push_str(text.as_ref());
    }

    fn push_separator(&mut self) {
        if !matches!(self.blocks.last(), None | Some(Block::Separator)) {
            self.blocks.push(Block::Separator);
        }
    }

    fn flush_buffer(&mut self) {
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        if text.is_empty() {
            return;
        }

        let block = if let Some(level) = self.heading_level {
            Block::Heading { level, text }
        } else if let Some(item) = self.current_item.as_mut() {
            let marker = std::mem::replace(&mut item.marker, " ".to_string());
            Block::Bullet {
                indent: item.indent,
                marker,
                text,
            }
        } else if self.blockquote_depth > 0 {
            Block::Quote {
                depth: self.blockquote_depth,
                text,
            }
        } else {
            Block::Text(text)
        };
        self.blocks.push(block);
    }

    fn into_text(mut self, width: usize, style: &MarkdownStyle) -> Text<'static> {
        while matches!(self.blocks.last(), Some(Block::Separator)) {
            self.blocks.pop();
        }

        let mut lines = Vec::with_capacity(self.blocks.len());
        for block in self.blocks {
            match block {
                Block::Text(content) => {
                    for row in wrap(&content, width) {
                        lines.push(Line::from(Span::raw(row)));
                    }
                }
                Block::Heading { level, text } => {
                    let heading = heading_style(level, style);
                    for row in wrap(&text, width) {
                        lines.push(Line::from(Span::styled(row, heading)));
                    }
                }
                Block::Bullet {
                    indent,
                    marker,
                    text,
                } => {
                    let lead = format!("{}{} ", "  ".repeat(indent), marker);
                    let hang = " ".repeat(lead.width());
                    let rows = wrap(&text, width.saturating_sub(lead.width()));
                    for (i, row) in rows.into_iter().enumerate() {
                        let prefix = if i == 0 { lead.clone() } else { hang.clone() };
                        lines.push(Line::from(vec![
                            Span::styled(prefix, Style::default().fg(style.marker)),
                            Span::raw(row),
                        ]));
                    }
                }
                Block::Quote { depth, text } => {
                    let prefix = format!("{} ", ">".repeat(depth.max(1)));
                    let quote = Style::default().fg(style.quote);
                    for row in wrap(&text, width.saturating_sub(prefix.width())) {
                        lines.push(Line::from(vec![
                            Span::styled(prefix.clone(), quote),
                            Span::styled(row, quote),
                        ]));
                    }
                }
                Block::Code(text) => {
                    lines.push(Line::from(Span::styled(
                        text,
                        Style::default().fg(style.code),
                    )));
                }
                Block::Rule => lines.push(Line::from("―".repeat(width.min(40)))),
                Block::Separator => lines.push(Line::default()),
            }
        }

        if lines.is_empty() {
            lines.push(Line::default());
        }

        Text {
            lines,
            alignment: Some(Alignment::Left),
            style: Style::default(),
        }
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|row| row.into_owned())
        .collect()
}

fn heading_style(level: u8, style: &MarkdownStyle) -> Style {
    match level {
        1 => Style::default()
            .fg(style.heading)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default()
            .fg(style.heading)
            .add_modifier(Modifier::BOLD),
        3 => Style::default()
            .fg(style.subheading)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(style.subheading),
    }
}

fn level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|span| &*span.content).collect())
            .collect()
    }

    #[test]
    fn paragraphs_wrap_to_width() {
        let renderer = Renderer::new(20, MarkdownStyle::default());
        let text = renderer.render("one two three four five six seven eight nine");
        let rows = plain(&text);
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|row| row.width() <= 20));
    }

    #[test]
    fn headings_lists_and_links() {
        let renderer = Renderer::new(60, MarkdownStyle::default());
        let text = renderer.render("# Title\n\n- first\n- [second](https://x.test)\n\nafter");
        assert_eq!(
            plain(&text),
            vec![
                "Title".to_string(),
                String::new(),
                "• first".to_string(),
                "• second <https://x.test>".to_string(),
                String::new(),
                "after".to_string(),
            ]
        );
    }

    #[test]
    fn code_blocks_keep_their_lines() {
        let renderer = Renderer::new(10, MarkdownStyle::default());
        let text = renderer.render("```rust\nlet a_long_identifier = 1;\n```");
        assert_eq!(
            plain(&text),
            vec![
                "```rust".to_string(),
                "let a_long_identifier = 1;".to_string(),
                "```".to_string(),
            ]
        );
    }
}
