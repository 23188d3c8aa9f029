use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use unicode_width::UnicodeWidthStr;

use crate::controller::{Controller, KeyOutcome, LIST_ITEM_HEIGHT};
use crate::echo::EchoKind;
use crate::keys::{Key, KeyInput, Modifiers};
use crate::markdown::{MarkdownStyle, Renderer};
use crate::mode::Scheme;
use crate::services::Theme;
use crate::window::{Buffer, SplitMode};

const TICK_RATE: Duration = Duration::from_millis(120);
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
// columns at 100% font size
const READING_COLUMNS: u32 = 72;
const WHEEL_CONTENT_ROWS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    modeline_active_bg: Color,
    modeline_idle_bg: Color,
    selected_bg: Color,
    border_idle: Color,
    border_focused: Color,
    text_primary: Color,
    text_secondary: Color,
    accent: Color,
    error: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            // Modus Vivendi
            Theme::Dark => Self {
                bg: Color::Rgb(0, 0, 0),
                panel_bg: Color::Rgb(0, 0, 0),
                modeline_active_bg: Color::Rgb(72, 72, 72),
                modeline_idle_bg: Color::Rgb(30, 30, 30),
                selected_bg: Color::Rgb(47, 53, 80),
                border_idle: Color::Rgb(100, 100, 100),
                border_focused: Color::Rgb(47, 175, 255),
                text_primary: Color::Rgb(255, 255, 255),
                text_secondary: Color::Rgb(152, 152, 152),
                accent: Color::Rgb(47, 175, 255),
                error: Color::Rgb(255, 95, 89),
            },
            // Modus Operandi
            Theme::Light => Self {
                bg: Color::Rgb(255, 255, 255),
                panel_bg: Color::Rgb(255, 255, 255),
                modeline_active_bg: Color::Rgb(200, 200, 200),
                modeline_idle_bg: Color::Rgb(230, 230, 230),
                selected_bg: Color::Rgb(220, 226, 255),
                border_idle: Color::Rgb(160, 160, 160),
                border_focused: Color::Rgb(0, 49, 169),
                text_primary: Color::Rgb(0, 0, 0),
                text_secondary: Color::Rgb(89, 89, 89),
                accent: Color::Rgb(0, 49, 169),
                error: Color::Rgb(165, 0, 0),
            },
        }
    }

    fn markdown(&self, theme: Theme) -> MarkdownStyle {
        match theme {
            Theme::Dark => MarkdownStyle {
                heading: Color::Rgb(219, 124, 255),
                subheading: Color::Rgb(0, 210, 255),
                marker: self.accent,
                quote: Color::Rgb(68, 204, 68),
                code: Color::Rgb(255, 191, 0),
            },
            Theme::Light => MarkdownStyle {
                heading: Color::Rgb(114, 31, 183),
                subheading: Color::Rgb(0, 85, 135),
                marker: self.accent,
                quote: Color::Rgb(0, 106, 0),
                code: Color::Rgb(135, 60, 0),
            },
        }
    }
}

struct RenderedBody {
    revision: u64,
    columns: usize,
    theme: Theme,
    text: Text<'static>,
}

pub struct Model {
    controller: Controller,
    needs_redraw: bool,
    rendered: Option<RenderedBody>,
    list_area: Option<Rect>,
    content_area: Option<Rect>,
    last_click: Option<(usize, Instant)>,
}

impl Model {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            needs_redraw: true,
            rendered: None,
            list_area: None,
            content_area: None,
            last_click: None,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let now = Instant::now();
            let timeout = self
                .controller
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(now).min(TICK_RATE))
                .unwrap_or(TICK_RATE);

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) == KeyOutcome::Quit {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if self.controller.tick(Instant::now()) {
                self.mark_dirty();
            }
        }

        log::info!("leaving event loop");
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let Some(input) = translate_key(key) else {
            return KeyOutcome::Ignored;
        };
        let outcome = self.controller.handle_key(input, Instant::now());
        if outcome != KeyOutcome::Ignored {
            self.mark_dirty();
        }
        outcome
    }

    fn handle_mouse(&mut self, event: MouseEvent) {
        if self.controller.help_open() {
            return;
        }
        let now = Instant::now();
        let (column, row) = (event.column, event.row);
        let over_list = self.list_area.is_some_and(|area| hit(area, column, row));
        let over_content = self.content_area.is_some_and(|area| hit(area, column, row));

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.list_row_at(column, row) {
                    let double = self
                        .last_click
                        .is_some_and(|(last, at)| last == index && now - at <= DOUBLE_CLICK);
                    if double {
                        self.controller.double_click(index, now);
                        self.last_click = None;
                    } else {
                        self.controller.click(index, now);
                        self.last_click = Some((index, now));
                    }
                } else if over_content {
                    self.controller.focus_window(Buffer::Content);
                } else if over_list {
                    self.controller.focus_window(Buffer::List);
                } else {
                    return;
                }
            }
            MouseEventKind::ScrollDown if over_list => {
                self.controller.scroll_list(LIST_ITEM_HEIGHT as i64, now)
            }
            MouseEventKind::ScrollUp if over_list => {
                self.controller.scroll_list(-(LIST_ITEM_HEIGHT as i64), now)
            }
            MouseEventKind::ScrollDown if over_content => {
                self.controller.scroll_content(WHEEL_CONTENT_ROWS)
            }
            MouseEventKind::ScrollUp if over_content => {
                self.controller.scroll_content(-WHEEL_CONTENT_ROWS)
            }
            _ => return,
        }
        self.mark_dirty();
    }

    fn list_row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area?;
        if !hit(area, column, row) {
            return None;
        }
        let offset = (row - area.y) as usize + self.controller.list_scroll();
        let index = offset / LIST_ITEM_HEIGHT;
        (index < self.controller.selection().count()).then_some(index)
    }

    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let theme = self.controller.theme();
        let palette = Palette::for_theme(theme);
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), full);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(full);

        self.list_area = None;
        self.content_area = None;
        let windows = *self.controller.windows();
        match windows.split() {
            SplitMode::None => match windows.focused() {
                Buffer::List => self.draw_list(frame, layout[0], &palette),
                Buffer::Content => self.draw_content(frame, layout[0], &palette, theme),
            },
            SplitMode::Horizontal | SplitMode::Vertical => {
                let direction = if windows.split() == SplitMode::Horizontal {
                    Direction::Horizontal
                } else {
                    Direction::Vertical
                };
                let chunks = Layout::default()
                    .direction(direction)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(layout[0]);
                self.draw_list(frame, chunks[0], &palette);
                self.draw_content(frame, chunks[1], &palette, theme);
            }
        }

        self.draw_echo(frame, layout[1], &palette);

        if self.controller.help_open() {
            self.draw_help(frame, layout[0], &palette);
        }
    }

    fn draw_list(&mut self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let focused = self.controller.windows().focused() == Buffer::List;
        let (body, modeline) = split_modeline(area);
        let block = pane_block(Buffer::List.name(), focused, palette);
        let inner = block.inner(body);
        frame.render_widget(block, body);
        self.list_area = Some(inner);
        self.controller.set_list_viewport(inner.height as usize);

        let selection = self.controller.selection();
        let lines = if selection.is_empty() {
            vec![Line::from(Span::styled(
                "No articles.",
                Style::default().fg(palette.text_secondary),
            ))]
        } else {
            list_lines(&self.controller, focused, inner.width, palette)
        };
        let paragraph =
            Paragraph::new(lines).scroll((scroll_offset(self.controller.list_scroll()), 0));
        frame.render_widget(paragraph, inner);

        let text = format!(
            " {} {}   {}  L{}   ({})",
            self.controller.scheme().lighter(),
            Buffer::List.name(),
            selection.position_label(),
            selection.line_number(),
            self.controller.site().name,
        );
        frame.render_widget(modeline_widget(text, focused, palette), modeline);
    }

    fn draw_content(&mut self, frame: &mut Frame<'_>, area: Rect, palette: &Palette, theme: Theme) {
        let focused = self.controller.windows().focused() == Buffer::Content;
        let (body, modeline) = split_modeline(area);
        let loaded = self.controller.content().is_loaded();
        let title = if loaded {
            self.controller.content().title().to_string()
        } else {
            Buffer::Content.name().to_string()
        };
        let heading = if loaded {
            content_heading(
                self.controller.content().full_title(),
                &title,
                body.width,
            )
        } else {
            title.clone()
        };
        let block = pane_block(&heading, focused, palette);
        let inner = block.inner(body);
        frame.render_widget(block, body);
        self.content_area = Some(inner);

        if !loaded {
            self.controller.set_content_metrics(0, inner.height as usize);
            let placeholder = Paragraph::new("No article loaded. Open one from *posts* with RET.")
                .style(Style::default().fg(palette.text_secondary))
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
        } else {
            let columns = reading_columns(inner.width, self.controller.font_size());
            let text = self.rendered_body(columns, theme, palette);
            self.controller
                .set_content_metrics(text.lines.len(), inner.height as usize);
            let text_area = Rect {
                width: columns as u16,
                ..inner
            };
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(palette.text_primary))
                .scroll((scroll_offset(self.controller.content().scroll()), 0));
            frame.render_widget(paragraph, text_area);
        }

        let content = self.controller.content();
        let text = format!(
            " {} {}   {}  L{}",
            self.controller.scheme().lighter(),
            title,
            content.position_label(),
            content.line_number(),
        );
        frame.render_widget(modeline_widget(text, focused, palette), modeline);
    }

    fn rendered_body(&mut self, columns: usize, theme: Theme, palette: &Palette) -> Text<'static> {
        let revision = self.controller.content().revision();
        if let Some(cached) = self.rendered.as_ref().filter(|cached| {
            cached.revision == revision && cached.columns == columns && cached.theme == theme
        }) {
            return cached.text.clone();
        }

        let renderer = Renderer::new(columns, palette.markdown(theme));
        let text = renderer.render(self.controller.content().body());
        log::trace!("rendered article body: {} rows at {columns} columns", text.lines.len());
        self.rendered = Some(RenderedBody {
            revision,
            columns,
            theme,
            text: text.clone(),
        });
        text
    }

    fn draw_echo(&self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let color = match self.controller.echo_kind() {
            Some(EchoKind::Error) => palette.error,
            Some(EchoKind::Pending) => palette.accent,
            Some(EchoKind::Info) => palette.text_primary,
            None => palette.text_secondary,
        };
        let echo = Paragraph::new(self.controller.echo_text())
            .style(Style::default().fg(color).bg(palette.bg));
        frame.render_widget(echo, area);
    }

    fn draw_help(&self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let popup_area = centered_rect(70, 80, area);
        frame.render_widget(Clear, popup_area);
        let help = Paragraph::new(help_lines(self.controller.scheme(), palette))
            .block(
                Block::default()
                    .title(Span::styled(
                        "Help",
                        Style::default()
                            .fg(palette.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent))
                    .style(Style::default().bg(palette.panel_bg))
                    .padding(Padding::horizontal(1)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(help, popup_area);
    }
}

fn list_lines(
    controller: &Controller,
    focused: bool,
    width: u16,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let selection = controller.selection();
    let mut lines = Vec::with_capacity(selection.count() * LIST_ITEM_HEIGHT);
    for item in &controller.site().items {
        let selected = selection.is_marked(item.index);
        let background = if selected && focused {
            palette.selected_bg
        } else {
            palette.panel_bg
        };
        let marker = if selected { ">" } else { " " };
        let title_style = if selected {
            Style::default()
                .fg(palette.text_primary)
                .bg(background)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_primary).bg(background)
        };
        let meta = match item.date {
            Some(date) => format!("  {}  {}", date.format("%Y-%m-%d"), item.url),
            None => format!("  {}", item.url),
        };
        let mut rows = vec![
            Line::from(vec![
                Span::styled(
                    format!("{marker} "),
                    Style::default().fg(palette.accent).bg(background),
                ),
                Span::styled(item.title.clone(), title_style),
            ]),
            Line::from(Span::styled(
                meta,
                Style::default().fg(palette.text_secondary).bg(background),
            )),
        ];
        pad_lines_to_width(&mut rows, width);
        lines.extend(rows);
    }
    lines
}

fn help_lines(scheme: Scheme, palette: &Palette) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let mut sections: Vec<(&str, Vec<(&str, &str)>)> = vec![(
        "Global",
        vec![
            ("?", "toggle this help"),
            ("C-g", "keyboard quit"),
            ("t", "toggle theme"),
            ("+ / - / 0", "font larger / smaller / reset"),
            ("C-z", "toggle Evil mode"),
            ("M-<left> / M-<right>", "history back / forward"),
            ("gg / gh / gp", "top / home / post index"),
            ("C-x o / C-x b", "other window / list buffer"),
            ("C-x 2 / C-x 3", "split stacked / side by side"),
            ("C-x 1 / C-x 0", "delete other windows / this window"),
            ("C-x k", "kill article buffer"),
            ("C-x C-c / C-c", "quit"),
        ],
    )];
    match scheme {
        Scheme::Emacs => {
            sections.push((
                "*posts*",
                vec![
                    ("n / p", "next / previous article"),
                    ("RET / o / SPC", "open article"),
                    ("< / >", "first / last article"),
                ],
            ));
            sections.push((
                "*article*",
                vec![
                    ("n / p", "next / previous article"),
                    ("SPC / S-SPC", "page down / up"),
                    ("C-v / M-v", "page down / up"),
                    ("< / >", "top / bottom"),
                    ("q", "back to list"),
                ],
            ));
        }
        Scheme::Evil => {
            sections.push((
                "*posts*",
                vec![
                    ("j / k", "next / previous article"),
                    ("RET / l / o", "open article"),
                    ("G", "last article"),
                ],
            ));
            sections.push((
                "*article*",
                vec![
                    ("j / k", "scroll line"),
                    ("C-d / C-u", "half page down / up"),
                    ("C-f / C-b", "page down / up"),
                    ("] / [", "next / previous article"),
                    ("G", "bottom"),
                    ("q / h", "back to list"),
                ],
            ));
            sections.push((
                "Windows",
                vec![
                    ("C-w s / C-w v", "split stacked / side by side"),
                    ("C-w w", "other window"),
                    ("C-w o / C-w q", "only / close"),
                    ("C-w h/j/k/l", "focus left / down / up / right"),
                ],
            ));
        }
    }

    let mut lines = Vec::new();
    for (title, bindings) in sections {
        lines.push(Line::from(Span::styled(title.to_string(), heading)));
        for (keys, action) in bindings {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {keys:<22}"),
                    Style::default().fg(palette.text_primary),
                ),
                Span::styled(action.to_string(), Style::default().fg(palette.text_secondary)),
            ]));
        }
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "ESC, q or ? closes this help",
        Style::default()
            .fg(palette.text_secondary)
            .add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn pane_block<'a>(title: &str, focused: bool, palette: &Palette) -> Block<'a> {
    let border_style = if focused {
        Style::default().fg(palette.border_focused)
    } else {
        Style::default().fg(palette.border_idle)
    };
    let title_style = if focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text_secondary)
    };
    Block::default()
        .title(Span::styled(title.to_string(), title_style))
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(Style::default().bg(palette.panel_bg))
        .padding(Padding::horizontal(1))
}

fn modeline_widget(text: String, focused: bool, palette: &Palette) -> Paragraph<'static> {
    let style = if focused {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.modeline_active_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(palette.text_secondary)
            .bg(palette.modeline_idle_bg)
    };
    Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Left)
}

fn split_modeline(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

fn pad_lines_to_width(lines: &mut [Line<'static>], width: u16) {
    let width = width as usize;
    if width == 0 {
        return;
    }

    for line in lines {
        let current_width: usize = line
            .spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum();
        if current_width >= width {
            continue;
        }
        let pad_style = line.spans.last().map(|span| span.style).unwrap_or_default();
        line.spans
            .push(Span::styled(" ".repeat(width - current_width), pad_style));
    }
}

// The window border keeps the full title whenever it fits; the modeline
// always shows the short one.
fn content_heading(full: &str, short: &str, width: u16) -> String {
    if UnicodeWidthStr::width(full) + 4 <= width as usize {
        full.to_string()
    } else {
        short.to_string()
    }
}

fn scroll_offset(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn hit(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

fn reading_columns(available: u16, font_size: u16) -> usize {
    let columns = READING_COLUMNS * 100 / u32::from(font_size.max(1));
    (columns as usize).min(available as usize).max(1)
}

fn translate_key(event: KeyEvent) -> Option<KeyInput> {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    let mods = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    };
    Some(KeyInput::new(key, mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::backend::TestBackend;

    use crate::controller::ControllerOptions;
    use crate::data::Site;
    use crate::services::MemoryPrefs;

    fn model(count: usize) -> Model {
        let site = Site::from_entries(
            "test",
            (0..count).map(|i| {
                (
                    format!("Title {i}"),
                    format!("/post/{i}/"),
                    Some(format!("# Heading {i}\n\nBody of article {i}.")),
                )
            }),
        );
        let controller = Controller::new(
            site,
            ControllerOptions::default(),
            Arc::new(MemoryPrefs::new()),
        );
        Model::new(controller)
    }

    fn screen(model: &mut Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| model.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn press(model: &mut Model, code: KeyCode, modifiers: KeyModifiers) -> KeyOutcome {
        model.handle_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn translate_keeps_modifiers() {
        let input = translate_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(input, KeyInput::ctrl('x'));
        let input = translate_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::SHIFT))
            .unwrap();
        assert!(input.mods.shift);
        assert!(translate_key(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn reading_measure_follows_font_size() {
        assert_eq!(reading_columns(200, 100), 72);
        assert_eq!(reading_columns(200, 150), 48);
        assert_eq!(reading_columns(200, 80), 90);
        assert_eq!(reading_columns(40, 100), 40);
    }

    #[test]
    fn scroll_offsets_saturate() {
        assert_eq!(scroll_offset(12), 12);
        assert_eq!(scroll_offset(70_000), u16::MAX);
    }

    #[test]
    fn long_titles_show_in_full_when_the_window_is_wide() {
        let full = "x".repeat(60);
        let short = crate::content::truncate_title(&full);
        assert_eq!(content_heading(&full, &short, 80), full);
        assert_eq!(content_heading(&full, &short, 40), short);
    }

    #[test]
    fn opened_article_border_carries_the_full_title() {
        let long = format!("A rather long article title {}", "that keeps going ".repeat(2));
        let site = Site::from_entries(
            "test",
            vec![(long.clone(), "/post/long/".to_string(), Some("Body.".to_string()))],
        );
        let controller = Controller::new(
            site,
            ControllerOptions::default(),
            Arc::new(MemoryPrefs::new()),
        );
        let mut model = Model::new(controller);
        press(&mut model, KeyCode::Enter, KeyModifiers::NONE);
        assert!(long.chars().count() > crate::content::TITLE_LIMIT);
        assert!(screen(&mut model).contains(long.trim_end()));
    }

    #[test]
    fn themes_have_distinct_palettes() {
        assert_ne!(
            Palette::for_theme(Theme::Dark),
            Palette::for_theme(Theme::Light)
        );
    }

    #[test]
    fn list_view_shows_items_and_modeline() {
        let mut model = model(3);
        let text = screen(&mut model);
        assert!(text.contains("*posts*"));
        assert!(text.contains("> Title 0"));
        assert!(text.contains("Top"));
        assert!(text.contains("n/p to navigate"));
    }

    #[test]
    fn opening_renders_the_article() {
        let mut model = model(3);
        screen(&mut model);
        press(&mut model, KeyCode::Enter, KeyModifiers::NONE);
        let text = screen(&mut model);
        assert!(text.contains("Heading 0"));
        assert!(text.contains("Body of article 0."));
        assert!(!text.contains("Title 1"));
    }

    #[test]
    fn side_by_side_split_shows_both_windows() {
        let mut model = model(3);
        press(&mut model, KeyCode::Char('x'), KeyModifiers::CONTROL);
        press(&mut model, KeyCode::Char('3'), KeyModifiers::NONE);
        let text = screen(&mut model);
        assert!(text.contains("Title 2"));
        assert!(text.contains("Body of article 0."));
    }

    #[test]
    fn clicks_map_to_list_rows() {
        let mut model = model(5);
        screen(&mut model);
        let area = model.list_area.unwrap();
        assert_eq!(model.list_row_at(area.x, area.y), Some(0));
        assert_eq!(
            model.list_row_at(area.x, area.y + LIST_ITEM_HEIGHT as u16 + 1),
            Some(1)
        );
        assert_eq!(model.list_row_at(area.x, area.y + 20), None);
    }

    #[test]
    fn help_overlay_toggles() {
        let mut model = model(1);
        press(&mut model, KeyCode::Char('?'), KeyModifiers::NONE);
        assert!(screen(&mut model).contains("toggle this help"));
        press(&mut model, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!model.controller().help_open());
    }
}
