use std::time::Instant;

use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::info;

use crate::api::Fetcher;
use crate::controller::{FetchRequest, PageController};

use super::helpers::{join_authors, optional_value, pager_summary, summarize_isbns};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Search box plus its border.
const SEARCH_HEIGHT: u16 = 3;
/// Width of the sort toggle next to the search box.
const SORT_TOGGLE_WIDTH: u16 = 24;
const SEARCH_PROMPT: &str = "Search: ";

/// Which widget receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Results,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    controller: PageController,
    fetcher: Fetcher,
    focus: Focus,
    selected: usize,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(controller: PageController, fetcher: Fetcher) -> Self {
        Self {
            controller,
            fetcher,
            focus: Focus::Query,
            selected: 0,
            status: None,
        }
    }

    /// Run the initial search when the app was started with a query.
    pub fn start(&mut self) {
        let request = self.controller.fetch();
        self.dispatch(request);
    }

    /// Fire due debounced searches and apply finished ones.
    pub fn tick(&mut self, now: Instant) {
        let request = self.controller.poll_debounce(now);
        self.dispatch(request);

        while let Some(outcome) = self.fetcher.try_next() {
            if self.controller.on_fetch_complete(outcome) {
                self.selected = 0;
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.focus {
            Focus::Query => {
                self.handle_query_key(code);
                false
            }
            Focus::Results => self.handle_results_key(code),
        }
    }

    fn handle_query_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Down | KeyCode::Tab => self.focus = Focus::Results,
            KeyCode::Enter => {
                let request = self.controller.flush_query();
                self.dispatch(request);
            }
            KeyCode::Backspace => {
                let mut query = self.controller.state().query.clone();
                if query.pop().is_some() {
                    self.controller.on_query_change(query, Instant::now());
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let mut query = self.controller.state().query.clone();
                query.push(ch);
                self.controller.on_query_change(query, Instant::now());
            }
            KeyCode::PageUp => {
                let request = self.controller.prev_page();
                self.dispatch(request);
            }
            KeyCode::PageDown => {
                let request = self.controller.next_page();
                self.dispatch(request);
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Char('/') | KeyCode::Char('f') => self.focus = Focus::Query,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.controller.rows().len().saturating_sub(1),
            KeyCode::Left | KeyCode::PageUp => {
                let request = self.controller.prev_page();
                self.dispatch(request);
            }
            KeyCode::Right | KeyCode::PageDown => {
                let request = self.controller.next_page();
                self.dispatch(request);
            }
            KeyCode::Char('+') => self.change_page_size(1),
            KeyCode::Char('-') => self.change_page_size(-1),
            KeyCode::Char('s') => self.toggle_sort(),
            KeyCode::Enter => self.open_selected(),
            _ => {}
        }
        false
    }

    pub(crate) fn handle_ctrl_s(&mut self) {
        self.toggle_sort();
    }

    pub(crate) fn handle_ctrl_u(&mut self) {
        if self.focus == Focus::Query && !self.controller.state().query.is_empty() {
            self.controller.on_query_change(String::new(), Instant::now());
        }
    }

    fn toggle_sort(&mut self) {
        let request = self.controller.toggle_sort();
        self.dispatch(request);
        let message = if self.controller.sort_enabled() {
            "Sorting by first publish year."
        } else {
            "Sorting by relevance."
        };
        self.set_status(message, StatusKind::Info);
    }

    fn change_page_size(&mut self, step: i32) {
        let request = self.controller.cycle_page_size(step);
        if request.is_some() {
            let message = format!("Showing {} per page.", self.controller.state().page_size);
            self.set_status(message, StatusKind::Info);
        }
        self.dispatch(request);
    }

    fn open_selected(&mut self) {
        let Some((title, key)) = self
            .controller
            .rows()
            .get(self.selected)
            .map(|row| (row.title.clone(), row.id.clone()))
        else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let Some(url) = self.fetcher.client().work_url(&key) else {
            self.set_status("This book has no catalog page.", StatusKind::Error);
            return;
        };

        match open_link(url.as_str()) {
            Ok(()) => {
                info!(%url, "opened catalog page");
                self.set_status(format!("Opened {title}."), StatusKind::Info);
            }
            Err(err) => {
                self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
            }
        }
    }

    fn dispatch(&mut self, request: Option<FetchRequest>) {
        if let Some(request) = request {
            self.fetcher.dispatch(request);
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.controller.rows().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SEARCH_HEIGHT),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_search_bar(frame, chunks[0]);
        self.draw_pager(frame, chunks[1]);
        self.draw_results(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(SORT_TOGGLE_WIDTH)])
            .split(area);

        let border_style = if self.focus == Focus::Query {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Search");
        let query = &self.controller.state().query;
        let paragraph = Paragraph::new(Span::raw(format!("{SEARCH_PROMPT}{query}")))
            .block(block.clone());
        frame.render_widget(paragraph, columns[0]);

        let checkbox = if self.controller.sort_enabled() {
            "[x]"
        } else {
            "[ ]"
        };
        let sort = Paragraph::new(format!("{checkbox} Sort by year"))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(sort, columns[1]);

        if self.focus == Focus::Query {
            let inner = block.inner(columns[0]);
            let cursor_x = inner.x + SEARCH_PROMPT.len() as u16 + query.chars().count() as u16;
            frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }

    fn draw_pager(&self, frame: &mut Frame, area: Rect) {
        let state = self.controller.state();
        let mut spans = vec![Span::raw(pager_summary(
            state.page,
            self.controller.last_page(),
            self.controller.total_count(),
            state.page_size,
        ))];
        if let Some(field) = state.sort {
            spans.push(Span::raw(format!(" · sort: {field}")));
        }
        if self.controller.is_loading() {
            spans.push(Span::styled(
                "  Searching…",
                Style::default().fg(Color::Yellow),
            ));
        } else if self.controller.debounce_pending() {
            spans.push(Span::styled("  …", Style::default().fg(Color::DarkGray)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect) {
        let rows = self.controller.rows();
        let block = Block::default().borders(Borders::ALL).title("Results");

        if rows.is_empty() {
            let message = if self.controller.state().query.is_empty() {
                "Type to search the catalog."
            } else if self.controller.is_loading() || self.controller.debounce_pending() {
                "Searching…"
            } else {
                "No books found."
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let first_number = self.controller.state().first_row_number();
        let header = Row::new(vec![
            "No",
            "Book title",
            "Author(s)",
            "First published",
            "ISBN",
            "Pages",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let table_rows = rows.iter().enumerate().map(|(index, row)| {
            Row::new(vec![
                Cell::from((first_number + index as u64).to_string()),
                Cell::from(row.title.clone()),
                Cell::from(join_authors(&row.authors)).style(Style::default().fg(Color::Cyan)),
                Cell::from(optional_value(row.first_publish_year)),
                Cell::from(summarize_isbns(&row.isbns)).style(Style::default().fg(Color::Gray)),
                Cell::from(optional_value(row.page_count_median)),
            ])
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(15),
            Constraint::Fill(2),
            Constraint::Length(6),
        ];

        let highlight = if self.focus == Focus::Results {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let table = Table::new(table_rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(highlight)
            .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(Some(self.selected.min(rows.len() - 1)));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match self.focus {
            Focus::Query => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search now   "),
                Span::styled("[Ctrl+U]", key_style),
                Span::raw(" Clear   "),
                Span::styled("[Ctrl+S]", key_style),
                Span::raw(" Sort by year   "),
                Span::styled("[PgUp/PgDn]", key_style),
                Span::raw(" Page   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Results   "),
                Span::styled("[Ctrl+C]", key_style),
                Span::raw(" Quit"),
            ]),
            Focus::Results => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Page   "),
                Span::styled("[+/-]", key_style),
                Span::raw(" Page size   "),
                Span::styled("[s]", key_style),
                Span::raw(" Sort by year   "),
                Span::styled("[/]", key_style),
                Span::raw(" Search   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }
}
