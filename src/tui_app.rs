// src/tui_app.rs

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tracing::{debug, error};

use crate::columns::ColumnDef;
use crate::config::ViewerConfig;
use crate::constants::{COLUMN_WIDTH, POLL_INTERVAL_MS};
use crate::error::Result;
use crate::filter::{Debouncer, FilterKind};
use crate::loader::{Loaded, Loader};
use crate::virtual_table::VirtualTable;

const PAGE: usize = 20;

pub enum InputMode {
    Normal,
    /// Typing into a prefix or threshold filter. Every keystroke applies.
    EditFilter {
        column: String,
        buffer: String,
        original: Option<String>,
    },
    /// Picking a value for a select filter. Index 0 is "All".
    SelectFilter {
        column: String,
        options: Vec<String>,
        state: ListState,
    },
    OpenFile {
        buffer: String,
    },
    Search {
        buffer: String,
    },
}

pub struct TuiApp {
    pub table: VirtualTable,
    pub selected_row: usize,
    pub selected_column: usize,
    pub table_state: TableState,
    pub mode: InputMode,
    pub source: Option<PathBuf>,
    pub status: Option<String>,

    search_enabled: bool,
    search_input: String,
    search_debounce: Debouncer<String>,
    loader: Loader,
}

impl TuiApp {
    pub fn new(table: VirtualTable, loader: Loader, config: &ViewerConfig) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        TuiApp {
            table,
            selected_row: 0,
            selected_column: 0,
            table_state,
            mode: InputMode::Normal,
            source: config.file.clone(),
            status: None,

            search_enabled: config.search_enabled,
            search_input: String::new(),
            search_debounce: Debouncer::new(config.search_debounce),
            loader,
        }
    }

    pub fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        return Ok(());
                    }
                }
            }
            self.tick(Instant::now());
        }
    }

    /// Collects finished loads and debounced search input.
    pub fn tick(&mut self, now: Instant) {
        if let Some(loaded) = self.loader.poll() {
            self.apply_loaded(loaded);
        }
        if let Some(query) = self.search_debounce.poll(now) {
            debug!(query = query.as_str(), "search applied");
            self.table.set_search(&query);
            self.clamp_selection();
        }
    }

    /// Starts reading `path` in the background. The current table stays
    /// on screen until the read finishes.
    pub fn submit(&mut self, path: PathBuf) {
        self.status = Some(format!("Loading {}...", path.display()));
        self.loader.request(path);
    }

    pub fn apply_loaded(&mut self, loaded: Loaded) {
        match loaded.result {
            Ok(data) => {
                let records = data.len();
                self.table.replace_data(data);
                self.status = Some(format!(
                    "Loaded {} records from {}",
                    records,
                    loaded.path.display()
                ));
                self.source = Some(loaded.path);
                self.selected_row = 0;
                self.clamp_selection();
            }
            Err(e) => {
                error!(error = %e, "could not load file");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Handles one key press. Returns true when the viewer should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let mode = std::mem::replace(&mut self.mode, InputMode::Normal);
        self.mode = match mode {
            InputMode::Normal => return self.handle_normal_key(key),
            InputMode::EditFilter {
                column,
                mut buffer,
                original,
            } => match key.code {
                KeyCode::Enter => InputMode::Normal,
                KeyCode::Esc => {
                    self.apply_filter(&column, original.as_deref().unwrap_or(""));
                    InputMode::Normal
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    self.apply_filter(&column, &buffer);
                    InputMode::EditFilter { column, buffer, original }
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.apply_filter(&column, &buffer);
                    InputMode::EditFilter { column, buffer, original }
                }
                _ => InputMode::EditFilter { column, buffer, original },
            },
            InputMode::SelectFilter {
                column,
                options,
                mut state,
            } => {
                let count = options.len() + 1;
                match key.code {
                    KeyCode::Up => {
                        let i = state.selected().unwrap_or(0);
                        state.select(Some(if i == 0 { count - 1 } else { i - 1 }));
                        InputMode::SelectFilter { column, options, state }
                    }
                    KeyCode::Down => {
                        let i = state.selected().unwrap_or(0);
                        state.select(Some(if i + 1 >= count { 0 } else { i + 1 }));
                        InputMode::SelectFilter { column, options, state }
                    }
                    KeyCode::Enter => {
                        let value = match state.selected() {
                            Some(i) if i > 0 => options.get(i - 1).cloned().unwrap_or_default(),
                            _ => String::new(),
                        };
                        self.apply_filter(&column, &value);
                        InputMode::Normal
                    }
                    KeyCode::Esc | KeyCode::Char('q') => InputMode::Normal,
                    _ => InputMode::SelectFilter { column, options, state },
                }
            }
            InputMode::OpenFile { mut buffer } => match key.code {
                KeyCode::Enter => {
                    let path = buffer.trim();
                    if !path.is_empty() {
                        self.submit(PathBuf::from(path));
                    }
                    InputMode::Normal
                }
                KeyCode::Esc => InputMode::Normal,
                KeyCode::Backspace => {
                    buffer.pop();
                    InputMode::OpenFile { buffer }
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    InputMode::OpenFile { buffer }
                }
                _ => InputMode::OpenFile { buffer },
            },
            InputMode::Search { mut buffer } => match key.code {
                KeyCode::Enter | KeyCode::Esc => InputMode::Normal,
                KeyCode::Backspace => {
                    buffer.pop();
                    self.push_search(&buffer);
                    InputMode::Search { buffer }
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.push_search(&buffer);
                    InputMode::Search { buffer }
                }
                _ => InputMode::Search { buffer },
            },
        };
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        let row_count = self.table.rendered_rows().len();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row + 1 < row_count {
                    self.selected_row += 1;
                }
            }
            KeyCode::PageUp => {
                self.selected_row = self.selected_row.saturating_sub(PAGE);
            }
            KeyCode::PageDown => {
                self.selected_row = (self.selected_row + PAGE).min(row_count.saturating_sub(1));
            }
            KeyCode::Home => self.selected_row = 0,
            KeyCode::End => self.selected_row = row_count.saturating_sub(1),
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.table.schema().column_count() {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('f') => self.begin_filter_edit(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(column) = self.selected_accessor() {
                    self.apply_filter(&column, "");
                }
            }
            KeyCode::Char('k') => {
                if let Some(def) = self.table.schema().column_at(self.selected_column) {
                    let column = def.accessor.clone();
                    let kind = def.filter.next();
                    match self.table.set_filter_kind(&column, kind) {
                        Ok(()) => self.status = Some(format!("{} now uses a {} filter", column, kind)),
                        Err(e) => self.status = Some(e.to_string()),
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('X') => {
                self.table.clear_filters();
                self.status = Some("All filters cleared".to_string());
            }
            KeyCode::Char('o') => {
                let buffer = self
                    .source
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.mode = InputMode::OpenFile { buffer };
            }
            KeyCode::Char('r') => {
                if let Some(path) = self.source.clone() {
                    self.submit(path);
                }
            }
            KeyCode::Char('/') if self.search_enabled => {
                self.mode = InputMode::Search {
                    buffer: self.search_input.clone(),
                };
            }
            _ => {}
        }
        self.table_state.select(Some(self.selected_row));
        false
    }

    fn selected_accessor(&self) -> Option<String> {
        self.table
            .schema()
            .column_at(self.selected_column)
            .map(|c| c.accessor.clone())
    }

    fn begin_filter_edit(&mut self) {
        let Some(def) = self.table.schema().column_at(self.selected_column) else {
            return;
        };
        let column = def.accessor.clone();
        let current = self.table.filters().get(&column).map(String::from);

        self.mode = if def.filter.is_free_text() {
            InputMode::EditFilter {
                column,
                buffer: current.clone().unwrap_or_default(),
                original: current,
            }
        } else {
            let options = self.table.select_options(&column);
            let selected = current
                .as_deref()
                .and_then(|v| options.iter().position(|o| o == v))
                .map_or(0, |i| i + 1);
            let mut state = ListState::default();
            state.select(Some(selected));
            InputMode::SelectFilter {
                column,
                options,
                state,
            }
        };
    }

    fn apply_filter(&mut self, column: &str, value: &str) {
        if let Err(e) = self.table.set_filter(column, value) {
            self.status = Some(e.to_string());
        }
        self.clamp_selection();
    }

    fn push_search(&mut self, buffer: &str) {
        self.search_input = buffer.to_string();
        self.search_debounce.push(self.search_input.clone(), Instant::now());
    }

    fn clamp_selection(&mut self) {
        let column_count = self.table.schema().column_count();
        if self.selected_column >= column_count {
            self.selected_column = column_count.saturating_sub(1);
        }
        let row_count = self.table.rendered_rows().len();
        if self.selected_row >= row_count {
            self.selected_row = row_count.saturating_sub(1);
        }
        self.table_state.select(Some(self.selected_row));
    }

    fn filter_label(&self, def: &ColumnDef) -> String {
        if let InputMode::EditFilter { column, buffer, .. } = &self.mode {
            if *column == def.accessor {
                let dropped = !buffer.is_empty() && self.table.filters().get(column).is_none();
                return if dropped {
                    format!("{}_ (ignored)", buffer)
                } else {
                    format!("{}_", buffer)
                };
            }
        }
        let active = self.table.filters().get(&def.accessor);
        match (def.filter, active) {
            (FilterKind::Select, value) => format!("[{}]", value.unwrap_or("All")),
            (FilterKind::Prefix, Some(value)) => value.to_string(),
            (FilterKind::Prefix, None) => format!(
                "Search {} records...",
                self.table.pre_filtered_rows(&def.accessor).len()
            ),
            (FilterKind::GreaterThan, Some(value)) => format!(">= {}", value),
            (FilterKind::GreaterThan, None) => ">= ...".to_string(),
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        self.render_table(f, chunks[0]);
        self.render_status(f, chunks[1]);

        if let InputMode::SelectFilter {
            column,
            options,
            state,
        } = &mut self.mode
        {
            Self::render_select_popup(f, size, column, options, state);
        }
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let mut header_cells = Vec::new();
        let mut rows = Vec::new();
        let mut widths = Vec::new();
        {
            let schema = self.table.schema();
            let mut index = 0;
            for group in &schema.groups {
                for (i, def) in group.columns.iter().enumerate() {
                    let group_label = if i == 0 { group.header.clone() } else { String::new() };
                    let mut style = Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD);
                    if index == self.selected_column {
                        style = style.bg(Color::Blue);
                    }
                    let text = Text::from(vec![
                        Line::from(group_label),
                        Line::from(def.header.clone()).style(Style::default().add_modifier(Modifier::UNDERLINED)),
                        Line::from(self.filter_label(def)).style(Style::default().fg(Color::Gray)),
                    ]);
                    header_cells.push(Cell::from(text).style(style));
                    widths.push(Constraint::Length(COLUMN_WIDTH));
                    index += 1;
                }
            }

            for &row in self.table.rendered_rows() {
                let cells = schema.columns().enumerate().map(|(col_idx, def)| {
                    let mut cell = Cell::from(self.table.cell(row, def).unwrap_or("").to_string());
                    if col_idx == self.selected_column {
                        cell = cell.style(Style::default().fg(Color::LightBlue));
                    }
                    cell
                });
                rows.push(Row::new(cells).height(1));
            }
        }

        let title = match &self.source {
            Some(path) => path.display().to_string(),
            None => "No file".to_string(),
        };
        let header = Row::new(header_cells).height(3).bottom_margin(1);
        let table = Table::new(rows, &widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("-> ")
            .column_spacing(2);

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.mode {
            InputMode::OpenFile { buffer } => format!("Open file: {}_", buffer),
            InputMode::Search { buffer } => format!("Search: {}_", buffer),
            _ => {
                let message = self.status.clone().unwrap_or_else(|| {
                    format!("{} records", self.table.data().len())
                });
                let search = if self.table.search().is_empty() {
                    String::new()
                } else {
                    format!(" | search: {}", self.table.search())
                };
                format!(
                    "{}{} | Enter filter  k kind  x clear  X clear all  o open  r reload  q quit",
                    message, search
                )
            }
        };
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_select_popup(
        f: &mut Frame,
        size: Rect,
        column: &str,
        options: &[String],
        state: &mut ListState,
    ) {
        let popup_area = Self::centered_rect(40, 50, size);

        let block = Block::default()
            .title(format!("{} (Enter to pick, Esc to cancel)", column))
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let items: Vec<ListItem> = std::iter::once("All")
            .chain(options.iter().map(String::as_str))
            .map(|option| ListItem::new(option.to_string()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).bg(Color::Blue))
            .highlight_symbol(">> ");

        f.render_widget(Clear, popup_area);
        f.render_stateful_widget(list, popup_area, state);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
