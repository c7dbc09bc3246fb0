use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::chembl::ChemblClient;
use crate::dashboard::{
    Dashboard, Interaction, MessageLevel, ProgressEvent, ProgressSink, Render, Stage,
};
use crate::domain::TargetChemblId;
use crate::error::ExplorerError;
use crate::table::{RecordTable, cell_text};

const LOGS_MAX: usize = 200;
const PREVIEW_COLUMNS: usize = 5;
const TARGET_COLUMNS: &[&str] = &["target_chembl_id", "pref_name", "organism", "target_type"];
const LINK_PREVIEW_CHARS: usize = 48;
const HINTS: &[&str] = &[
    "Enter: search   Tab: next panel   Esc: quit",
    "Targets: Up/Down to pick a target",
    "Columns: Up/Down to move, Space to toggle, Backspace to clear",
    "Preview: Left/Right to scroll columns   F4 logs   F1 help",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Dashboard,
    Logs,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Targets,
    Preview,
    Columns,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Query => Focus::Targets,
            Focus::Targets => Focus::Preview,
            Focus::Preview => Focus::Columns,
            Focus::Columns => Focus::Query,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Query => Focus::Columns,
            Focus::Targets => Focus::Query,
            Focus::Preview => Focus::Targets,
            Focus::Columns => Focus::Preview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Idle,
    Submit,
    Quit,
}

#[derive(Debug)]
struct StatusState {
    status: String,
    stage: Option<Stage>,
    latency_ms: Option<u128>,
    requests: u64,
    logs: VecDeque<String>,
}

struct TuiProgress {
    state: Arc<Mutex<StatusState>>,
}

impl ProgressSink for TuiProgress {
    fn event(&self, event: ProgressEvent) {
        if let Ok(mut state) = self.state.lock() {
            let message = event.message.trim().to_string();
            if let Some((stage, payload)) = parse_stage(&message) {
                state.stage = Some(stage);
                state.status = payload.to_string();
            } else {
                state.status = message.clone();
            }
            if let Some(elapsed) = event.elapsed {
                state.latency_ms = Some(elapsed.as_millis());
                state.requests = state.requests.saturating_add(1);
            }
            push_log(&mut state.logs, format!("[{}] {message}", timestamp()));
        }
    }
}

/// Terminal front end: keeps the widget values and re-runs the dashboard
/// handler whenever one of them changes.
pub struct Tui {
    state: Arc<Mutex<StatusState>>,
    view: View,
    focus: Focus,
    input: String,
    interaction: Interaction,
    render: Option<Render>,
    target_cursor: usize,
    column_cursor: usize,
    preview_offset: usize,
    log_scroll: u16,
    started: Instant,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StatusState {
                status: "ready".to_string(),
                stage: None,
                latency_ms: None,
                requests: 0,
                logs: VecDeque::new(),
            })),
            view: View::Dashboard,
            focus: Focus::Query,
            input: String::new(),
            interaction: Interaction::default(),
            render: None,
            target_cursor: 0,
            column_cursor: 0,
            preview_offset: 0,
            log_scroll: 0,
            started: Instant::now(),
        }
    }

    /// Runs until the user quits and returns the last render, if any.
    pub fn run<C: ChemblClient>(
        &mut self,
        dashboard: &Dashboard<C>,
    ) -> miette::Result<Option<Render>> {
        let mut stdout = io::stdout();
        enable_raw_mode().map_err(terminal_error)?;
        stdout.execute(EnterAlternateScreen).map_err(terminal_error)?;

        let backend = CrosstermBackend::new(stdout);
        let result = Terminal::new(backend)
            .map_err(terminal_error)
            .and_then(|mut terminal| self.event_loop(&mut terminal, dashboard));

        disable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).map_err(terminal_error)?;

        result.map(|_| self.render.take())
    }

    fn event_loop<C: ChemblClient>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        dashboard: &Dashboard<C>,
    ) -> miette::Result<()> {
        terminal.clear().map_err(terminal_error)?;
        self.refresh(terminal, dashboard)?;

        loop {
            terminal
                .draw(|frame| draw_ui(frame, self))
                .map_err(terminal_error)?;

            if !event::poll(Duration::from_millis(120)).map_err(terminal_error)? {
                continue;
            }
            let Event::Key(key) = event::read().map_err(terminal_error)? else {
                continue;
            };
            match self.handle_key(key) {
                KeyOutcome::Idle => {}
                KeyOutcome::Submit => self.refresh(terminal, dashboard)?,
                KeyOutcome::Quit => break Ok(()),
            }
        }
    }

    /// Draws a busy frame, then blocks on the handler.
    fn refresh<C: ChemblClient>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        dashboard: &Dashboard<C>,
    ) -> miette::Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.status = "working...".to_string();
        }
        terminal
            .draw(|frame| draw_ui(frame, self))
            .map_err(terminal_error)?;

        let sink = TuiProgress {
            state: self.state.clone(),
        };
        let render = dashboard
            .handle(&self.interaction, &sink)
            .map_err(miette::Report::new)?;
        self.sync_cursors(&render);
        self.render = Some(render);
        Ok(())
    }

    fn sync_cursors(&mut self, render: &Render) {
        self.target_cursor = render
            .target_options()
            .and_then(|(options, selected)| options.iter().position(|id| id == selected))
            .unwrap_or(0);
        let column_count = render
            .column_options()
            .map(|(options, _)| options.len())
            .unwrap_or(0);
        self.column_cursor = self.column_cursor.min(column_count.saturating_sub(1));
        let preview_columns = render
            .activity_preview()
            .map(|(table, _)| table.columns().len())
            .unwrap_or(0);
        self.preview_offset = self.preview_offset.min(preview_columns.saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Idle;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }
        match key.code {
            KeyCode::Esc => {
                if self.view == View::Dashboard {
                    return KeyOutcome::Quit;
                }
                self.view = View::Dashboard;
                return KeyOutcome::Idle;
            }
            KeyCode::F(1) => {
                self.view = View::Help;
                return KeyOutcome::Idle;
            }
            KeyCode::F(3) => {
                self.view = View::Dashboard;
                return KeyOutcome::Idle;
            }
            KeyCode::F(4) => {
                self.view = View::Logs;
                return KeyOutcome::Idle;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return KeyOutcome::Idle;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return KeyOutcome::Idle;
            }
            _ => {}
        }

        if self.view == View::Logs {
            match key.code {
                KeyCode::PageUp | KeyCode::Up => self.scroll_logs(-1),
                KeyCode::PageDown | KeyCode::Down => self.scroll_logs(1),
                _ => {}
            }
            return KeyOutcome::Idle;
        }

        match self.focus {
            Focus::Query => self.handle_query_key(key),
            Focus::Targets => self.handle_target_key(key),
            Focus::Preview => {
                match key.code {
                    KeyCode::Left => self.preview_offset = self.preview_offset.saturating_sub(1),
                    KeyCode::Right => {
                        let max = self
                            .render
                            .as_ref()
                            .and_then(|render| render.activity_preview())
                            .map(|(table, _)| table.columns().len().saturating_sub(1))
                            .unwrap_or(0);
                        self.preview_offset = (self.preview_offset + 1).min(max);
                    }
                    _ => {}
                }
                KeyOutcome::Idle
            }
            Focus::Columns => self.handle_column_key(key),
        }
    }

    fn handle_query_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char(ch) => {
                self.input.push(ch);
                KeyOutcome::Idle
            }
            KeyCode::Backspace => {
                self.input.pop();
                KeyOutcome::Idle
            }
            KeyCode::Enter => {
                self.interaction = Interaction::new(self.input.clone());
                self.target_cursor = 0;
                self.column_cursor = 0;
                self.preview_offset = 0;
                KeyOutcome::Submit
            }
            _ => KeyOutcome::Idle,
        }
    }

    fn handle_target_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let Some(options) = self
            .render
            .as_ref()
            .and_then(|render| render.target_options())
            .map(|(options, _)| options.to_vec())
        else {
            return KeyOutcome::Idle;
        };
        let next = match key.code {
            KeyCode::Up => self.target_cursor.saturating_sub(1),
            KeyCode::Down => (self.target_cursor + 1).min(options.len().saturating_sub(1)),
            KeyCode::Home => 0,
            KeyCode::End => options.len().saturating_sub(1),
            _ => return KeyOutcome::Idle,
        };
        if next == self.target_cursor {
            return KeyOutcome::Idle;
        }
        let Some(target) = options.get(next).and_then(|id| id.parse::<TargetChemblId>().ok()) else {
            return KeyOutcome::Idle;
        };
        self.target_cursor = next;
        self.interaction.selected_target = Some(target);
        KeyOutcome::Submit
    }

    fn handle_column_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let Some(options) = self
            .render
            .as_ref()
            .and_then(|render| render.column_options())
            .map(|(options, _)| options.to_vec())
        else {
            return KeyOutcome::Idle;
        };
        match key.code {
            KeyCode::Up => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
                KeyOutcome::Idle
            }
            KeyCode::Down => {
                self.column_cursor = (self.column_cursor + 1).min(options.len().saturating_sub(1));
                KeyOutcome::Idle
            }
            KeyCode::Char(' ') | KeyCode::Enter => match options.get(self.column_cursor) {
                Some(column) => {
                    self.interaction.export_columns =
                        self.interaction.export_columns.toggled(column);
                    KeyOutcome::Submit
                }
                None => KeyOutcome::Idle,
            },
            KeyCode::Backspace | KeyCode::Delete => {
                if self.interaction.export_columns.is_all() {
                    return KeyOutcome::Idle;
                }
                self.interaction.export_columns = Default::default();
                KeyOutcome::Submit
            }
            _ => KeyOutcome::Idle,
        }
    }

    fn scroll_logs(&mut self, delta: i16) {
        let max = self.state.lock().map(|state| state.logs.len()).unwrap_or(0);
        let max_scroll = max.saturating_sub(1) as i16;
        let next = (self.log_scroll as i16 + delta).clamp(0, max_scroll);
        self.log_scroll = next as u16;
    }
}

fn draw_ui(frame: &mut ratatui::Frame, tui: &Tui) {
    match tui.view {
        View::Dashboard => draw_dashboard(frame, tui),
        View::Logs => draw_logs(frame, tui),
        View::Help => draw_help(frame),
    }
}

fn draw_dashboard(frame: &mut ratatui::Frame, tui: &Tui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(tui), chunks[0]);
    draw_query(frame, tui, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Min(5),
            Constraint::Length(6),
        ])
        .split(body[1]);

    let render = tui.render.as_ref();
    draw_targets(frame, tui, render, left[0]);
    frame.render_widget(draw_selected(render), left[1]);
    draw_preview(frame, tui, render, right[0]);
    frame.render_widget(draw_columns(tui, render), right[1]);
    frame.render_widget(draw_download(render), right[2]);
    frame.render_widget(draw_status_line(tui, render), chunks[3]);
}

fn draw_header(tui: &Tui) -> Paragraph<'static> {
    let (stage, latency, requests) = tui
        .state
        .lock()
        .map(|state| {
            (
                state.stage.map(|stage| stage.label()).unwrap_or("Idle"),
                state.latency_ms,
                state.requests,
            )
        })
        .unwrap_or(("Idle", None, 0));
    let latency = latency
        .map(|ms| format!("{ms} ms"))
        .unwrap_or_else(|| "n/a".to_string());
    let uptime = tui.started.elapsed().as_secs();

    Paragraph::new(Line::from(vec![
        Span::styled(
            "CHEMBL EXPLORER",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  stage: ", Style::default().fg(Color::Gray)),
        Span::raw(stage),
        Span::styled("  last call: ", Style::default().fg(Color::Gray)),
        Span::raw(latency),
        Span::styled("  calls: ", Style::default().fg(Color::Gray)),
        Span::raw(requests.to_string()),
        Span::styled("  up: ", Style::default().fg(Color::Gray)),
        Span::raw(format!("{uptime}s")),
    ]))
    .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_query(frame: &mut ratatui::Frame, tui: &Tui, area: Rect) {
    let focused = tui.focus == Focus::Query;
    let text = if tui.input.is_empty() && !focused {
        Span::styled(
            crate::dashboard::QUERY_PROMPT,
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(tui.input.clone())
    };
    let para = Paragraph::new(Line::from(text)).block(panel("Step 1: disease or target", focused));
    frame.render_widget(para, area);

    if focused && tui.view == View::Dashboard {
        let mut cursor_x = area.x.saturating_add(1 + tui.input.chars().count() as u16);
        if cursor_x >= area.x.saturating_add(area.width.saturating_sub(1)) {
            cursor_x = area.x.saturating_add(area.width.saturating_sub(2));
        }
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

fn draw_targets(frame: &mut ratatui::Frame, tui: &Tui, render: Option<&Render>, area: Rect) {
    let block = panel("Step 2: targets", tui.focus == Focus::Targets);
    let Some(table) = render.and_then(|render| render.target_table()) else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut columns: Vec<&str> = TARGET_COLUMNS
        .iter()
        .copied()
        .filter(|name| table.has_column(name))
        .collect();
    if columns.is_empty() {
        columns = table.columns().iter().take(4).map(|c| c.as_str()).collect();
    }
    let widths: Vec<Constraint> = columns
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i == 0 {
                Constraint::Length(14)
            } else {
                Constraint::Fill(1)
            }
        })
        .collect();

    let widget = Table::new(table_rows(table, &columns), widths)
        .header(header_row(&columns))
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Cyan).fg(Color::Black));
    let mut state = TableState::default().with_selected(Some(tui.target_cursor));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn draw_selected(render: Option<&Render>) -> Paragraph<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Your selected target");
    let Some((_, fields)) = render.and_then(|render| render.selected_target()) else {
        return Paragraph::new("").block(block);
    };
    let lines: Vec<Line<'static>> = fields
        .iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name}: "), Style::default().fg(Color::Gray)),
                Span::raw(cell_text(value)),
            ])
        })
        .collect();
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true })
}

fn draw_preview(frame: &mut ratatui::Frame, tui: &Tui, render: Option<&Render>, area: Rect) {
    let focused = tui.focus == Focus::Preview;
    let Some((table, total)) = render.and_then(|render| render.activity_preview()) else {
        frame.render_widget(
            Paragraph::new("").block(panel("Bio Activity summary", focused)),
            area,
        );
        return;
    };

    let columns: Vec<&str> = table
        .columns()
        .iter()
        .skip(tui.preview_offset)
        .take(PREVIEW_COLUMNS)
        .map(|c| c.as_str())
        .collect();
    let title = format!(
        "Bio Activity summary: {} of {} rows, columns {}-{} of {}",
        table.len(),
        total,
        tui.preview_offset + 1,
        tui.preview_offset + columns.len(),
        table.columns().len()
    );
    let widths = vec![Constraint::Fill(1); columns.len()];
    let widget = Table::new(table_rows(table, &columns), widths)
        .header(header_row(&columns))
        .block(panel(&title, focused));
    frame.render_widget(widget, area);
}

fn draw_columns(tui: &Tui, render: Option<&Render>) -> Paragraph<'static> {
    let block = panel("Step 3: export columns", tui.focus == Focus::Columns);
    let Some((options, selected)) = render.and_then(|render| render.column_options()) else {
        return Paragraph::new("").block(block);
    };

    let mut lines = vec![Line::from(Span::styled(
        if selected.is_empty() {
            "none picked: every column is exported".to_string()
        } else {
            format!("export order: {}", selected.join(", "))
        },
        Style::default().fg(Color::Gray),
    ))];
    for (i, option) in options.iter().enumerate() {
        let mark = if selected.contains(option) { "[x]" } else { "[ ]" };
        let style = if i == tui.column_cursor && tui.focus == Focus::Columns {
            Style::default().bg(Color::Cyan).fg(Color::Black)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("{mark} {option}"), style)));
    }

    // keep the cursor row on screen
    let scroll = tui.column_cursor.saturating_sub(4) as u16;
    Paragraph::new(lines).block(block).scroll((scroll, 0))
}

fn draw_download(render: Option<&Render>) -> Paragraph<'static> {
    let block = Block::default().borders(Borders::ALL).title("Download");
    let Some(link) = render.and_then(|render| render.download()) else {
        return Paragraph::new("").block(block);
    };
    let payload = link.payload();
    let shown: String = payload.chars().take(LINK_PREVIEW_CHARS).collect();
    let ellipsis = if payload.len() > LINK_PREVIEW_CHARS { "..." } else { "" };
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("file: ", Style::default().fg(Color::Gray)),
            Span::styled(link.file_name.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "  {} rows x {} columns, {}",
                link.row_count,
                link.columns.len(),
                bytes_to_human(link.csv_bytes as u64)
            )),
        ]),
        Line::from(Span::styled(
            format!("data:file/csv;base64,{shown}{ellipsis}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "the full link is printed when you quit",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(block)
    .wrap(Wrap { trim: true })
}

fn draw_status_line(tui: &Tui, render: Option<&Render>) -> Paragraph<'static> {
    let status = tui
        .state
        .lock()
        .map(|state| state.status.clone())
        .unwrap_or_default();
    let first = match render.and_then(|render| render.message()) {
        Some((MessageLevel::Error, text)) => {
            Span::styled(text.to_string(), Style::default().fg(Color::Red))
        }
        Some((MessageLevel::Info, text)) => {
            Span::styled(text.to_string(), Style::default().fg(Color::Yellow))
        }
        None => Span::styled(status, Style::default().fg(Color::Gray)),
    };
    let hint_index = (tui.started.elapsed().as_secs() / 8) as usize % HINTS.len();
    Paragraph::new(vec![
        Line::from(first),
        Line::from(Span::styled(
            HINTS[hint_index],
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::TOP))
}

fn draw_logs(frame: &mut ratatui::Frame, tui: &Tui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(frame.area());
    frame.render_widget(draw_header(tui), chunks[0]);

    let lines: Vec<Line<'static>> = tui
        .state
        .lock()
        .map(|state| state.logs.iter().map(|l| Line::from(l.clone())).collect())
        .unwrap_or_default();
    let logs = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Logs (PgUp/PgDown, Esc to return)"),
        )
        .scroll((tui.log_scroll, 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(logs, chunks[1]);
}

fn draw_help(frame: &mut ratatui::Frame) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Chembl Explorer",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(HINTS.iter().map(|hint| Line::from(*hint)));
    lines.push(Line::from("F3 or Esc returns to the dashboard"));
    let view = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(view, frame.area());
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title.to_string())
}

fn header_row(columns: &[&str]) -> Row<'static> {
    Row::new(
        columns
            .iter()
            .map(|name| Cell::from(name.to_string()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD))
}

fn table_rows(table: &RecordTable, columns: &[&str]) -> Vec<Row<'static>> {
    let values: Vec<Vec<&serde_json::Value>> = columns
        .iter()
        .filter_map(|name| table.column_values(name))
        .collect();
    (0..table.len())
        .map(|row| {
            Row::new(
                values
                    .iter()
                    .map(|column| Cell::from(cell_text(column[row])))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn parse_stage(message: &str) -> Option<(Stage, &str)> {
    let rest = message.strip_prefix("stage=")?;
    let (label, payload) = rest.split_once(';')?;
    let stage = match label {
        "Search" => Stage::Search,
        "Select" => Stage::Select,
        "Activity" => Stage::Activity,
        "Export" => Stage::Export,
        _ => return None,
    };
    Some((stage, payload.trim()))
}

fn terminal_error(err: io::Error) -> miette::Report {
    miette::Report::new(ExplorerError::Terminal(err.to_string()))
}

fn push_log(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > LOGS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn bytes_to_human(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{bytes} B")
    }
}
