use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, LazyLock};
use std::thread;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use regex::Regex;

use crate::client::{DatasetClient, ReferencesClient};
use crate::metadata::MetadataPanel;
use crate::navigation::{History, SessionHistory};
use crate::page::{Page, PageSnapshot};
use crate::runtime::Runtime;
use crate::switcher::{Completion, Effect, ViewState, Visibility};
use crate::table::DrawnTable;

const TABLE_ROWS_MAX: usize = 200;
const HINT: &str = "Tab focus  ↑/↓ move  Enter select  ←/Backspace back  → forward  r retry  q quit";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Species,
    Projects,
    Table,
}

pub struct Tui<D: DatasetClient + 'static, R: ReferencesClient + 'static> {
    page: Page<SessionHistory>,
    runtime: Arc<Runtime<D, R>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
    focus: Focus,
    species_cursor: usize,
    project_cursor: usize,
    table_scroll: usize,
}

impl<D: DatasetClient + 'static, R: ReferencesClient + 'static> Tui<D, R> {
    pub fn new(page: Page<SessionHistory>, runtime: Runtime<D, R>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            page,
            runtime: Arc::new(runtime),
            tx,
            rx,
            in_flight: 0,
            focus: Focus::Species,
            species_cursor: 0,
            project_cursor: 0,
            table_scroll: 0,
        }
    }

    pub fn run(&mut self) -> miette::Result<PageSnapshot> {
        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let effect = self.page.open();
        self.spawn(effect);
        self.sync_cursors();

        let mut tick = 0usize;
        let outcome = loop {
            if let Err(err) = terminal.draw(|frame| draw_ui(frame, self, tick)) {
                break Err(err).into_diagnostic();
            }

            if let Ok(completion) = self.rx.try_recv() {
                self.in_flight = self.in_flight.saturating_sub(1);
                let effect = self.page.complete(completion);
                self.spawn(effect);
                self.sync_cursors();
            }

            match event::poll(Duration::from_millis(120)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if self.handle_key(key) {
                            break Ok(self.page.snapshot());
                        }
                    }
                    Ok(_) => {}
                    Err(err) => break Err(err).into_diagnostic(),
                },
                Ok(false) => {}
                Err(err) => break Err(err).into_diagnostic(),
            }

            tick = tick.wrapping_add(1);
        };

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        outcome
    }

    fn spawn(&mut self, effect: Option<Effect>) {
        let Some(effect) = effect else {
            return;
        };
        let runtime = Arc::clone(&self.runtime);
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let _ = tx.send(runtime.execute(effect));
        });
    }

    fn sync_cursors(&mut self) {
        let selection = self.page.selection();
        let switcher = self.page.switcher();
        if let Some(index) = switcher
            .registry()
            .species()
            .position(|species| species == selection.species)
        {
            self.species_cursor = index;
        }
        self.project_cursor = switcher
            .selector()
            .position(&selection.project)
            .unwrap_or(0);
        self.table_scroll = 0;
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let effect = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Species => Focus::Projects,
                    Focus::Projects => Focus::Table,
                    Focus::Table => Focus::Species,
                };
                None
            }
            KeyCode::Up => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Down => {
                self.move_cursor(1);
                None
            }
            KeyCode::PageUp => {
                self.table_scroll = self.table_scroll.saturating_sub(10);
                None
            }
            KeyCode::PageDown => {
                self.table_scroll = self.table_scroll.saturating_add(10);
                None
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Left | KeyCode::Backspace => self.page.back(),
            KeyCode::Right => self.page.forward(),
            KeyCode::Char('r') => self.page.retry(),
            _ => None,
        };
        let navigated = !matches!(
            key.code,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown
        );
        self.spawn(effect);
        if navigated {
            self.sync_cursors();
        }
        false
    }

    fn move_cursor(&mut self, delta: isize) {
        let switcher = self.page.switcher();
        let (cursor, len) = match self.focus {
            Focus::Species => (&mut self.species_cursor, switcher.registry().len()),
            Focus::Projects => (&mut self.project_cursor, switcher.selector().entries.len()),
            Focus::Table => (&mut self.table_scroll, switcher.table().drawn().rows.len()),
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn activate(&mut self) -> Option<Effect> {
        let switcher = self.page.switcher();
        match self.focus {
            Focus::Species => {
                let species = switcher
                    .registry()
                    .species()
                    .nth(self.species_cursor)?
                    .to_string();
                self.page.select_species(&species)
            }
            Focus::Projects if switcher.selector().visible => {
                let project = switcher.selector().entry(self.project_cursor)?.clone();
                self.page.select_project(project)
            }
            _ => None,
        }
    }
}

fn draw_ui<D: DatasetClient + 'static, R: ReferencesClient + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<D, R>,
    tick: usize,
) {
    let page = &tui.page;
    let switcher = page.switcher();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(page, tui.in_flight, tick), chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[1]);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main[0]);
    let species = switcher
        .registry()
        .species()
        .map(str::to_string)
        .collect::<Vec<_>>();
    frame.render_widget(
        draw_list(
            "Species",
            &species,
            tui.species_cursor,
            tui.focus == Focus::Species,
        ),
        lists[0],
    );
    let selector = switcher.selector();
    let projects = if selector.visible {
        selector
            .entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    } else {
        Vec::new()
    };
    frame.render_widget(
        draw_list(
            "Projects",
            &projects,
            tui.project_cursor,
            tui.focus == Focus::Projects,
        ),
        lists[1],
    );

    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(main[1]);
    frame.render_widget(
        draw_metadata(switcher.metadata(), switcher.visibility()),
        content[0],
    );
    draw_table(frame, page, tui.table_scroll, content[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        HINT,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, chunks[2]);
}

fn draw_header(page: &Page<SessionHistory>, in_flight: usize, tick: usize) -> Paragraph<'static> {
    const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
    let switcher = page.switcher();
    let (status, color) = match switcher.state() {
        ViewState::Idle => ("idle".to_string(), Color::Gray),
        ViewState::Loading { .. } => (
            format!("loading {}", SPINNER[tick % SPINNER.len()]),
            Color::Yellow,
        ),
        ViewState::Loaded { .. } => (
            format!(
                "{} of {} rows",
                switcher.table().drawn().rows.len(),
                switcher.table().row_count()
            ),
            Color::Green,
        ),
        ViewState::Empty { .. } => ("no rows".to_string(), Color::Yellow),
        ViewState::Unknown { .. } => ("no data for species".to_string(), Color::Yellow),
        ViewState::FetchFailed { reason, .. } => {
            (format!("fetch failed: {reason} (r to retry)"), Color::Red)
        }
    };
    let mut spans = vec![
        Span::styled(
            "DATAPAGES ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", switcher.species_label().unwrap_or_default()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]  ", switcher.selector().label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(status, Style::default().fg(color)),
    ];
    if in_flight > 0 {
        spans.push(Span::styled(
            format!("  requests: {in_flight}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Paragraph::new(vec![
        Line::from(spans),
        Line::from(Span::styled(
            page.history().location().to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::BOTTOM))
    .alignment(Alignment::Left)
}

fn draw_list(title: &str, items: &[String], cursor: usize, focused: bool) -> Paragraph<'static> {
    let lines = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if index == cursor && focused {
                Line::from(Span::styled(
                    format!("> {item}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else if index == cursor {
                Line::from(Span::styled(
                    format!("> {item}"),
                    Style::default().fg(Color::Gray),
                ))
            } else {
                Line::from(format!("  {item}"))
            }
        })
        .collect::<Vec<_>>();
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title.to_string()),
    )
}

fn draw_metadata(metadata: &MetadataPanel, visibility: Visibility) -> Paragraph<'static> {
    if !visibility.content {
        let text = if visibility.loading { "Loading..." } else { "" };
        return Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    }
    let mut lines = vec![Line::from(Span::styled(
        metadata.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(updated) = &metadata.last_updated {
        lines.push(Line::from(Span::styled(
            updated.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for html in [
        &metadata.description,
        &metadata.published_data_description,
        &metadata.links,
    ] {
        let text = plain_text(html);
        if !text.is_empty() {
            lines.push(Line::from(text));
        }
    }
    let publications = plain_text(&metadata.publications.to_html());
    if !publications.is_empty() {
        lines.push(Line::from(Span::styled(
            publications,
            Style::default().fg(Color::Gray),
        )));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL))
}

fn draw_table(frame: &mut ratatui::Frame, page: &Page<SessionHistory>, scroll: usize, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Data");
    let switcher = page.switcher();
    if !switcher.visibility().table {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    }
    let lines = table_lines(switcher.table().drawn(), scroll);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn table_lines(table: &DrawnTable, scroll: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        table.columns.join(" | "),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    for row in table.rows.iter().skip(scroll).take(TABLE_ROWS_MAX) {
        let mut spans = Vec::with_capacity(row.len() * 2);
        for (index, cell) in row.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw(" | "));
            }
            let style = if cell.href.is_some() {
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            spans.push(Span::styled(cell.text.clone(), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn plain_text(html: &str) -> String {
    TAG_RE
        .replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
