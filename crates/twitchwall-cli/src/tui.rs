//! Interactive terminal dashboard

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::*;

use twitchwall::entry::channel_of;
use twitchwall::resize::embed_size;
use twitchwall::{DashboardCommand, StreamEntry, TileChrome, TileSize};
use twitchwall_app::app::DashboardController;
use twitchwall_app::providers::KeyboardDragDrop;

use crate::Session;

/// Header and control bar heights of a tile, in pixels
const CHROME: TileChrome = TileChrome::new(30, 34);

/// Pixels added or removed per resize key press
const RESIZE_STEP: i32 = 50;

/// Grid cell size in terminal cells
const CELL_WIDTH: u16 = 40;
const CELL_HEIGHT: u16 = 6;

enum Mode {
    Browse,
    /// Typing channel names to add
    Adding(String),
}

struct App {
    controller: DashboardController,
    dragdrop: KeyboardDragDrop,
    /// Index into the displayed tiles
    selected: usize,
    show_hidden: bool,
    mode: Mode,
    status: String,
    columns: usize,
    running: bool,
}

impl App {
    fn new(session: Session) -> Self {
        let status = match &session.fetch_error {
            Some(e) => format!("Error fetching streamers list: {e}"),
            None => format!("{} streams", session.controller.registry().len()),
        };
        Self {
            controller: session.controller,
            dragdrop: session.dragdrop,
            selected: 0,
            show_hidden: false,
            mode: Mode::Browse,
            status,
            columns: 1,
            running: true,
        }
    }

    /// Tile ids on screen, in registry order
    fn base_order(&self) -> Vec<String> {
        self.controller
            .registry()
            .entries()
            .iter()
            .filter(|e| self.show_hidden || e.is_visible())
            .map(|e| e.id.clone())
            .collect()
    }

    /// Tile ids on screen, with the dragged tile at its preview slot
    fn displayed(&self) -> Vec<String> {
        self.dragdrop.preview(&self.base_order())
    }

    fn selected_entry(&self) -> Option<StreamEntry> {
        let id = self.displayed().get(self.selected)?.clone();
        self.controller.registry().get(&id).cloned()
    }

    fn clamp_selection(&mut self) {
        let len = self.displayed().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select_by(&mut self, delta: isize) {
        let last = self.displayed().len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    /// Apply a command; the status shows `done` on success, the error otherwise
    fn dispatch(&mut self, command: DashboardCommand, done: String) {
        self.status = match self.controller.handle(command) {
            Ok(_) => done,
            Err(e) => e.to_string(),
        };
        self.clamp_selection();
    }

    fn on_key(&mut self, code: KeyCode) {
        if let Mode::Adding(input) = &mut self.mode {
            match code {
                KeyCode::Enter => {
                    let text = std::mem::take(input);
                    self.mode = Mode::Browse;
                    self.add_streams(&text);
                }
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return;
        }

        if self.dragdrop.is_dragging() {
            self.on_drag_key(code);
            return;
        }

        let columns = self.columns as isize;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Left => self.select_by(-1),
            KeyCode::Right => self.select_by(1),
            KeyCode::Up => self.select_by(-columns),
            KeyCode::Down => self.select_by(columns),
            KeyCode::Char(' ') | KeyCode::Char('g') => self.grab(),
            KeyCode::Char('x') => self.toggle_hidden(),
            KeyCode::Char('h') => {
                self.show_hidden = !self.show_hidden;
                self.clamp_selection();
            }
            KeyCode::Char('u') => {
                self.dispatch(DashboardCommand::UnhideAll, "All streams shown".to_string());
            }
            KeyCode::Char('a') => {
                self.dispatch(
                    DashboardCommand::ShowAll,
                    "All streams shown, grid restored".to_string(),
                );
            }
            KeyCode::Char('r') => {
                self.dispatch(DashboardCommand::ResetLayout, "Layout reset".to_string());
            }
            KeyCode::Char('i') => self.mode = Mode::Adding(String::new()),
            KeyCode::Char('+') | KeyCode::Char('=') => self.resize_selected(RESIZE_STEP),
            KeyCode::Char('-') => self.resize_selected(-RESIZE_STEP),
            _ => {}
        }
    }

    fn on_drag_key(&mut self, code: KeyCode) {
        let len = self.base_order().len();
        let columns = self.columns as isize;
        match code {
            KeyCode::Left => self.dragdrop.move_by(len, -1),
            KeyCode::Right => self.dragdrop.move_by(len, 1),
            KeyCode::Up => self.dragdrop.move_by(len, -columns),
            KeyCode::Down => self.dragdrop.move_by(len, columns),
            KeyCode::Char(' ') | KeyCode::Char('g') | KeyCode::Enter => self.drop_grabbed(),
            KeyCode::Esc => {
                self.dragdrop.cancel();
                self.status = "Move cancelled".to_string();
                self.clamp_selection();
            }
            _ => {}
        }

        // Selection follows the dragged tile
        let displayed = self.displayed();
        let position = self
            .dragdrop
            .grabbed()
            .and_then(|id| displayed.iter().position(|d| d == id));
        if let Some(position) = position {
            self.selected = position;
        }
    }

    fn grab(&mut self) {
        let order = self.base_order();
        let Some(id) = order.get(self.selected).cloned() else {
            return;
        };
        if self.dragdrop.grab(&order, &id) {
            self.status = format!("Moving {}", channel_of(&id));
        }
    }

    fn drop_grabbed(&mut self) {
        let order = self.base_order();
        match self.dragdrop.drop_grabbed(&order) {
            Some(gesture) => {
                self.controller.drain();
                self.status = format!("Moved {}", channel_of(&gesture.id));
            }
            None => self.status = "Not moved".to_string(),
        }
    }

    fn toggle_hidden(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if entry.is_visible() {
            let done = format!("Hid {}", entry.channel);
            self.dispatch(DashboardCommand::Hide(entry.id), done);
        } else {
            let done = format!("Showing {}", entry.channel);
            self.dispatch(DashboardCommand::Unhide(entry.id), done);
        }
    }

    fn resize_selected(&mut self, delta: i32) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let current = entry.size.unwrap_or(TileSize::MIN);
        let size = TileSize::new(
            current.width.saturating_add_signed(delta),
            current.height.saturating_add_signed(delta),
        );
        self.dragdrop.resize(&entry.id, size);
        self.controller.drain();
    }

    /// Comma or space separated input becomes one channel per line
    fn add_streams(&mut self, input: &str) {
        let text = input.replace([',', ' '], "\n");
        match self.controller.handle(DashboardCommand::AddStreams(text)) {
            Ok(t) => self.status = format!("Added {} streams", t.added.len()),
            Err(e) => self.status = e.to_string(),
        }
    }
}

pub(crate) fn run(session: Session) -> io::Result<()> {
    let mut app = App::new(session);

    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    while app.running {
        app.columns = columns_for(terminal.size()?.width);
        terminal.draw(|f| draw_ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.controller.drain();
        }
    }
    Ok(())
}

/// Grid columns that fit in a terminal `width` cells wide
fn columns_for(width: u16) -> usize {
    (width.saturating_sub(2) / CELL_WIDTH).max(1) as usize
}

fn draw_ui(f: &mut Frame, app: &App) {
    let area = f.area();

    let outer = Block::default()
        .title(format!(" Twitchwall v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::vertical([
        Constraint::Min(CELL_HEIGHT), // tiles
        Constraint::Length(1),        // status
        Constraint::Length(1),        // help bar
    ])
    .split(inner);

    draw_grid(f, app, chunks[0]);
    draw_status(f, app, chunks[1]);
    draw_help(f, app, chunks[2]);
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let ids = app.displayed();
    if ids.is_empty() {
        let text = Line::styled("  No streams", Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(text), area);
        return;
    }

    let columns = app.columns.max(1);
    let rows_on_screen = ((area.height / CELL_HEIGHT) as usize).max(1);
    let first_row = (app.selected / columns).saturating_sub(rows_on_screen - 1);
    let skip = first_row * columns;

    let registry = app.controller.registry();
    for (index, id) in ids.iter().enumerate().skip(skip).take(rows_on_screen * columns) {
        let Some(entry) = registry.get(id) else {
            continue;
        };
        let slot = index - skip;
        let cell = Rect {
            x: area.x + (slot % columns) as u16 * CELL_WIDTH,
            y: area.y + (slot / columns) as u16 * CELL_HEIGHT,
            width: CELL_WIDTH,
            height: CELL_HEIGHT,
        };
        draw_tile(f, app, entry, index == app.selected, cell.intersection(area));
    }
}

fn draw_tile(f: &mut Frame, app: &App, entry: &StreamEntry, selected: bool, area: Rect) {
    let grabbed = app.dragdrop.grabbed() == Some(entry.id.as_str());
    let border_color = if grabbed {
        Color::Cyan
    } else if selected {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title_style = if entry.is_visible() {
        Style::default().fg(Color::White).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .title(Line::styled(format!(" {} ", entry.channel), title_style))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let (state, state_color) = if entry.is_visible() {
        ("visible", Color::Green)
    } else {
        ("hidden", Color::Red)
    };
    let size = match entry.size {
        Some(size) => {
            let player = embed_size(size, CHROME);
            format!(
                "{}x{} (player {}x{})",
                size.width, size.height, player.width, player.height
            )
        }
        None => "grid".to_string(),
    };
    let url = app
        .controller
        .embed(&entry.id)
        .map(|h| h.url.as_str())
        .unwrap_or("---");
    let max_url_len = area.width.saturating_sub(11) as usize;

    let text = vec![
        Line::from(vec![
            Span::styled("  #", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", entry.position + 1),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            Span::styled(state, Style::default().fg(state_color)),
        ]),
        Line::from(vec![
            Span::styled("  Size: ", Style::default().fg(Color::DarkGray)),
            Span::styled(size, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("  Embed: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate_str(url, max_url_len),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.mode {
        Mode::Adding(input) => Line::from(vec![
            Span::styled("  Add streams: ", Style::default().fg(Color::Yellow)),
            Span::styled(format!("{input}_"), Style::default().fg(Color::White)),
        ]),
        Mode::Browse => {
            let registry = app.controller.registry();
            let hidden = registry.hidden_ids().len();
            Line::from(vec![
                Span::styled(
                    format!("  {} shown, {} hidden  ", registry.len() - hidden, hidden),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(&app.status, Style::default().fg(Color::White)),
            ])
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let help = if app.dragdrop.is_dragging() {
        Line::from(vec![
            key("  arrows "),
            Span::raw("move  |  "),
            key("space "),
            Span::raw("drop  |  "),
            key("esc "),
            Span::raw("cancel"),
        ])
    } else if let Mode::Adding(_) = app.mode {
        Line::from(vec![
            key("  enter "),
            Span::raw("add  |  "),
            key("esc "),
            Span::raw("cancel"),
        ])
    } else {
        Line::from(vec![
            key("  'q' "),
            Span::raw("quit  |  "),
            key("space "),
            Span::raw("grab  |  "),
            key("'x' "),
            Span::raw("hide  |  "),
            key("'h' "),
            Span::raw(if app.show_hidden { "hide hidden  |  " } else { "list hidden  |  " }),
            key("'u'/'a' "),
            Span::raw("unhide/show all  |  "),
            key("'i' "),
            Span::raw("add  |  "),
            key("'+'/'-' "),
            Span::raw("size  |  "),
            key("'r' "),
            Span::raw("reset"),
        ])
    };
    f.render_widget(Paragraph::new(help).alignment(Alignment::Left), area);
}

fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}
