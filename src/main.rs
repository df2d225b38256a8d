use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use pspicks_terminal::cache_gate::today_key;
use pspicks_terminal::config::GeminiConfig;
use pspicks_terminal::error::MSG_AUTH;
use pspicks_terminal::persist::SnapshotStore;
use pspicks_terminal::provider::spawn_picks_provider;
use pspicks_terminal::state::{
    AppState, Delta, Game, GameCategory, ProviderCommand, Tab, apply_delta, games_by_category,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_tab(Tab::Daily),
            KeyCode::Char('2') => self.state.set_tab(Tab::Single),
            KeyCode::Char('3') => self.state.set_tab(Tab::Multi),
            KeyCode::Char('4') => self.state.set_tab(Tab::Couch),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        // Single-flight guard: the refresh key is inert while a fetch runs.
        if self.state.loading {
            self.state.push_log("[INFO] Refresh ignored, sync in flight");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Refresh unavailable");
            return;
        };
        if tx.send(ProviderCommand::FetchPicks { force: true }).is_err() {
            self.state.push_log("[WARN] Refresh request failed");
        } else {
            self.state.push_log("[INFO] Forced refresh requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    let mut app = match GeminiConfig::from_env() {
        Ok(cfg) => {
            spawn_picks_provider(tx, cmd_rx, cfg, SnapshotStore::default_location());
            App::new(Some(cmd_tx))
        }
        Err(err) => {
            let mut app = App::new(None);
            app.state.loading = false;
            app.state.error = Some(MSG_AUTH.to_string());
            app.state.push_log(format!("[WARN] Config error: {err}"));
            app
        }
    };

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if app.state.loading && app.state.snapshot.is_none() {
        render_loader(frame, chunks[1]);
    } else {
        render_picks(frame, chunks[1], &app.state);
    }

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let date = state
        .snapshot
        .as_ref()
        .map(|s| s.date.clone())
        .unwrap_or_else(today_key);
    let status = if state.loading { "SYNCING" } else { "READY" };
    format!(
        "PS PICKS | {} | {} | {}\nDaily PS Plus Extra picks for your library",
        state.tab.label(),
        date,
        status
    )
}

fn footer_text(state: &AppState) -> String {
    let keys = "1 Feed | 2 Single | 3 Online | 4 Couch | j/k Move | r Refresh | ? Help | q Quit";
    match state.log.last() {
        Some(line) => format!("{keys}  {line}"),
        None => keys.to_string(),
    }
}

fn render_loader(frame: &mut Frame, area: Rect) {
    let text = "\n\nSyncing today's picks with Gemini...\n\nScanning the PS Plus Extra catalog, this can take a moment.";
    let loader = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Blue));
    frame.render_widget(loader, area);
}

enum PickRow<'a> {
    Header(&'static str),
    Game(usize, &'a Game),
}

fn build_rows(state: &AppState) -> Vec<PickRow<'_>> {
    let Some(snapshot) = &state.snapshot else {
        return Vec::new();
    };
    let categories: Vec<GameCategory> = match state.tab.category() {
        Some(category) => vec![category],
        None => GameCategory::ALL.to_vec(),
    };

    let mut rows = Vec::new();
    let mut flat = 0usize;
    for category in categories {
        let filtered = games_by_category(&snapshot.games, category);
        // Empty sections are left out entirely.
        if filtered.is_empty() {
            continue;
        }
        rows.push(PickRow::Header(category.label()));
        for game in filtered {
            rows.push(PickRow::Game(flat, game));
            flat += 1;
        }
    }
    rows
}

fn row_height(row: &PickRow) -> u16 {
    match row {
        PickRow::Header(_) => 1,
        PickRow::Game(..) => 2,
    }
}

fn render_picks(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut area = area;

    if let Some(message) = &state.error {
        let banner_area = Rect { height: 2.min(area.height), ..area };
        let banner = Paragraph::new(format!("{message}\nSee the activity log for details."))
            .style(Style::default().fg(Color::Red));
        frame.render_widget(banner, banner_area);
        let used = banner_area.height + 1;
        if area.height <= used {
            return;
        }
        area = Rect {
            y: area.y + used,
            height: area.height - used,
            ..area
        };
    }

    let rows = build_rows(state);
    if rows.is_empty() {
        let empty = Paragraph::new("No picks yet. Press r to sync.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let show_detail = area.height > 14;
    let (list_area, detail_area) = if show_detail {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(6)])
            .split(area);
        (sections[0], Some(sections[1]))
    } else {
        (area, None)
    };

    // Scroll so the selected card is fully inside the list area.
    let selected_row = rows
        .iter()
        .position(|row| matches!(row, PickRow::Game(idx, _) if *idx == state.selected))
        .unwrap_or(0);
    let mut start = 0usize;
    loop {
        let lines: u16 = rows[start..=selected_row].iter().map(row_height).sum();
        if lines <= list_area.height || start == selected_row {
            break;
        }
        start += 1;
    }

    let mut y = list_area.y;
    for row in &rows[start..] {
        let height = row_height(row);
        if y + height > list_area.y + list_area.height {
            break;
        }
        let row_area = Rect {
            x: list_area.x,
            y,
            width: list_area.width,
            height,
        };
        match row {
            PickRow::Header(label) => {
                let header = Paragraph::new(format!("[ {label} ]")).style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                );
                frame.render_widget(header, row_area);
            }
            PickRow::Game(idx, game) => {
                let selected = *idx == state.selected;
                let style = if selected {
                    Style::default().fg(Color::White).bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let card = Paragraph::new(game_card_text(game)).style(style);
                frame.render_widget(card, row_area);
            }
        }
        y += height;
    }

    if let Some(detail_area) = detail_area {
        render_detail(frame, detail_area, state);
    }
}

fn game_card_text(game: &Game) -> String {
    format!(
        "  {}  [{:.0}]\n    {} | {} | {}",
        game.title,
        game.rating,
        game.genre,
        game.platform.join("/"),
        game.playtime_label()
    )
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = state.visible_games();
    let Some(game) = visible.get(state.selected) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} ({})", game.title, game.category.label()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Rating {:.0} | {} | {}",
            game.rating,
            game.genre,
            game.playtime_label()
        )),
        Line::from(game.why_play.clone()),
        Line::from(Span::styled(
            format!("Art: {}", game.image_or_placeholder()),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if state.tab == Tab::Daily {
        if let Some(snapshot) = &state.snapshot {
            let sources: Vec<String> = snapshot
                .sources
                .iter()
                .take(3)
                .map(|s| format!("{} <{}>", s.title, s.uri))
                .collect();
            lines.push(Line::from(Span::styled(
                format!("Sources: {}", sources.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(56);
    let height = area.height.min(12);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let help = Paragraph::new(
        "PS Picks Help\n\n\
         1-4   Switch tab (Feed / Single / Online / Couch)\n\
         j/k   Move selection\n\
         r     Force refresh (bypasses today's cache)\n\
         ?     Toggle this help\n\
         q     Quit\n\n\
         Picks sync once per day; refresh forces a new fetch.",
    )
    .block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(help, popup);
}
