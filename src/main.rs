use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use matchdash::dashboard::Dashboard;
use matchdash::provider;
use matchdash::state::{self, ChatRole, Panel, Resource};
use matchdash::stats;

struct App {
    dashboard: Dashboard,
    should_quit: bool,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<state::ProviderCommand>) -> Self {
        Self {
            dashboard: Dashboard::new(cmd_tx),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.dashboard.state.focus == Panel::Chat {
            self.on_chat_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.dashboard.state.cycle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.dashboard.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.dashboard.state.select_prev(),
            KeyCode::Char('r') => self.refresh_focused(),
            KeyCode::Char('1') => {
                if let Some(team) = self.dashboard.state.selected_team().cloned() {
                    self.dashboard.state.selected_team1 = Some(team);
                }
            }
            KeyCode::Char('2') => {
                if let Some(team) = self.dashboard.state.selected_team().cloned() {
                    self.dashboard.state.selected_team2 = Some(team);
                }
            }
            KeyCode::Char('p') => {
                if !self.dashboard.state.predicting {
                    self.dashboard.predict_manual();
                }
            }
            KeyCode::Char('g') => {
                if self.dashboard.state.focus == Panel::Matches
                    && !self.dashboard.state.predicting
                {
                    self.dashboard.predict_selected_match();
                }
            }
            KeyCode::Char('c') => self.dashboard.state.focus = Panel::Chat,
            KeyCode::Char('?') => {
                self.dashboard.state.help_overlay = !self.dashboard.state.help_overlay;
            }
            _ => {}
        }
    }

    fn on_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.dashboard.state.focus = Panel::Teams,
            KeyCode::Tab => self.dashboard.state.cycle_focus(),
            KeyCode::Enter => self.dashboard.submit_chat(),
            KeyCode::Backspace => {
                self.dashboard.state.chat_input.pop();
            }
            KeyCode::PageUp => {
                let state = &mut self.dashboard.state;
                state.chat_stick_to_bottom = false;
                state.chat_scroll = state.chat_scroll.saturating_sub(3);
            }
            KeyCode::PageDown => {
                let state = &mut self.dashboard.state;
                state.chat_scroll = state.chat_scroll.saturating_add(3);
            }
            KeyCode::Char(ch) => self.dashboard.state.chat_input.push(ch),
            _ => {}
        }
    }

    // Refresh of the focused panel's resource; the key is a no-op while that
    // resource is already loading so a held key cannot queue duplicates.
    fn refresh_focused(&mut self) {
        let resource = match self.dashboard.state.focus {
            Panel::Teams => Resource::Teams,
            Panel::Matches => Resource::Matches,
            Panel::Predictions | Panel::Selector => Resource::Predictions,
            Panel::Chat => return,
        };
        if !self.dashboard.state.loading(resource) {
            self.dashboard.refresh(resource);
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
    provider::spawn_provider(tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.dashboard.start();
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
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.dashboard.apply(delta);
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
    let state = &app.dashboard.state;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26),
            Constraint::Min(40),
            Constraint::Percentage(34),
        ])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(10)])
        .split(columns[0]);
    render_teams(frame, left[0], state);
    render_selector(frame, left[1], state);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(columns[1]);
    render_matches(frame, middle[0], state);
    render_predictions(frame, middle[1], state);

    render_chat(frame, columns[2], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &state::AppState) -> String {
    let backend = match &state.vector_status {
        Some(status) if status.connected => {
            format!("vector store ok ({} stored)", status.prediction_count)
        }
        Some(_) => "vector store offline".to_string(),
        None => "backend status unknown".to_string(),
    };
    format!(" (*) MATCHDASH | AI match predictions | {backend}")
}

fn footer_text(state: &state::AppState) -> String {
    if state.focus == Panel::Chat {
        "Type message | Enter Send | PgUp/PgDn Scroll | Esc Leave chat | Tab Next panel".to_string()
    } else {
        "Tab Panel | j/k Move | r Refresh | 1/2 Pick sides | p Predict | g Predict match | c Chat | ? Help | q Quit"
            .to_string()
    }
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn render_teams(frame: &mut Frame, area: Rect, state: &state::AppState) {
    let title = if state.teams_loading {
        "Teams (loading...)"
    } else {
        "Teams"
    };
    let block = panel_block(title, state.focus == Panel::Teams);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(err) = &state.teams_error {
        // Stale data stays visible; the error rides along in the console and
        // here only when there is nothing to show.
        if state.teams.is_empty() {
            let msg = Paragraph::new(err.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(msg, inner);
            return;
        }
    }
    if state.teams.is_empty() {
        let empty = Paragraph::new("No teams yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.teams_selected, state.teams.len(), visible);
    let mut lines = Vec::new();
    for idx in start..end {
        let team = &state.teams[idx];
        let cursor = if idx == state.teams_selected { ">" } else { " " };
        let side = match (
            state.selected_team1.as_ref().map(|t| t.id) == Some(team.id),
            state.selected_team2.as_ref().map(|t| t.id) == Some(team.id),
        ) {
            (true, true) => "[1,2]",
            (true, false) => "[1]",
            (false, true) => "[2]",
            (false, false) => "",
        };
        lines.push(format!("{cursor} {} {side}", team.name));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &state::AppState) {
    let title = if state.matches_loading {
        "Upcoming Matches (loading...)"
    } else {
        "Upcoming Matches"
    };
    let block = panel_block(title, state.focus == Panel::Matches);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.matches.is_empty() {
        let text = state
            .matches_error
            .clone()
            .unwrap_or_else(|| "No upcoming matches".to_string());
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.matches_selected, state.matches.len(), visible);
    let mut lines = Vec::new();
    for idx in start..end {
        let m = &state.matches[idx];
        let cursor = if idx == state.matches_selected { ">" } else { " " };
        lines.push(format!(
            "{cursor} {} vs {} | {} | {}",
            m.home_team.name, m.away_team.name, m.match_date, m.league
        ));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn render_predictions(frame: &mut Frame, area: Rect, state: &state::AppState) {
    let title = if state.predictions_loading {
        "Recent Predictions (loading...)"
    } else {
        "Recent Predictions"
    };
    let block = panel_block(title, state.focus == Panel::Predictions);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let summary = stats::summarize(&state.predictions);
    let summary_line = format!(
        "{} predictions | avg confidence {:.1}",
        summary.total, summary.avg_confidence
    );
    let summary_widget =
        Paragraph::new(summary_line).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(summary_widget, sections[0]);

    if state.predictions.is_empty() {
        let text = state
            .predictions_error
            .clone()
            .unwrap_or_else(|| "No predictions yet".to_string());
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, sections[1]);
        return;
    }

    let now = Utc::now();
    let list_area = sections[1];
    let visible = list_area.height as usize;
    let max_start = state.predictions.len().saturating_sub(visible);
    let start = (state.predictions_scroll as usize).min(max_start);
    let end = (start + visible).min(state.predictions.len());

    let mut lines = Vec::new();
    for p in &state.predictions[start..end] {
        let name = match (&p.home_team, &p.away_team) {
            (Some(home), Some(away)) => format!("{home} vs {away}"),
            _ => format!("#{} vs #{}", p.home_team_id, p.away_team_id),
        };
        let age = p
            .created_at
            .as_deref()
            .map(|at| stats::relative_age(at, now))
            .unwrap_or_else(|| "-".to_string());
        let tier = stats::tier_label(stats::confidence_tier(p.confidence));
        lines.push(format!(
            "{name}  {}-{}  {:>5.1}% {tier}  {age}  {}",
            p.predicted_home_score,
            p.predicted_away_score,
            p.confidence,
            p.league.as_deref().unwrap_or("-"),
        ));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), list_area);
}

fn render_selector(frame: &mut Frame, area: Rect, state: &state::AppState) {
    let title = if state.predicting {
        "Manual Prediction (working...)"
    } else {
        "Manual Prediction"
    };
    let block = panel_block(title, state.focus == Panel::Selector);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        format!(
            "Home: {}",
            state
                .selected_team1
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or("-")
        ),
        format!(
            "Away: {}",
            state
                .selected_team2
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or("-")
        ),
    ];
    if let Some(p) = &state.manual_prediction {
        lines.push(format!(
            "Result: {}-{} ({:.1}%)",
            p.predicted_home_score, p.predicted_away_score, p.confidence
        ));
        if !p.explanation.is_empty() {
            lines.push(p.explanation.clone());
        }
    } else if state.predicting {
        lines.push("Asking the model...".to_string());
    }

    let body = Paragraph::new(lines.join("\n")).wrap(Wrap { trim: true });
    frame.render_widget(body, inner);
}

fn render_chat(frame: &mut Frame, area: Rect, state: &state::AppState) {
    let block = panel_block("Assistant", state.focus == Panel::Chat);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let transcript = sections[0];
    let mut lines: Vec<String> = Vec::new();
    for message in &state.chat_messages {
        let speaker = match message.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "AI",
        };
        for (i, part) in message.content.lines().enumerate() {
            if i == 0 {
                lines.push(format!("{speaker}: {part}"));
            } else {
                lines.push(format!("    {part}"));
            }
        }
    }
    if state.chat_waiting {
        lines.push("AI: ...".to_string());
    }

    // After any append the transcript follows the newest entry.
    let scroll = if state.chat_stick_to_bottom {
        lines.len().saturating_sub(transcript.height as usize) as u16
    } else {
        state.chat_scroll
    };
    let body = Paragraph::new(lines.join("\n"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(body, transcript);

    let prompt = if state.chat_waiting {
        "waiting for reply...".to_string()
    } else {
        format!("> {}", state.chat_input)
    };
    let input = Paragraph::new(prompt).style(Style::default().fg(Color::Yellow));
    frame.render_widget(input, sections[1]);
}

fn console_text(state: &state::AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchdash - Help",
        "",
        "Global:",
        "  Tab          Next panel",
        "  j/k or ↑/↓   Move selection",
        "  r            Refresh focused resource",
        "  c            Focus chat",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Teams panel:",
        "  1 / 2        Pick home / away side",
        "  p            Predict picked teams",
        "",
        "Matches panel:",
        "  g            Generate prediction for match",
        "",
        "Chat:",
        "  Enter        Send",
        "  PgUp/PgDn    Scroll transcript",
        "  Esc          Leave chat",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
