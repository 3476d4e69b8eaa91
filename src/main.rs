use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use mathquiz::app::{App, AppScreen, TierTab};
use mathquiz::config::Config;
use mathquiz::engine::difficulty::Difficulty;
use mathquiz::event::{AppEvent, EventHandler};
use mathquiz::generator::question::Letter;
use mathquiz::session::input::EntryKey;
use mathquiz::session::quiz::Phase;
use mathquiz::ui;
use mathquiz::ui::components::difficulty_select::DifficultySelect;
use mathquiz::ui::components::menu::MenuAction;
use mathquiz::ui::components::message::MessageScreen;
use mathquiz::ui::components::quiz_view::QuizView;
use mathquiz::ui::components::stats_view::StatsView;
use mathquiz::ui::layout::{AppLayout, pack_hint_lines};

const LOG_FILE: &str = "mathquiz.log";
const LOG_ENV: &str = "MATHQUIZ_LOG";

#[derive(Parser)]
#[command(name = "mathquiz", version, about = "Terminal arithmetic quiz with streak scoring")]
struct Cli {
    #[arg(short, long, help = "Directory for score and flag files")]
    data_dir: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Tick interval in milliseconds")]
    tick_rate: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(ms) = cli.tick_rate {
        config.tick_rate_ms = ms;
    }
    config.validate();

    init_logging(&config.data_path());

    let tick_rate = config.tick_rate();
    let mut app = App::new(config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Logs go to a file so the terminal UI stays clean. Without a writable
/// file, logging is off.
fn init_logging(data_dir: &Path) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let file = fs::create_dir_all(data_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(LOG_FILE))
    });
    let Ok(file) = file else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Help => handle_help_key(app, key),
        AppScreen::DifficultySelect => handle_difficulty_key(app, key),
        AppScreen::Play => handle_play_key(app, key),
        AppScreen::Statistics => handle_stats_key(app, key),
        AppScreen::Error => app.should_quit = true,
    }
}

fn run_menu_action(app: &mut App, action: MenuAction) {
    match action {
        MenuAction::Play => app.go_to_difficulty_select(),
        MenuAction::Help => app.go_to_help(),
        MenuAction::Quit => app.should_quit = true,
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                run_menu_action(app, action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                run_menu_action(app, action);
            }
        }
        _ => {}
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('b') => app.go_to_menu(),
        _ => {}
    }
}

fn handle_difficulty_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
            app.notice = None;
            app.go_to_menu();
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => app.toggle_tier_tab(),
        KeyCode::Up | KeyCode::Char('k') => app.tier_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.tier_next(),
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Enter => {
            if let Some(d) = app.selected_tier() {
                app.select_difficulty(d, now);
            }
        }
        KeyCode::Char(ch) => {
            let Some(n) = ch.to_digit(10).filter(|n| *n >= 1) else {
                return;
            };
            // The Bonus slot answers even while it is hidden.
            let tier = if app.tier_tab == TierTab::Regular && n == Difficulty::Bonus.id() {
                Some(Difficulty::Bonus)
            } else {
                app.visible_tiers().get(n as usize - 1).copied()
            };
            if let Some(d) = tier {
                app.select_difficulty(d, now);
            }
        }
        _ => {}
    }
}

fn handle_play_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    if key.code == KeyCode::Esc {
        app.leave_play(now);
        return;
    }
    let Some(session) = app.session() else {
        app.go_to_difficulty_select();
        return;
    };
    let free_entry = session.difficulty().is_free_entry();

    if let Phase::Resolved { .. } = session.phase() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
            app.continue_play(now);
        }
        return;
    }

    if free_entry {
        let entry = match key.code {
            KeyCode::Char('c') => Some(EntryKey::Clear),
            KeyCode::Char(ch) => EntryKey::from_char(ch),
            KeyCode::Backspace | KeyCode::Delete => Some(EntryKey::Delete),
            KeyCode::Enter => Some(EntryKey::Confirm),
            _ => None,
        };
        if let Some(entry) = entry {
            app.press_entry(entry, now);
        }
        return;
    }

    let letter = match key.code {
        KeyCode::Char('a') | KeyCode::Char('1') => Some(Letter::A),
        KeyCode::Char('b') | KeyCode::Char('2') => Some(Letter::B),
        KeyCode::Char('c') | KeyCode::Char('3') => Some(Letter::C),
        KeyCode::Char('d') | KeyCode::Char('4') => Some(Letter::D),
        _ => None,
    };
    if let Some(letter) = letter {
        app.answer_choice(letter, now);
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => app.go_to_difficulty_select(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_stats_tab(),
        KeyCode::Right | KeyCode::Char('l') => app.stats_next_difficulty(),
        KeyCode::Left | KeyCode::Char('h') => app.stats_prev_difficulty(),
        KeyCode::Char('o') => app.toggle_stats_sort(),
        KeyCode::PageDown | KeyCode::Down | KeyCode::Char('j') => app.stats_next_page(),
        KeyCode::PageUp | KeyCode::Up | KeyCode::Char('k') => app.stats_prev_page(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hint_lines = pack_hint_lines(screen_hints(app), area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);
    let title = match app.screen {
        AppScreen::Play => app
            .session()
            .map(|s| format!(" Playing: {} ", s.difficulty()))
            .unwrap_or_default(),
        AppScreen::Statistics => " Statistics ".to_string(),
        _ => String::new(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathquiz ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            title,
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let body = ui::layout::centered_rect(70, 90, layout.main);
    match app.screen {
        AppScreen::Menu => frame.render_widget(&app.menu, body),
        AppScreen::Help => frame.render_widget(MessageScreen::help(app.theme), body),
        AppScreen::DifficultySelect => {
            let tiers = app.visible_tiers();
            frame.render_widget(
                DifficultySelect::new(
                    app.tier_tab,
                    &tiers,
                    app.tier_selected,
                    app.notice.as_deref(),
                    app.theme,
                ),
                body,
            );
        }
        AppScreen::Play => {
            if let Some(session) = app.session() {
                frame.render_widget(QuizView::new(session, Instant::now(), app.theme), body);
            }
        }
        AppScreen::Statistics => {
            let tiers = app.stats_tiers();
            let stats = app.current_stats();
            frame.render_widget(
                StatsView {
                    tab: app.stats_tab,
                    tiers: &tiers,
                    selected: app.stats_difficulty(),
                    stats: stats.as_ref(),
                    sort: app.stats_sort,
                    page: app.stats_page,
                    now_ts: chrono::Utc::now().timestamp(),
                    theme: app.theme,
                },
                body,
            );
        }
        AppScreen::Error => {
            let msg = app.error_message.as_deref().unwrap_or("Unknown error.");
            frame.render_widget(MessageScreen::error(msg, app.theme), body);
        }
    }

    if !hint_lines.is_empty() {
        let lines: Vec<Line> = hint_lines
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.text_muted()))))
            .collect();
        frame.render_widget(Paragraph::new(lines), layout.footer);
    }
}

fn screen_hints(app: &App) -> &'static [&'static str] {
    match app.screen {
        AppScreen::Menu => &["[p] Play", "[h] Help", "[q] Quit"],
        AppScreen::Help => &["[Esc] Back"],
        AppScreen::DifficultySelect => {
            &["[1-6/Enter] Start", "[Tab] Regular/Timed", "[s] Statistics", "[Esc] Back"]
        }
        AppScreen::Play => play_hints(app),
        AppScreen::Statistics => {
            &["[Tab] Regular/Timed", "[h/l] Difficulty", "[o] Sort", "[j/k] Page", "[Esc] Back"]
        }
        AppScreen::Error => &[],
    }
}

fn play_hints(app: &App) -> &'static [&'static str] {
    let Some(session) = app.session() else {
        return &[];
    };
    match session.phase() {
        Phase::Resolved { .. } => &["[Enter] Continue", "[Esc] Leave"],
        _ if session.difficulty().is_free_entry() => {
            &["[0-9] Type", "[Backspace] Delete", "[c] Clear", "[Enter] Submit", "[Esc] Leave"]
        }
        _ => &["[a-d/1-4] Answer", "[Esc] Leave"],
    }
}
