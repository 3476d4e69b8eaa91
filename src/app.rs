use std::path::Path;
use std::time::Instant;

use tracing::{error, info};

use crate::config::Config;
use crate::engine::difficulty::{Difficulty, DifficultyCatalog};
use crate::error::{QuizError, QuizResult};
use crate::generator::question::Letter;
use crate::session::input::EntryKey;
use crate::session::quiz::{Continue, Outcome, QuizSession};
use crate::store::flags::FlagStore;
use crate::store::score_log::ScoreStore;
use crate::store::stats::{DifficultyStats, SortOrder};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Help,
    DifficultySelect,
    Play,
    Statistics,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TierTab {
    #[default]
    Regular,
    Timed,
}

impl TierTab {
    pub fn toggle(self) -> Self {
        match self {
            TierTab::Regular => TierTab::Timed,
            TierTab::Timed => TierTab::Regular,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TierTab::Regular => "Regular",
            TierTab::Timed => "Timed",
        }
    }

    /// Tiers listed under this tab. Bonus stays hidden until unlocked.
    pub fn tiers(self, bonus_unlocked: bool) -> Vec<Difficulty> {
        match self {
            TierTab::Regular => Difficulty::REGULAR
                .into_iter()
                .filter(|d| bonus_unlocked || *d != Difficulty::Bonus)
                .collect(),
            TierTab::Timed => Difficulty::TIMED.to_vec(),
        }
    }
}

/// Both persisted files, opened together at startup.
pub struct Storage {
    pub scores: ScoreStore,
    pub flags: FlagStore,
}

impl Storage {
    pub fn open(data_dir: &Path) -> QuizResult<Self> {
        Ok(Self {
            scores: ScoreStore::open(data_dir)?,
            flags: FlagStore::open(data_dir)?,
        })
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub tier_tab: TierTab,
    pub tier_selected: usize,
    pub stats_tab: TierTab,
    pub stats_selected: usize,
    pub stats_sort: SortOrder,
    pub stats_page: usize,
    pub notice: Option<String>,
    pub error_message: Option<String>,
    pub should_quit: bool,
    catalog: Option<DifficultyCatalog>,
    storage: Option<Storage>,
    session: Option<QuizSession>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        Self::with_theme(config, theme)
    }

    pub fn with_theme(config: Config, theme: &'static Theme) -> Self {
        let mut app = Self {
            screen: AppScreen::Menu,
            config,
            theme,
            menu: Menu::new(theme),
            tier_tab: TierTab::Regular,
            tier_selected: 0,
            stats_tab: TierTab::Regular,
            stats_selected: 0,
            stats_sort: SortOrder::default(),
            stats_page: 0,
            notice: None,
            error_message: None,
            should_quit: false,
            catalog: None,
            storage: None,
            session: None,
        };

        match DifficultyCatalog::builtin() {
            Ok(catalog) => app.catalog = Some(catalog),
            Err(e) => {
                app.fail(e);
                return app;
            }
        }
        match Storage::open(&app.config.data_path()) {
            Ok(storage) => app.storage = Some(storage),
            Err(e) => app.fail(e),
        }
        app
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    pub fn bonus_unlocked(&self) -> bool {
        self.storage
            .as_ref()
            .is_some_and(|s| s.flags.bonus_unlocked())
    }

    /// Moves to the terminal error screen. The active session is dropped
    /// without writing anything further.
    pub fn fail(&mut self, err: QuizError) {
        error!(error = %err, "fatal error");
        self.error_message = Some(err.to_string());
        self.session = None;
        self.screen = AppScreen::Error;
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_help(&mut self) {
        self.screen = AppScreen::Help;
    }

    pub fn go_to_difficulty_select(&mut self) {
        self.screen = AppScreen::DifficultySelect;
        self.clamp_tier_selection();
    }

    pub fn go_to_stats(&mut self) {
        self.notice = None;
        self.stats_tab = self.tier_tab;
        self.stats_selected = 0;
        self.stats_page = 0;
        self.screen = AppScreen::Statistics;
    }

    // Difficulty select

    pub fn visible_tiers(&self) -> Vec<Difficulty> {
        self.tier_tab.tiers(self.bonus_unlocked())
    }

    pub fn toggle_tier_tab(&mut self) {
        self.tier_tab = self.tier_tab.toggle();
        self.tier_selected = 0;
    }

    pub fn tier_next(&mut self) {
        let count = self.visible_tiers().len();
        if count > 0 {
            self.tier_selected = (self.tier_selected + 1) % count;
        }
    }

    pub fn tier_prev(&mut self) {
        let count = self.visible_tiers().len();
        if count > 0 {
            self.tier_selected = (self.tier_selected + count - 1) % count;
        }
    }

    pub fn selected_tier(&self) -> Option<Difficulty> {
        self.visible_tiers().get(self.tier_selected).copied()
    }

    fn clamp_tier_selection(&mut self) {
        let count = self.visible_tiers().len();
        if self.tier_selected >= count {
            self.tier_selected = count.saturating_sub(1);
        }
    }

    /// Picking the locked Bonus tier unlocks it instead of starting a game.
    pub fn select_difficulty(&mut self, difficulty: Difficulty, now: Instant) {
        self.notice = None;
        if difficulty == Difficulty::Bonus && !self.bonus_unlocked() {
            let Some(storage) = self.storage.as_mut() else {
                return;
            };
            match storage.flags.unlock_bonus() {
                Ok(_) => {
                    info!("bonus difficulty unlocked");
                    self.notice = Some("Bonus difficulty unlocked!".to_string());
                }
                Err(e) => self.fail(e),
            }
            return;
        }
        self.start_session(difficulty, now);
    }

    pub fn start_session(&mut self, difficulty: Difficulty, now: Instant) {
        let Some(catalog) = self.catalog.as_ref() else {
            return;
        };
        let mut session = QuizSession::new(difficulty, catalog, now);
        if let Err(e) = session.advance(now) {
            self.fail(e);
            return;
        }
        self.session = Some(session);
        self.screen = AppScreen::Play;
    }

    // Play

    pub fn on_tick(&mut self, now: Instant) {
        let (Some(session), Some(storage)) = (self.session.as_mut(), self.storage.as_mut()) else {
            return;
        };
        let result = session.tick(now, &mut storage.scores);
        self.settle(result);
    }

    pub fn answer_choice(&mut self, letter: Letter, now: Instant) -> Option<Outcome> {
        let (Some(session), Some(storage)) = (self.session.as_mut(), self.storage.as_mut()) else {
            return None;
        };
        let result = session.submit_choice(letter, now, &mut storage.scores);
        self.settle(result)
    }

    pub fn press_entry(&mut self, key: EntryKey, now: Instant) -> Option<Outcome> {
        let (Some(session), Some(storage)) = (self.session.as_mut(), self.storage.as_mut()) else {
            return None;
        };
        let result = session.press_entry(key, now, &mut storage.scores);
        self.settle(result)
    }

    /// Rejected keypad input stays on the session as a message. Anything
    /// else, such as a failed score write, ends on the error screen.
    fn settle(&mut self, result: QuizResult<Option<Outcome>>) -> Option<Outcome> {
        match result {
            Ok(outcome) => outcome,
            Err(e) if !e.is_fatal() => None,
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    pub fn continue_play(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.continue_from_resolved(now) {
            Ok(Continue::ReturnToMenu) => {
                self.session = None;
                self.go_to_menu();
            }
            Ok(_) => {}
            Err(e) => self.fail(e),
        }
    }

    /// Esc during play. A game-over screen still waits out its cool-down
    /// and then leaves the same way Enter does.
    pub fn leave_play(&mut self, now: Instant) {
        let game_over = self
            .session
            .as_ref()
            .and_then(QuizSession::outcome)
            .is_some_and(Outcome::is_terminal);
        if game_over {
            self.continue_play(now);
        } else {
            self.abandon_session();
        }
    }

    pub fn abandon_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.abandon();
        }
        self.go_to_difficulty_select();
    }

    // Statistics

    pub fn stats_tiers(&self) -> Vec<Difficulty> {
        self.stats_tab.tiers(self.bonus_unlocked())
    }

    pub fn stats_difficulty(&self) -> Option<Difficulty> {
        self.stats_tiers().get(self.stats_selected).copied()
    }

    pub fn current_stats(&self) -> Option<DifficultyStats> {
        let difficulty = self.stats_difficulty()?;
        Some(self.storage.as_ref()?.scores.query(difficulty))
    }

    pub fn toggle_stats_tab(&mut self) {
        self.stats_tab = self.stats_tab.toggle();
        self.stats_selected = 0;
        self.stats_page = 0;
    }

    pub fn stats_next_difficulty(&mut self) {
        let count = self.stats_tiers().len();
        if count > 0 {
            self.stats_selected = (self.stats_selected + 1) % count;
            self.stats_page = 0;
        }
    }

    pub fn stats_prev_difficulty(&mut self) {
        let count = self.stats_tiers().len();
        if count > 0 {
            self.stats_selected = (self.stats_selected + count - 1) % count;
            self.stats_page = 0;
        }
    }

    pub fn toggle_stats_sort(&mut self) {
        self.stats_sort = self.stats_sort.toggle();
        self.stats_page = 0;
    }

    pub fn stats_next_page(&mut self) {
        let pages = self.current_stats().map_or(1, |s| s.page_count());
        if self.stats_page + 1 < pages {
            self.stats_page += 1;
        }
    }

    pub fn stats_prev_page(&mut self) {
        self.stats_page = self.stats_page.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;
    use crate::session::quiz::Phase;
    use crate::store::{FILE_HEADER, SCORES_FILE};
    use tempfile::TempDir;

    fn make_test_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Config::default()
        };
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let app = App::with_theme(config, theme);
        (dir, app)
    }

    fn wrong_letter(app: &App) -> Letter {
        let q = app.session().unwrap().question().unwrap();
        Letter::ALL
            .into_iter()
            .find(|l| !q.is_correct_choice(*l))
            .unwrap()
    }

    #[test]
    fn test_starts_on_menu() {
        let (_dir, app) = make_test_app();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.storage().is_some());
        assert!(!app.bonus_unlocked());
    }

    #[test]
    fn test_corrupt_score_file_shows_error_screen() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SCORES_FILE), "garbage\n").unwrap();
        let config = Config {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Config::default()
        };
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let app = App::with_theme(config, theme);
        assert_eq!(app.screen, AppScreen::Error);
        assert!(app.error_message.as_deref().unwrap().contains("rename the file"));
        assert_eq!(fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap(), "garbage\n");
    }

    #[test]
    fn test_bonus_hidden_until_unlocked() {
        let (_dir, mut app) = make_test_app();
        assert!(!app.visible_tiers().contains(&Difficulty::Bonus));

        let now = Instant::now();
        app.select_difficulty(Difficulty::Bonus, now);
        assert!(app.session().is_none());
        assert!(app.bonus_unlocked());
        assert!(app.notice.is_some());
        assert!(app.visible_tiers().contains(&Difficulty::Bonus));

        app.select_difficulty(Difficulty::Bonus, now);
        assert_eq!(app.screen, AppScreen::Play);
        assert_eq!(app.session().unwrap().difficulty(), Difficulty::Bonus);
    }

    #[test]
    fn test_wrong_answer_records_and_returns_after_cooldown() {
        let (dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Easy, t0);
        assert_eq!(app.screen, AppScreen::Play);
        assert_eq!(app.session().unwrap().phase(), Phase::AwaitingAnswer);

        let letter = wrong_letter(&app);
        assert_eq!(app.answer_choice(letter, t0), Some(Outcome::Incorrect));
        assert_eq!(app.current_stats().unwrap().count, 1);

        app.continue_play(t0 + Duration::from_millis(100));
        assert_eq!(app.screen, AppScreen::Play);
        app.continue_play(t0 + Duration::from_millis(600));
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.session().is_none());

        let content = fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap();
        assert!(content.starts_with(FILE_HEADER));
        assert!(content.trim_end().ends_with(" 1 0"));
    }

    #[test]
    fn test_abandon_writes_nothing() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Hard, t0);
        app.abandon_session();
        assert_eq!(app.screen, AppScreen::DifficultySelect);
        assert!(app.storage().unwrap().scores.records().is_empty());
    }

    #[test]
    fn test_esc_on_game_over_waits_for_cooldown() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Easy, t0);
        let letter = wrong_letter(&app);
        assert_eq!(app.answer_choice(letter, t0), Some(Outcome::Incorrect));

        app.leave_play(t0);
        assert_eq!(app.screen, AppScreen::Play);
        assert_eq!(app.session().unwrap().outcome(), Some(Outcome::Incorrect));

        app.leave_play(t0 + Duration::from_millis(600));
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.session().is_none());
        assert_eq!(app.storage().unwrap().scores.records().len(), 1);
    }

    #[test]
    fn test_esc_mid_game_abandons_at_once() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Hard, t0);
        let q = app.session().unwrap().question().unwrap();
        let correct = q.choices.as_ref().unwrap().correct;
        assert_eq!(app.answer_choice(correct, t0), Some(Outcome::Correct));

        app.leave_play(t0);
        assert_eq!(app.screen, AppScreen::DifficultySelect);
        assert!(app.session().is_none());
        assert!(app.storage().unwrap().scores.records().is_empty());
    }

    #[test]
    fn test_failed_score_write_shows_error_screen() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Easy, t0);
        let err = QuizError::Io(std::io::Error::other("disk full"));
        assert_eq!(app.settle(Err(err)), None);
        assert_eq!(app.screen, AppScreen::Error);
        assert!(app.session().is_none());
        assert!(app.error_message.as_deref().unwrap().contains("disk full"));
    }

    #[test]
    fn test_rejected_input_stays_in_play() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Easy, t0);
        let err = QuizError::InputRejected("Please enter a number.".to_string());
        assert_eq!(app.settle(Err(err)), None);
        assert_eq!(app.screen, AppScreen::Play);
        assert!(app.session().is_some());
    }

    #[test]
    fn test_tick_times_out_question() {
        let (_dir, mut app) = make_test_app();
        let t0 = Instant::now();
        app.select_difficulty(Difficulty::Normal, t0);
        app.on_tick(t0 + Duration::from_secs(3));
        assert_eq!(app.session().unwrap().outcome(), None);
        app.on_tick(t0 + Duration::from_secs(10));
        assert_eq!(app.session().unwrap().outcome(), Some(Outcome::TimedOut));
        assert_eq!(app.storage().unwrap().scores.records().len(), 1);
    }

    #[test]
    fn test_rejected_entry_is_not_fatal() {
        let (_dir, mut app) = make_test_app();
        let now = Instant::now();
        app.select_difficulty(Difficulty::Bonus, now);
        app.select_difficulty(Difficulty::Bonus, now);
        assert_eq!(app.press_entry(EntryKey::Confirm, now), None);
        assert_eq!(app.screen, AppScreen::Play);
        assert_eq!(
            app.session().unwrap().entry_message(),
            Some("Please enter a number.")
        );
    }

    #[test]
    fn test_tier_navigation_wraps() {
        let (_dir, mut app) = make_test_app();
        app.go_to_difficulty_select();
        assert_eq!(app.selected_tier(), Some(Difficulty::Easy));
        app.tier_prev();
        assert_eq!(app.selected_tier(), Some(Difficulty::Insane));
        app.toggle_tier_tab();
        assert_eq!(app.selected_tier(), Some(Difficulty::Timed30));
        app.tier_next();
        app.tier_next();
        app.tier_next();
        assert_eq!(app.selected_tier(), Some(Difficulty::Timed30));
    }

    #[test]
    fn test_stats_pages_clamp() {
        let (_dir, mut app) = make_test_app();
        {
            let storage = app.storage.as_mut().unwrap();
            for i in 0..10 {
                storage
                    .scores
                    .append(crate::session::result::ScoreRecord::new(i, Difficulty::Easy, i as u32))
                    .unwrap();
            }
        }
        app.go_to_stats();
        assert_eq!(app.stats_difficulty(), Some(Difficulty::Easy));
        app.stats_next_page();
        app.stats_next_page();
        assert_eq!(app.stats_page, 1);
        app.stats_prev_page();
        app.stats_prev_page();
        assert_eq!(app.stats_page, 0);

        app.stats_next_difficulty();
        assert_eq!(app.stats_difficulty(), Some(Difficulty::Normal));
        assert_eq!(app.current_stats().unwrap().count, 0);
        app.toggle_stats_tab();
        assert_eq!(app.stats_difficulty(), Some(Difficulty::Timed30));
    }
}
