use std::fs;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use regex::Regex;
use tempfile::TempDir;

use mathquiz::engine::difficulty::{Difficulty, DifficultyCatalog, Operator, TemplateSet};
use mathquiz::generator::question::{self, Letter};
use mathquiz::session::quiz::{Continue, Outcome, Phase, QuizSession};
use mathquiz::store::flags::FlagStore;
use mathquiz::store::score_log::ScoreStore;
use mathquiz::store::{FILE_HEADER, SCORES_FILE};

fn correct_letter(session: &QuizSession) -> Letter {
    session
        .question()
        .and_then(|q| q.choices.as_ref())
        .map(|c| c.correct)
        .unwrap()
}

fn wrong_letter(session: &QuizSession) -> Letter {
    let correct = correct_letter(session);
    Letter::ALL.into_iter().find(|l| *l != correct).unwrap()
}

#[test]
fn test_regular_session_to_stats() {
    let dir = TempDir::new().unwrap();
    let catalog = DifficultyCatalog::builtin().unwrap();
    let mut store = ScoreStore::open(dir.path()).unwrap();

    let t0 = Instant::now();
    let mut session = QuizSession::with_rng(
        Difficulty::Hard,
        catalog.templates(Difficulty::Hard).clone(),
        SmallRng::seed_from_u64(7),
        t0,
    );
    session.tick(t0, &mut store).unwrap();

    // Three quick answers: streaks 1, 2, 3 on a sqrt curve give 1 + 2 + 2.
    let mut now = t0;
    for _ in 0..3 {
        now += Duration::from_secs(1);
        let letter = correct_letter(&session);
        assert_eq!(
            session.submit_choice(letter, now, &mut store).unwrap(),
            Some(Outcome::Correct)
        );
        assert_eq!(session.continue_from_resolved(now).unwrap(), Continue::NextQuestion);
    }
    assert_eq!(session.points(), 5);
    assert_eq!(session.streak(), 3);
    assert!(store.records().is_empty());

    now += Duration::from_secs(1);
    let letter = wrong_letter(&session);
    assert_eq!(
        session.submit_choice(letter, now, &mut store).unwrap(),
        Some(Outcome::Incorrect)
    );
    assert_eq!(session.streak(), 0);

    let stats = store.query(Difficulty::Hard);
    assert_eq!(stats.count, 1);
    assert_eq!(stats.max, Some(5));
    assert_eq!(stats.average, Some(5.0));

    drop(store);
    let reopened = ScoreStore::open(dir.path()).unwrap();
    assert_eq!(reopened.query(Difficulty::Hard).count, 1);
    let content = fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap();
    let line_re = Regex::new(r"^\d+ 3 5$").unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(FILE_HEADER));
    assert!(line_re.is_match(lines.next().unwrap()));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_timed_session_runs_until_clock_expires() {
    let dir = TempDir::new().unwrap();
    let catalog = DifficultyCatalog::builtin().unwrap();
    let mut store = ScoreStore::open(dir.path()).unwrap();

    let t0 = Instant::now();
    let mut session = QuizSession::with_rng(
        Difficulty::Timed30,
        catalog.templates(Difficulty::Timed30).clone(),
        SmallRng::seed_from_u64(11),
        t0,
    );
    session.tick(t0, &mut store).unwrap();

    let mut now = t0;
    for _ in 0..10 {
        now += Duration::from_secs(2);
        let letter = correct_letter(&session);
        assert_eq!(
            session.submit_choice(letter, now, &mut store).unwrap(),
            Some(Outcome::Correct)
        );
        // No pause between questions.
        assert_eq!(session.phase(), Phase::AwaitingAnswer);
        assert_eq!(session.tick(now, &mut store).unwrap(), None);
    }
    let points = session.points();
    assert!(points >= 10);

    assert_eq!(
        session.tick(t0 + Duration::from_secs(30), &mut store).unwrap(),
        Some(Outcome::TimedOut)
    );
    assert_eq!(session.outcome(), Some(Outcome::TimedOut));
    assert_eq!(session.time_left(t0 + Duration::from_secs(40)), Duration::ZERO);

    let stats = store.query(Difficulty::Timed30);
    assert_eq!(stats.count, 1);
    assert_eq!(stats.max, Some(points));

    assert_eq!(
        session.continue_from_resolved(t0 + Duration::from_secs(31)).unwrap(),
        Continue::ReturnToMenu
    );
}

#[test]
fn test_every_tier_generates_valid_questions() {
    let catalog = DifficultyCatalog::builtin().unwrap();
    let prompt_re = Regex::new(r"^What is \d+ [+\x{2212}\x{00D7}\x{00F7}] \d+\?$").unwrap();
    let mut rng = SmallRng::seed_from_u64(2024);

    for difficulty in Difficulty::ALL {
        let templates: &TemplateSet = catalog.templates(difficulty);
        for _ in 0..300 {
            let q = question::generate(templates, difficulty.is_free_entry(), &mut rng).unwrap();
            assert!(prompt_re.is_match(&q.prompt), "{difficulty}: {}", q.prompt);

            let (a, b) = q.operands;
            match q.operator {
                Operator::Sub => assert!(a > b, "{difficulty}: {}", q.prompt),
                Operator::Div => assert_eq!(a % b, 0, "{difficulty}: {}", q.prompt),
                _ => {}
            }

            match &q.choices {
                None => assert!(difficulty.is_free_entry()),
                Some(choices) => {
                    let mut values = choices.values.to_vec();
                    values.sort_unstable();
                    values.dedup();
                    assert_eq!(values.len(), 4, "{difficulty}: {:?}", choices.values);
                    let hits = choices
                        .values
                        .iter()
                        .filter(|v| **v == q.correct_value)
                        .count();
                    assert_eq!(hits, 1);
                    assert_eq!(choices.value(choices.correct), q.correct_value);
                }
            }
        }
    }
}

#[test]
fn test_easy_tier_never_multiplies_or_divides() {
    let catalog = DifficultyCatalog::builtin().unwrap();
    let mut rng = SmallRng::seed_from_u64(5);
    for _ in 0..500 {
        let q = question::generate(catalog.templates(Difficulty::Easy), false, &mut rng).unwrap();
        assert!(matches!(q.operator, Operator::Add | Operator::Sub));
    }
}

#[test]
fn test_unlock_flag_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut flags = FlagStore::open(dir.path()).unwrap();
        assert!(!flags.bonus_unlocked());
        assert!(flags.unlock_bonus().unwrap());
    }
    let mut flags = FlagStore::open(dir.path()).unwrap();
    assert!(flags.bonus_unlocked());
    let before = fs::read_to_string(flags.path()).unwrap();
    flags.unlock_bonus().unwrap();
    assert_eq!(fs::read_to_string(flags.path()).unwrap(), before);
}

#[test]
fn test_abandoned_session_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let catalog = DifficultyCatalog::builtin().unwrap();
    let mut store = ScoreStore::open(dir.path()).unwrap();
    let t0 = Instant::now();
    let mut session = QuizSession::new(Difficulty::Normal, &catalog, t0);
    session.tick(t0, &mut store).unwrap();
    session.abandon();
    assert!(store.records().is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap(),
        format!("{FILE_HEADER}\n")
    );
}
