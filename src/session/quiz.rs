use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::engine::difficulty::{Difficulty, DifficultyCatalog, TemplateSet};
use crate::engine::scoring;
use crate::error::{QuizError, QuizResult};
use crate::generator::question::{self, Letter, Question};
use crate::session::input::{AnswerBuffer, EntryKey};
use crate::session::result::ScoreRecord;

/// Game-over screens ignore input for this long so they can be read.
pub const GAME_OVER_COOLDOWN: Duration = Duration::from_millis(500);

/// How long the "+N" indicator stays up after a correct answer.
pub const GAIN_DISPLAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Correct)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NeedsNewQuestion,
    AwaitingAnswer,
    Resolved { outcome: Outcome, at: Instant },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continue {
    NextQuestion,
    ReturnToMenu,
    CoolingDown,
    Ignored,
}

/// Where finished sessions are written.
pub trait ScoreSink {
    fn append(&mut self, record: ScoreRecord) -> QuizResult<()>;
}

pub struct QuizSession {
    difficulty: Difficulty,
    templates: TemplateSet,
    phase: Phase,
    question: Option<Question>,
    points: u32,
    streak: u32,
    last_gain: Option<(u32, Instant)>,
    question_started_at: Option<Instant>,
    session_started_at: Instant,
    entry: AnswerBuffer,
    entry_message: Option<String>,
    rng: SmallRng,
}

impl QuizSession {
    pub fn new(difficulty: Difficulty, catalog: &DifficultyCatalog, now: Instant) -> Self {
        Self::with_rng(
            difficulty,
            catalog.templates(difficulty).clone(),
            SmallRng::from_entropy(),
            now,
        )
    }

    pub fn with_rng(
        difficulty: Difficulty,
        templates: TemplateSet,
        rng: SmallRng,
        now: Instant,
    ) -> Self {
        info!(difficulty = difficulty.id(), "session started");
        Self {
            difficulty,
            templates,
            phase: Phase::NeedsNewQuestion,
            question: None,
            points: 0,
            streak: 0,
            last_gain: None,
            question_started_at: None,
            session_started_at: now,
            entry: AnswerBuffer::default(),
            entry_message: None,
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn entry(&self) -> &str {
        self.entry.as_str()
    }

    pub fn entry_message(&self) -> Option<&str> {
        self.entry_message.as_deref()
    }

    /// Points from the most recent correct answer, while the "+N" is still showing.
    pub fn recent_gain(&self, now: Instant) -> Option<u32> {
        self.last_gain
            .filter(|(_, at)| now.saturating_duration_since(*at) < GAIN_DISPLAY)
            .map(|(gain, _)| gain)
    }

    /// Generates the next question if one is due.
    pub fn advance(&mut self, now: Instant) -> QuizResult<()> {
        if self.phase != Phase::NeedsNewQuestion {
            return Ok(());
        }
        let free_entry = self.difficulty.is_free_entry();
        let q = question::generate(&self.templates, free_entry, &mut self.rng)?;
        debug!(prompt = %q.prompt, "new question");
        self.question = Some(q);
        self.question_started_at = Some(now);
        self.entry.reset();
        self.entry_message = None;
        self.phase = Phase::AwaitingAnswer;
        Ok(())
    }

    /// Periodic step: brings up a pending question and detects timeouts.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn ScoreSink) -> QuizResult<Option<Outcome>> {
        self.advance(now)?;
        if self.phase == Phase::AwaitingAnswer && self.out_of_time(now) {
            return self.finish(Outcome::TimedOut, now, sink).map(Some);
        }
        Ok(None)
    }

    pub fn submit_choice(
        &mut self,
        letter: Letter,
        now: Instant,
        sink: &mut dyn ScoreSink,
    ) -> QuizResult<Option<Outcome>> {
        if self.phase != Phase::AwaitingAnswer || self.difficulty.is_free_entry() {
            return Ok(None);
        }
        if self.out_of_time(now) {
            return self.finish(Outcome::TimedOut, now, sink).map(Some);
        }
        let correct = self
            .question
            .as_ref()
            .is_some_and(|q| q.is_correct_choice(letter));
        self.resolve(correct, now, sink).map(Some)
    }

    /// Free-entry keypad. A rejected key leaves the state untouched and keeps
    /// the message for display.
    pub fn press_entry(
        &mut self,
        key: EntryKey,
        now: Instant,
        sink: &mut dyn ScoreSink,
    ) -> QuizResult<Option<Outcome>> {
        if self.phase != Phase::AwaitingAnswer || !self.difficulty.is_free_entry() {
            return Ok(None);
        }
        self.entry_message = None;
        match key {
            EntryKey::Digit(d) => {
                self.entry.push_digit(d).map_err(|e| self.reject(e))?;
                Ok(None)
            }
            EntryKey::Delete => {
                self.entry.delete();
                Ok(None)
            }
            EntryKey::Clear => {
                self.entry.clear();
                Ok(None)
            }
            EntryKey::Confirm => {
                let value = self.entry.value().map_err(|e| self.reject(e))?;
                if self.out_of_time(now) {
                    return self.finish(Outcome::TimedOut, now, sink).map(Some);
                }
                let correct = self
                    .question
                    .as_ref()
                    .is_some_and(|q| q.is_correct_value(value));
                self.resolve(correct, now, sink).map(Some)
            }
        }
    }

    /// The player's "continue" action on a resolved question.
    pub fn continue_from_resolved(&mut self, now: Instant) -> QuizResult<Continue> {
        match self.phase {
            Phase::Resolved {
                outcome: Outcome::Correct,
                ..
            } => {
                self.phase = Phase::NeedsNewQuestion;
                self.advance(now)?;
                Ok(Continue::NextQuestion)
            }
            Phase::Resolved { at, .. } => {
                if now.saturating_duration_since(at) >= GAME_OVER_COOLDOWN {
                    Ok(Continue::ReturnToMenu)
                } else {
                    Ok(Continue::CoolingDown)
                }
            }
            _ => Ok(Continue::Ignored),
        }
    }

    /// Leaves without a terminal outcome; nothing is recorded.
    pub fn abandon(self) {
        if !self.outcome().is_some_and(Outcome::is_terminal) {
            info!(
                difficulty = self.difficulty.id(),
                points = self.points,
                "session abandoned"
            );
        }
    }

    pub fn time_budget(&self) -> Duration {
        self.difficulty.time_budget()
    }

    /// Countdown value. Frozen once the question is resolved.
    pub fn time_left(&self, now: Instant) -> Duration {
        let at = match self.phase {
            Phase::Resolved { at, .. } => at,
            _ => now,
        };
        self.time_budget().saturating_sub(self.elapsed_against_budget(at))
    }

    pub fn time_left_ratio(&self, now: Instant) -> f64 {
        let budget = self.time_budget().as_secs_f64();
        if budget <= 0.0 {
            return 0.0;
        }
        (self.time_left(now).as_secs_f64() / budget).clamp(0.0, 1.0)
    }

    fn elapsed_against_budget(&self, now: Instant) -> Duration {
        let start = if self.difficulty.is_timed() {
            Some(self.session_started_at)
        } else {
            self.question_started_at
        };
        start.map_or(Duration::ZERO, |s| now.saturating_duration_since(s))
    }

    fn out_of_time(&self, now: Instant) -> bool {
        self.elapsed_against_budget(now) >= self.time_budget()
    }

    fn reject(&mut self, err: QuizError) -> QuizError {
        if let QuizError::InputRejected(msg) = &err {
            self.entry_message = Some(msg.clone());
        }
        err
    }

    fn resolve(
        &mut self,
        correct: bool,
        now: Instant,
        sink: &mut dyn ScoreSink,
    ) -> QuizResult<Outcome> {
        if !correct {
            return self.finish(Outcome::Incorrect, now, sink);
        }

        let elapsed = self
            .question_started_at
            .map_or(Duration::ZERO, |s| now.saturating_duration_since(s));
        let award = scoring::award(self.difficulty, elapsed, self.streak);
        self.points = self.points.saturating_add(award.points);
        self.streak = award.streak;
        self.last_gain = Some((award.points, now));
        debug!(
            gained = award.points,
            streak = award.streak,
            total = self.points,
            "correct answer"
        );

        if self.difficulty.pauses_after_correct() {
            self.phase = Phase::Resolved {
                outcome: Outcome::Correct,
                at: now,
            };
        } else {
            self.phase = Phase::NeedsNewQuestion;
            self.advance(now)?;
        }
        Ok(Outcome::Correct)
    }

    fn finish(
        &mut self,
        outcome: Outcome,
        now: Instant,
        sink: &mut dyn ScoreSink,
    ) -> QuizResult<Outcome> {
        self.streak = 0;
        self.phase = Phase::Resolved { outcome, at: now };
        let record = ScoreRecord::now(self.difficulty, self.points);
        info!(
            difficulty = self.difficulty.id(),
            points = self.points,
            ?outcome,
            "session over"
        );
        sink.append(record)?;
        Ok(outcome)
    }
}
