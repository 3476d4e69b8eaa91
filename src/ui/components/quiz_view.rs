use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::quiz::{Outcome, Phase, QuizSession};
use crate::ui::components::progress_bar::CountdownBar;
use crate::ui::theme::Theme;

pub struct QuizView<'a> {
    pub session: &'a QuizSession,
    pub now: Instant,
    pub theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(session: &'a QuizSession, now: Instant, theme: &'a Theme) -> Self {
        Self {
            session,
            now,
            theme,
        }
    }
}

pub fn points_label(points: u32) -> String {
    if points == 1 {
        "1 point".to_string()
    } else {
        format!("{points} points")
    }
}

/// Banner shown once a question is resolved.
pub fn outcome_message(
    outcome: Outcome,
    timed: bool,
    answer_label: &str,
    points: u32,
) -> Vec<String> {
    match outcome {
        Outcome::Correct => vec!["Correct!".to_string(), "(Press Enter to continue.)".to_string()],
        Outcome::Incorrect => vec![
            "Oops!".to_string(),
            format!("The correct answer was {answer_label}."),
            format!("You finished with {}.", points_label(points)),
            "(Press Enter to return to the menu.)".to_string(),
        ],
        Outcome::TimedOut if timed => vec![
            "You ran out of time!".to_string(),
            format!("You finished with {}.", points_label(points)),
            "(Press Enter to return to the menu.)".to_string(),
        ],
        Outcome::TimedOut => vec![
            "You ran out of time!".to_string(),
            format!("The correct answer was {answer_label}."),
            format!("You finished with {}.", points_label(points)),
            "(Press Enter to return to the menu.)".to_string(),
        ],
    }
}

impl QuizView<'_> {
    fn outcome_color(&self, outcome: Outcome) -> Color {
        let colors = &self.theme.colors;
        match outcome {
            Outcome::Correct => colors.success(),
            Outcome::Incorrect => colors.error(),
            Outcome::TimedOut => colors.warning(),
        }
    }

    fn render_answers(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(question) = self.session.question() else {
            return;
        };

        if let Some(choices) = &question.choices {
            let lines: Vec<Line> = choices
                .iter()
                .map(|(letter, value)| {
                    Line::from(vec![
                        Span::styled(
                            format!("  [{}] ", letter.as_char().to_ascii_lowercase()),
                            Style::default().fg(colors.text_muted()),
                        ),
                        Span::styled(
                            format!("{}) {value}", letter.as_char()),
                            Style::default().fg(colors.fg()),
                        ),
                    ])
                })
                .collect();
            Paragraph::new(lines).render(area, buf);
            return;
        }

        let entry = if self.session.entry().is_empty() {
            "_".to_string()
        } else {
            format!("{}_", self.session.entry())
        };
        let mut lines = vec![Line::from(vec![
            Span::styled("  Answer: ", Style::default().fg(colors.text_muted())),
            Span::styled(
                entry,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ])];
        if let Some(msg) = self.session.entry_message() {
            lines.push(Line::from(Span::styled(
                format!("  {msg}"),
                Style::default().fg(colors.warning()),
            )));
        }
        Paragraph::new(lines).render(area, buf);
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let difficulty = self.session.difficulty();

        let block = Block::bordered()
            .title(format!(" {difficulty} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(4),
            ])
            .split(inner);

        let mut status = vec![
            Span::styled(
                format!(" {}", points_label(self.session.points())),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   Streak: {}", self.session.streak()),
                Style::default().fg(colors.fg()),
            ),
        ];
        if let Some(gain) = self.session.recent_gain(self.now) {
            status.push(Span::styled(
                format!("   +{gain}"),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(status)).render(layout[0], buf);

        let label = if difficulty.is_timed() { "Time left" } else { "Question timer" };
        CountdownBar::new(
            label,
            self.session.time_left_ratio(self.now),
            self.session.time_left(self.now),
            self.theme,
        )
        .render(layout[1], buf);

        if let Some(question) = self.session.question() {
            Paragraph::new(Line::from(Span::styled(
                question.prompt.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[2], buf);
        }

        match self.session.phase() {
            Phase::Resolved { outcome, .. } => {
                let answer = self
                    .session
                    .question()
                    .map(|q| q.answer_label())
                    .unwrap_or_default();
                let color = self.outcome_color(outcome);
                let lines: Vec<Line> = outcome_message(
                    outcome,
                    difficulty.is_timed(),
                    &answer,
                    self.session.points(),
                )
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    let style = if i == 0 {
                        Style::default().fg(color).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    Line::from(Span::styled(text, style))
                })
                .collect();
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(layout[3], buf);
            }
            _ => self.render_answers(layout[3], buf),
        }
    }
}
