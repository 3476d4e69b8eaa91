use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

pub const HELP_LINES: [&str; 8] = [
    "Pick a difficulty, then answer each problem before the timer runs out.",
    "Every correct answer earns at least one point.",
    "Answer within 5 seconds to build a streak; longer streaks are worth more.",
    "A wrong answer or running out of time ends the game.",
    "",
    "Regular tiers: 4 choices, one timer per question. Keys a-d or 1-4.",
    "Timed tiers: answer as many as you can before the clock runs out.",
    "Bonus: type the answer. Backspace deletes, c clears, Enter submits.",
];

/// Bordered block of centered text, used by the help and error screens.
pub struct MessageScreen<'a> {
    pub title: &'a str,
    pub heading: &'a str,
    pub lines: Vec<String>,
    pub color: Color,
    pub theme: &'a Theme,
}

impl<'a> MessageScreen<'a> {
    pub fn help(theme: &'a Theme) -> Self {
        Self {
            title: " Help ",
            heading: "How do you play?",
            lines: HELP_LINES.iter().map(|l| l.to_string()).collect(),
            color: theme.colors.accent(),
            theme,
        }
    }

    pub fn error(message: &str, theme: &'a Theme) -> Self {
        Self {
            title: " Error ",
            heading: "Something went wrong",
            lines: vec![message.to_string(), String::new(), "Press any key to quit.".to_string()],
            color: theme.colors.error(),
            theme,
        }
    }
}

impl Widget for MessageScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(self.color))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.heading,
                Style::default().fg(self.color).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(
            self.lines
                .into_iter()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg())))),
        );

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_screen_tells_how_to_leave() {
        let theme = Theme::default();
        let screen = MessageScreen::error("disk full", &theme);
        assert_eq!(screen.lines[0], "disk full");
        assert_eq!(screen.lines.last().unwrap(), "Press any key to quit.");
    }
}
