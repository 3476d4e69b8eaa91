use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::TierTab;
use crate::engine::difficulty::Difficulty;
use crate::store::stats::{DifficultyStats, SortOrder, time_ago};
use crate::ui::components::difficulty_select::tab_line;
use crate::ui::theme::Theme;

pub struct StatsView<'a> {
    pub tab: TierTab,
    pub tiers: &'a [Difficulty],
    pub selected: Option<Difficulty>,
    pub stats: Option<&'a DifficultyStats>,
    pub sort: SortOrder,
    pub page: usize,
    /// Current epoch seconds, for the "time ago" column.
    pub now_ts: i64,
    pub theme: &'a Theme,
}

impl Widget for StatsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(6),
            ])
            .split(inner);

        Paragraph::new(tab_line(self.tab, self.theme)).render(layout[0], buf);

        let tier_spans: Vec<Span> = self
            .tiers
            .iter()
            .flat_map(|d| {
                let style = if Some(*d) == self.selected {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.text_muted())
                };
                vec![Span::styled(format!(" {} ", d.short_label()), style), Span::raw(" ")]
            })
            .collect();
        Paragraph::new(Line::from(tier_spans)).render(layout[1], buf);

        let Some(stats) = self.stats else {
            return;
        };

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(18), Constraint::Min(20)])
            .split(layout[2]);

        let label_style = Style::default().fg(colors.text_muted());
        let value_style = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let summary = vec![
            Line::from(Span::styled(" Attempts:", label_style)),
            Line::from(Span::styled(format!("   {}", stats.count), value_style)),
            Line::from(""),
            Line::from(Span::styled(" Average:", label_style)),
            Line::from(Span::styled(format!("   {}", stats.average_label()), value_style)),
            Line::from(""),
            Line::from(Span::styled(" Max:", label_style)),
            Line::from(Span::styled(format!("   {}", stats.max_label()), value_style)),
        ];
        Paragraph::new(summary).render(body[0], buf);

        let table_block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(
                    " Sort: {}  |  Page {}/{} ",
                    self.sort.label(),
                    self.page + 1,
                    stats.page_count()
                ),
                Style::default().fg(colors.accent()),
            )))
            .border_style(Style::default().fg(colors.border()));
        let table_inner = table_block.inner(body[1]);
        table_block.render(body[1], buf);

        if stats.count == 0 {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    " You haven't attempted",
                    Style::default().fg(colors.text_muted()).add_modifier(Modifier::ITALIC),
                )),
                Line::from(Span::styled(
                    " this difficulty yet.",
                    Style::default().fg(colors.text_muted()).add_modifier(Modifier::ITALIC),
                )),
            ])
            .render(table_inner, buf);
            return;
        }

        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {:<16} {:>8}", "Time Done", "Points"),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                " ─────────────────────────",
                Style::default().fg(colors.border()),
            )),
        ];
        for record in stats.page(self.sort, self.page) {
            let ago = time_ago(self.now_ts - record.timestamp);
            lines.push(Line::from(Span::styled(
                format!(" {ago:<16} {:>8}", record.points),
                Style::default().fg(colors.fg()),
            )));
        }
        Paragraph::new(lines).render(table_inner, buf);
    }
}
