use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::TierTab;
use crate::engine::difficulty::Difficulty;
use crate::ui::theme::Theme;

pub struct DifficultySelect<'a> {
    pub tab: TierTab,
    pub tiers: &'a [Difficulty],
    pub selected: usize,
    pub notice: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> DifficultySelect<'a> {
    pub fn new(
        tab: TierTab,
        tiers: &'a [Difficulty],
        selected: usize,
        notice: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            tab,
            tiers,
            selected,
            notice,
            theme,
        }
    }
}

fn tier_detail(d: Difficulty) -> String {
    let secs = d.time_budget().as_secs();
    if d.is_timed() {
        format!("as many as you can in {secs}s")
    } else if d.is_free_entry() {
        format!("type the answer, {secs}s per question")
    } else {
        format!("{secs}s per question")
    }
}

pub fn tab_line<'t>(active: TierTab, theme: &Theme) -> Line<'t> {
    let colors = &theme.colors;
    let spans: Vec<Span> = [TierTab::Regular, TierTab::Timed]
        .into_iter()
        .flat_map(|tab| {
            let style = if tab == active {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(colors.text_muted())
            };
            vec![Span::styled(format!(" {} ", tab.label()), style), Span::raw("  ")]
        })
        .collect();
    Line::from(spans)
}

impl Widget for DifficultySelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Choose a difficulty ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(tab_line(self.tab, self.theme)).render(layout[0], buf);

        let lines: Vec<Line> = self
            .tiers
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(format!(" {indicator} [{}] {:<12}", i + 1, d.label()), style),
                    Span::styled(tier_detail(*d), Style::default().fg(colors.text_muted())),
                ])
            })
            .collect();
        Paragraph::new(lines).render(layout[1], buf);

        if let Some(notice) = self.notice {
            Paragraph::new(Line::from(Span::styled(
                notice,
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[2], buf);
        }
    }
}
