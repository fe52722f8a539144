use bulletlane_core::SchedulerView;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let scheduler = app.scheduler();

        let (mode_str, mode_color) = if scheduler.is_all_paused() {
            ("PAUSED", theme.warning)
        } else {
            ("RUNNING", theme.accent)
        };

        let status_text = if let Some(msg) = &app.status_message {
            msg.clone()
        } else {
            format!(
                " Lanes: {}/{} | Active: {} | Queue: {} | Placed: {} | Finished: {}",
                scheduler.lanes().running_count(),
                scheduler.lane_count(),
                scheduler.lanes().iter().count(),
                scheduler.queue_len(),
                app.stats.placed,
                app.finished(),
            )
        };

        let mode_text = format!(" {} ", mode_str);
        let help_hint = " q:quit space:pause n:next click:hold ";
        let used = mode_text.len() + status_text.len() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(mode_text, Style::default().fg(theme.bg0).bg(mode_color)),
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        let paragraph = Paragraph::new(line);
        frame.render_widget(paragraph, area);
    }
}
