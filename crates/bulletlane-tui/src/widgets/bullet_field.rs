use bulletlane_core::geometry::GeometryProvider;
use bulletlane_core::{ActiveItem, PlayState};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Block,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;

pub struct BulletFieldWidget;

impl BulletFieldWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let scheduler = app.scheduler();
        let cell_width = app.config.ui.cell_width_px;

        // paused bullets are drawn last so they sit on top of anything overlapping
        let (paused, running): (Vec<&ActiveItem>, Vec<&ActiveItem>) = scheduler
            .lanes()
            .iter()
            .partition(|item| item.play_state() == PlayState::Paused);

        let buf = frame.buffer_mut();
        for item in running.into_iter().chain(paused) {
            let row = item.lane as u16;
            if row >= area.height {
                continue;
            }
            // not mounted until the next frame
            let Some(rect) = scheduler.stage().item_rect(&item.id) else {
                continue;
            };

            let start = (rect.left / cell_width).floor() as i64;
            let Some((offset, text)) = visible_slice(&item.content, start, area.width) else {
                continue;
            };

            let style = if item.play_state() == PlayState::Paused {
                Style::default()
                    .fg(theme.paused)
                    .bg(theme.paused_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.lane_color(item.lane)).bg(theme.bg0)
            };
            buf.set_string(area.x + offset, area.y + row, text, style);
        }
    }
}

/// Part of `content` visible in a field `field_width` columns wide when its
/// first column lands at `start` (negative: still entering from the left).
///
/// Wide characters cut by either edge are dropped whole. Returns the column
/// the visible text starts at.
pub fn visible_slice(content: &str, start: i64, field_width: u16) -> Option<(u16, String)> {
    let field_width = field_width as i64;
    if start >= field_width {
        return None;
    }

    let mut column = start;
    let mut first: Option<i64> = None;
    let mut text = String::new();
    for ch in content.chars() {
        let width = ch.width().unwrap_or(0) as i64;
        if column + width > field_width {
            break;
        }
        if column >= 0 {
            first.get_or_insert(column);
            text.push(ch);
        }
        column += width;
    }

    first.map(|first| (first as u16, text))
}
