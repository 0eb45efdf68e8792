//! Notifications list.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::error_line;
use crate::pages::{notifications::NotificationsPage, relative_time};

pub const UNREAD_MARKER: &str = "● unread";

pub fn draw(f: &mut Frame, area: Rect, page: &NotificationsPage) {
  let block = Block::default()
    .title(format!(" Notifications ({} unread) ", page.unread_count()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if page.items.is_empty() {
    let text = if page.loading { "Loading…" } else { "No notifications" };
    f.render_widget(
      Paragraph::new(vec![
        Line::styled(text, Style::default().fg(Color::DarkGray)),
        error_line(page.error.as_deref()),
      ])
      .block(block),
      area,
    );
    return;
  }

  let now = Utc::now();
  let items: Vec<ListItem> = page
    .items
    .iter()
    .map(|n| {
      let mut spans = Vec::new();
      if n.read {
        spans.push(Span::raw(" ".repeat(UNREAD_MARKER.chars().count() + 1)));
        spans.push(Span::raw(n.summary()));
      } else {
        spans.push(Span::styled(format!("{UNREAD_MARKER} "), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(n.summary(), Style::default().add_modifier(Modifier::BOLD)));
      }
      spans.push(Span::styled(
        format!("  {}", relative_time(n.creation_date, now)),
        Style::default().fg(Color::DarkGray),
      ));
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(page.cursor));
  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
    area,
    &mut state,
  );
}
