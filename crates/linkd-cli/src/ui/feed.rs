//! Feed page: tab bar, post list, composer modal.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
};

use super::{centered, error_line};
use crate::pages::{
  feed::{FeedPage, FeedTab},
  relative_time,
};

pub fn draw(f: &mut Frame, area: Rect, page: &FeedPage) {
  let [tabs_area, list_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(0),
    Constraint::Length(1),
  ])
  .areas(area);

  let selected = match page.tab {
    FeedTab::Feed => 0,
    FeedTab::All => 1,
  };
  f.render_widget(
    Tabs::new([FeedTab::Feed.label(), FeedTab::All.label()])
      .select(selected)
      .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    tabs_area,
  );

  draw_posts(f, list_area, page);

  let footer = if page.filter_active || !page.filter.is_empty() {
    let cursor = if page.filter_active { "_" } else { "" };
    Line::styled(format!("/{}{cursor}", page.filter), Style::default().fg(Color::Yellow))
  } else {
    error_line(page.error.as_deref())
  };
  f.render_widget(Paragraph::new(footer), footer_area);

  if page.composer.is_some() {
    draw_composer(f, area, page);
  }
}

fn draw_posts(f: &mut Frame, area: Rect, page: &FeedPage) {
  let posts = page.filtered_posts();
  let title = format!(
    " {} ({}-{}) ",
    page.tab.label(),
    page.offset + usize::from(!posts.is_empty()),
    page.offset + posts.len()
  );
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if posts.is_empty() {
    let text = if page.loading { "Loading…" } else { "No posts yet." };
    f.render_widget(
      Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let now = Utc::now();
  let items: Vec<ListItem> = posts
    .iter()
    .map(|post| {
      let mut header = vec![
        Span::styled(
          post.author.display_name(),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
          format!("  {}", relative_time(post.creation_date, now)),
          Style::default().fg(Color::DarkGray),
        ),
      ];
      if let Some(headline) = post.author.headline() {
        header.push(Span::styled(format!("  · {headline}"), Style::default().fg(Color::DarkGray)));
      }
      let meta = format!("  ♥ {}  💬 {}", post.likes_count, post.comments.len());
      ListItem::new(vec![
        Line::from(header),
        Line::from(format!("  {}", post.content)),
        Line::styled(meta, Style::default().fg(Color::DarkGray)),
      ])
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

fn draw_composer(f: &mut Frame, area: Rect, page: &FeedPage) {
  let Some(composer) = &page.composer else {
    return;
  };
  let rect = centered(area, 64.min(area.width), 8.min(area.height));
  let field = |label: &str, value: &str, focused: bool| {
    let style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
      Span::styled(format!("{label:<10}"), style),
      Span::raw(format!("{value}{cursor}")),
    ])
  };
  let lines = vec![
    field("Content", &composer.content.value, composer.focus == 0),
    field("Picture", &composer.picture.value, composer.focus == 1),
    Line::from(""),
    error_line(page.error.as_deref()),
  ];

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(lines).block(
      Block::default()
        .title(" New post ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan)),
    ),
    rect,
  );
}
