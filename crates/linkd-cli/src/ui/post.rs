//! Post detail: the post, its comments, and the comment box.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::error_line;
use crate::pages::{post::PostPage, relative_time};

pub fn draw(f: &mut Frame, area: Rect, page: &PostPage) {
  let [post_area, comments_area, input_area] = Layout::vertical([
    Constraint::Length(7),
    Constraint::Min(0),
    Constraint::Length(3),
  ])
  .areas(area);

  let Some(post) = &page.post else {
    let text = if page.loading { "Loading…".to_owned() } else { String::new() };
    f.render_widget(
      Paragraph::new(vec![Line::from(text), error_line(page.error.as_deref())]).block(
        Block::default()
          .title(" Post ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      ),
      area,
    );
    return;
  };

  let now = Utc::now();
  let mut lines = vec![
    Line::from(vec![
      Span::styled(post.author.display_name(), Style::default().add_modifier(Modifier::BOLD)),
      Span::styled(
        format!("  {}", relative_time(post.creation_date, now)),
        Style::default().fg(Color::DarkGray),
      ),
      Span::styled(
        if post.updated_date.is_some() { "  (edited)" } else { "" },
        Style::default().fg(Color::DarkGray),
      ),
    ]),
    Line::from(post.content.clone()),
  ];
  if let Some(picture) = &post.picture {
    lines.push(Line::styled(format!("[image] {picture}"), Style::default().fg(Color::Blue)));
  }
  lines.push(Line::styled(
    format!("♥ {}  💬 {}", post.likes_count, post.comments.len()),
    Style::default().fg(Color::DarkGray),
  ));
  f.render_widget(
    Paragraph::new(lines)
      .wrap(Wrap { trim: true })
      .block(
        Block::default()
          .title(" Post ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      ),
    post_area,
  );

  let comment_lines: Vec<Line> = if post.comments.is_empty() {
    vec![Line::styled("No comments yet.", Style::default().fg(Color::DarkGray))]
  } else {
    post
      .comments
      .iter()
      .skip(page.scroll)
      .map(|c| {
        Line::from(vec![
          Span::styled(
            format!("{}: ", c.author.display_name()),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(c.content.clone()),
          Span::styled(
            format!("  {}", relative_time(c.creation_date, now)),
            Style::default().fg(Color::DarkGray),
          ),
        ])
      })
      .collect()
  };
  f.render_widget(
    Paragraph::new(comment_lines).block(
      Block::default()
        .title(" Comments ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray)),
    ),
    comments_area,
  );

  let input = match &page.comment {
    Some(field) => Line::from(format!("{}_", field.value)),
    None => error_line(page.error.as_deref()),
  };
  f.render_widget(
    Paragraph::new(input).block(
      Block::default()
        .title(" Comment ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if page.comment.is_some() {
          Color::Cyan
        } else {
          Color::DarkGray
        })),
    ),
    input_area,
  );
}
