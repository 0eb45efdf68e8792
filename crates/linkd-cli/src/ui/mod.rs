//! TUI rendering; one module per page.

pub mod feed;
pub mod forms;
pub mod notifications;
pub mod post;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let mut left = vec![Span::styled(
    format!(" linkd  {}", app.screen.title()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  let unread = app.notifications.unread_count();
  if unread > 0 {
    left.push(Span::styled(format!("  ({unread} unread)"), Style::default().fg(Color::Yellow)));
  }
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.len());
  left.push(Span::raw(" ".repeat(pad)));
  left.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(left)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match &app.screen {
    Screen::Login => forms::draw_login(f, area, &app.login),
    Screen::Signup => forms::draw_signup(f, area, &app.signup),
    Screen::ResetPassword => forms::draw_reset(f, area, &app.reset),
    Screen::VerifyEmail => forms::draw_verify(f, area, &app.verify),
    Screen::Feed => feed::draw(f, area, &app.feed),
    Screen::Notifications => notifications::draw(f, area, &app.notifications),
    Screen::PostDetail(_) => {
      if let Some(page) = &app.post {
        post::draw(f, area, page);
      }
    }
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    Screen::Login => ("LOGIN", "Tab next field  Enter sign in  ^N sign up  ^R reset password"),
    Screen::Signup => ("SIGNUP", "Tab next field  Enter join  Esc back"),
    Screen::ResetPassword => ("RESET", "Tab next field  Enter submit  Esc back"),
    Screen::VerifyEmail => ("VERIFY", "Enter verify  ^R resend code  Esc feed"),
    Screen::Feed if app.feed.composer.is_some() => ("COMPOSE", "Tab next field  Enter post  Esc cancel"),
    Screen::Feed if app.feed.filter_active => ("SEARCH", "Type to filter  Esc cancel  Enter done"),
    Screen::Feed => (
      "FEED",
      "jk move  Enter open  l like  c compose  Tab tab  [ ] page  / search  n notifications  q quit",
    ),
    Screen::PostDetail(_) => ("POST", "jk scroll  c comment  l like  d delete  r reload  Esc back  q quit"),
    Screen::Notifications => ("INBOX", "jk move  Enter open  r reload  Esc feed  q quit"),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// A `width` x `height` rect centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

/// A red error line, or nothing.
pub fn error_line(error: Option<&str>) -> Line<'static> {
  match error {
    Some(msg) => Line::styled(msg.to_owned(), Style::default().fg(Color::Red)),
    None => Line::from(""),
  }
}

#[cfg(test)]
pub(crate) fn render(app: &App, width: u16, height: u16) -> String {
  use ratatui::{Terminal, backend::TestBackend};

  let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
  terminal.draw(|f| draw(f, app)).unwrap();
  let buffer = terminal.backend().buffer();
  let mut out = String::new();
  for y in 0..buffer.area.height {
    for x in 0..buffer.area.width {
      out.push_str(buffer[(x, y)].symbol());
    }
    out.push('\n');
  }
  out
}
