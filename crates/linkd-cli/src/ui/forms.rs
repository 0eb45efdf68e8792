//! Login, signup, password reset and email verification forms.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{centered, error_line};
use crate::pages::{
  CredentialsForm, TextField,
  login::LoginPage,
  reset_password::{ResetPasswordPage, Step},
  signup::SignupPage,
  verify_email::VerifyEmailPage,
};

const FORM_WIDTH: u16 = 56;

fn field_line(label: &str, field: &TextField, focused: bool) -> Line<'static> {
  let label_style = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  let cursor = if focused { "_" } else { "" };
  Line::from(vec![
    Span::styled(format!("{label:<14}"), label_style),
    Span::raw(format!("{}{cursor}", field.display())),
  ])
}

fn draw_form(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
  let height = lines.len() as u16 + 2;
  let rect = centered(area, FORM_WIDTH.min(area.width), height.min(area.height));
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    rect,
  );
}

fn credentials_lines(form: &CredentialsForm, busy_label: &str) -> Vec<Line<'static>> {
  let mut lines = vec![
    field_line("Email", &form.email, form.focus == 0),
    field_line("Password", &form.password, form.focus == 1),
    Line::from(""),
  ];
  if form.loading {
    lines.push(Line::styled(busy_label.to_owned(), Style::default().fg(Color::DarkGray)));
  }
  lines.push(error_line(form.error.as_deref()));
  lines
}

pub fn draw_login(f: &mut Frame, area: Rect, page: &LoginPage) {
  draw_form(f, area, "Sign in", credentials_lines(&page.form, "Signing in…"));
}

pub fn draw_signup(f: &mut Frame, area: Rect, page: &SignupPage) {
  draw_form(f, area, "Join linkd", credentials_lines(&page.form, "Creating account…"));
}

pub fn draw_reset(f: &mut Frame, area: Rect, page: &ResetPasswordPage) {
  let mut lines = match page.step {
    Step::RequestCode => vec![
      Line::from("Enter your email to receive a reset code."),
      Line::from(""),
      field_line("Email", &page.email, true),
    ],
    Step::Reset | Step::Done => vec![
      Line::from(format!("Code sent to {}.", page.email.trimmed())),
      Line::from(""),
      field_line("Code", &page.code, page.focus == 0),
      field_line("New password", &page.new_password, page.focus == 1),
    ],
  };
  lines.push(Line::from(""));
  if let Some(notice) = &page.notice {
    lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Green)));
  }
  lines.push(error_line(page.error.as_deref()));
  draw_form(f, area, "Reset password", lines);
}

pub fn draw_verify(f: &mut Frame, area: Rect, page: &VerifyEmailPage) {
  let mut lines = vec![
    Line::from("Enter the code we emailed you."),
    Line::from(""),
    field_line("Code", &page.code, true),
    Line::from(""),
  ];
  if let Some(notice) = &page.notice {
    lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Green)));
  }
  lines.push(error_line(page.error.as_deref()));
  draw_form(f, area, "Verify email", lines);
}

#[cfg(test)]
mod tests {
  use crate::{app::App, testing::client_for, ui::render};

  #[test]
  fn login_error_is_rendered_and_password_masked() {
    let mut app = App::new(client_for("http://127.0.0.1:9".into()));
    app.login.form.email.value = "ada@example.com".into();
    app.login.form.password.value = "secret".into();
    app.login.form.error = Some("Password is incorrect.".into());

    let screen = render(&app, 80, 20);
    assert!(screen.contains("ada@example.com"));
    assert!(screen.contains("******"));
    assert!(!screen.contains("secret"));
    assert!(screen.contains("Password is incorrect."));
  }
}
