//! Outgoing mail seam for verification and password-reset codes.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Delivers a plain-text message. Failures are logged by the caller and never
/// surfaced to the HTTP client.
pub trait Mailer: Send + Sync {
  fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Writes every message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
  fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    tracing::info!(%to, %subject, %body, "outgoing mail");
    Ok(())
  }
}

/// Keeps every message in memory; tests read the codes back out of it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingMailer {
  pub sent: std::sync::Mutex<Vec<(String, String, String)>>,
}

#[cfg(test)]
impl RecordingMailer {
  /// The five-digit code in the most recent message to `to`.
  pub fn last_code_for(&self, to: &str) -> Option<String> {
    let sent = self.sent.lock().ok()?;
    let (_, _, body) = sent.iter().rev().find(|(addr, _, _)| addr == to)?;
    body
      .split(|c: char| !c.is_ascii_digit())
      .find(|w| w.len() == crate::accounts::CODE_LEN)
      .map(str::to_owned)
  }
}

#[cfg(test)]
impl Mailer for RecordingMailer {
  fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    self
      .sent
      .lock()
      .map_err(|e| MailError(e.to_string()))?
      .push((to.to_owned(), subject.to_owned(), body.to_owned()));
    Ok(())
  }
}
