//! `linkd`: terminal client for the linkd social network.
//!
//! # Usage
//!
//! ```
//! linkd --url http://localhost:8080
//! linkd --config ~/.config/linkd/config.toml --log-file /tmp/linkd.log
//! ```

mod app;
mod client;
mod pages;
mod token;
mod ui;

#[cfg(test)]
mod testing;

use std::{
  io,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use token::TokenStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "linkd", about = "Terminal client for the linkd social network")]
struct Args {
  /// Path to a TOML config file (url, token_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the linkd server (default: http://localhost:8080).
  #[arg(long, env = "LINKD_URL")]
  url: Option<String>,

  /// Where the session token is kept between runs.
  #[arg(long, env = "LINKD_TOKEN_FILE", value_name = "FILE")]
  token_file: Option<PathBuf>,

  /// Keep the session token in memory only; nothing is written to disk.
  #[arg(long)]
  ephemeral: bool,

  /// Write logs to this file. The terminal belongs to the UI, so there is no
  /// logging without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:        String,
  #[serde(default)]
  token_file: Option<PathBuf>,
}

const DEFAULT_URL: &str = "http://localhost:8080";

/// CLI flags override the config file, which overrides defaults.
fn resolve(args: &Args, file_cfg: ConfigFile) -> Result<(ApiConfig, TokenStore)> {
  let base_url = args
    .url
    .clone()
    .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  if args.ephemeral {
    return Ok((ApiConfig { base_url }, TokenStore::in_memory()));
  }

  let token_path = args
    .token_file
    .clone()
    .or(file_cfg.token_file)
    .or_else(TokenStore::default_path)
    .context("cannot locate a config directory; pass --token-file")?;

  Ok((ApiConfig { base_url }, TokenStore::file(token_path)))
}

fn init_logging(path: &Path) -> Result<()> {
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("linkd=debug,info")),
    )
    .with_ansi(false)
    .with_writer(std::sync::Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let (api_config, tokens) = resolve(&args, file_cfg)?;
  tracing::info!(url = %api_config.base_url, "starting");
  let client = ApiClient::new(api_config, tokens)?;
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.start().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resize and everything else: redraw on the next iteration.
      _ => {}
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(url: Option<&str>, token_file: Option<&str>) -> Args {
    Args {
      config:     None,
      url:        url.map(str::to_owned),
      token_file: token_file.map(PathBuf::from),
      ephemeral:  false,
      log_file:   None,
    }
  }

  #[test]
  fn flags_override_config_file() {
    let file_cfg: ConfigFile =
      toml::from_str("url = \"http://file:1\"\ntoken_file = \"/tmp/from-file\"\n").unwrap();
    let (cfg, tokens) = resolve(&args(Some("http://flag:2"), None), file_cfg).unwrap();
    assert_eq!(cfg.base_url, "http://flag:2");
    assert!(matches!(tokens, TokenStore::File(p) if p == PathBuf::from("/tmp/from-file")));
  }

  #[test]
  fn config_file_overrides_default_url() {
    let file_cfg: ConfigFile = toml::from_str("url = \"http://file:1\"\n").unwrap();
    let (cfg, _) = resolve(&args(None, Some("/tmp/tok")), file_cfg).unwrap();
    assert_eq!(cfg.base_url, "http://file:1");
  }

  #[test]
  fn ephemeral_keeps_the_token_in_memory() {
    let args = Args { ephemeral: true, ..args(None, Some("/tmp/tok")) };
    let (_, tokens) = resolve(&args, ConfigFile::default()).unwrap();
    assert!(matches!(tokens, TokenStore::Memory(_)));
  }

  #[test]
  fn default_url_when_nothing_set() {
    let (cfg, _) = resolve(&args(None, Some("/tmp/tok")), ConfigFile::default()).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_URL);
  }
}
