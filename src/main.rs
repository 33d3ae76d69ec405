mod app;
mod config;
mod credentials;
mod gemini;
mod keywords;
mod search;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use credentials::{ApiKeyStore, CredentialSelector};
use gemini::{GeminiClient, KeywordGenerator};
use keywords::KeywordSuggestion;
use search::{SearchEvent, SearchState};
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "keyscout")]
#[command(version)]
#[command(about = "Keyword research in the terminal, powered by Gemini")]
struct Args {
    /// Seed keyword; runs one query without the TUI
    #[arg(short, long)]
    seed: Option<String>,

    /// Number of keywords to generate (1-20)
    #[arg(short = 'n', long)]
    count: Option<u8>,

    /// Print results as JSON instead of cards (with --seed)
    #[arg(short, long)]
    json: bool,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Use a different config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(count) = args.count {
        config.default_count = keywords::clamp_count(count);
    }

    let keys = ApiKeyStore::new(config.env_api_key());
    let generator: Arc<dyn KeywordGenerator> = Arc::new(GeminiClient::new(&config, keys.clone())?);
    let credentials = credentials::selector_for(&config, keys);

    if let Some(seed) = args.seed {
        let suggestions = run_once(&config, generator, credentials, &seed).await?;
        return write_results(&mut io::stdout().lock(), &suggestions, args.json);
    }

    let theme = Theme::load(config.theme_path.as_deref());
    run_tui(&config, generator, credentials, theme).await
}

/// Headless query: same state machine as the TUI
async fn run_once(
    config: &AppConfig,
    generator: Arc<dyn KeywordGenerator>,
    credentials: Arc<dyn CredentialSelector>,
    seed: &str,
) -> Result<Vec<KeywordSuggestion>> {
    let mut available = credentials.is_credential_available().await.unwrap_or(false);
    if !available {
        // A key command can still supply one without user interaction
        available = credentials.request_credential_selection().await.is_ok();
    }

    let mut state = SearchState::new(available);
    let effect = state.update(SearchEvent::Submit {
        seed: seed.to_string(),
        count: config.default_count,
    });

    if let Some(event) = effect.run(generator.as_ref()).await {
        state.update(event);
    }

    if let Some(error) = state.error {
        anyhow::bail!(error);
    }
    Ok(state.suggestions)
}

/// Print suggestions as pretty JSON or as plain-text cards
fn write_results(out: &mut impl Write, suggestions: &[KeywordSuggestion], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(suggestions)?)?;
    } else {
        for card in ui::card::cards(suggestions) {
            writeln!(out, "{}", card.to_plain_text())?;
        }
    }
    Ok(())
}

async fn run_tui(
    config: &AppConfig,
    generator: Arc<dyn KeywordGenerator>,
    credentials: Arc<dyn CredentialSelector>,
    theme: Theme,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, generator, credentials, theme).await;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            if let Err(e) = app.handle_key(key) {
                                tracing::error!("Key handling failed: {}", e);
                            }
                        }
                    }
                }
            }
        }

        // Let spawned requests make progress between polls
        tokio::task::yield_now().await;
        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use credentials::EnvSelector;
    use gemini::GenerateError;
    use keywords::{Difficulty, SearchVolume};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KeywordGenerator for StubGenerator {
        async fn generate(&self, seed: &str, count: u8) -> Result<Vec<KeywordSuggestion>, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..count)
                .map(|i| KeywordSuggestion {
                    keyword: format!("{} tips {}", seed, i),
                    difficulty: Difficulty::Low,
                    search_volume: SearchVolume::UpTo1K,
                    content_ideas: vec!["Beginner guide".to_string()],
                    serp_features: vec![],
                })
                .collect())
        }
    }

    fn setup(key: Option<&str>) -> (AppConfig, Arc<StubGenerator>, Arc<dyn CredentialSelector>) {
        let config = AppConfig {
            default_count: 2,
            ..AppConfig::default()
        };
        let generator = Arc::new(StubGenerator {
            calls: AtomicUsize::new(0),
        });
        let store = ApiKeyStore::new(key.map(str::to_string));
        (config, generator, Arc::new(EnvSelector::new(store)))
    }

    #[tokio::test]
    async fn test_run_once_without_key_fails_before_calling() {
        let (config, generator, credentials) = setup(None);

        let err = run_once(&config, generator.clone(), credentials, "cold brew")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), search::NO_KEY_MESSAGE);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_once_prints_cards_and_json() {
        let (config, generator, credentials) = setup(Some("key"));

        let suggestions = run_once(&config, generator, credentials, "cold brew").await.unwrap();
        assert_eq!(suggestions.len(), 2);

        let mut plain = Vec::new();
        write_results(&mut plain, &suggestions, false).unwrap();
        let plain = String::from_utf8(plain).unwrap();
        assert!(plain.contains("cold brew tips 0"));
        assert!(plain.contains("cold brew tips 1"));
        assert!(plain.contains("- Beginner guide"));

        let mut json = Vec::new();
        write_results(&mut json, &suggestions, true).unwrap();
        let parsed: Vec<KeywordSuggestion> = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, suggestions);
        assert!(String::from_utf8(json).unwrap().contains("\"searchVolume\": \"100-1K\""));
    }
}
