use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::AppConfig;
use crate::credentials::CredentialSelector;
use crate::gemini::KeywordGenerator;
use crate::keywords::MAX_KEYWORD_COUNT;
use crate::search::{Effect, SearchEvent, SearchState};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Seed,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub search: SearchState,
    pub popup: Popup,

    // Input form
    pub seed_input: String,
    pub count_input: String,
    pub field: Field,

    // Results view
    pub scroll: usize,
    pub spinner_frame: usize,

    // Transient feedback line (auto-clears)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub selecting_key: bool,
    pub model: String,
    pub theme: Theme,

    generator: Arc<dyn KeywordGenerator>,
    credentials: Arc<dyn CredentialSelector>,
    events_tx: UnboundedSender<SearchEvent>,
    events_rx: UnboundedReceiver<SearchEvent>,
}

impl App {
    pub async fn new(
        config: &AppConfig,
        generator: Arc<dyn KeywordGenerator>,
        credentials: Arc<dyn CredentialSelector>,
        theme: Theme,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            search: SearchState::default(),
            popup: Popup::None,

            seed_input: String::new(),
            count_input: config.default_count.to_string(),
            field: Field::Seed,

            scroll: 0,
            spinner_frame: 0,

            status_message: None,
            status_message_time: None,

            selecting_key: false,
            model: config.model.clone(),
            theme,

            generator,
            credentials,
            events_tx,
            events_rx,
        };

        app.check_credentials().await;
        app
    }

    /// Ask the collaborator whether a key is usable; errors count as "no"
    pub async fn check_credentials(&mut self) {
        let available = match self.credentials.is_credential_available().await {
            Ok(available) => available,
            Err(e) => {
                tracing::error!("Error checking API key availability: {}", e);
                false
            }
        };
        self.dispatch(SearchEvent::CredentialChecked(available));
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Feed one event through the state machine and start whatever it asks for
    pub fn dispatch(&mut self, event: SearchEvent) {
        let fresh_results = matches!(
            &event,
            SearchEvent::Completed { request, .. } if self.search.is_current(*request)
        );
        let effect = self.search.update(event);

        if fresh_results {
            self.scroll = 0;
        }

        if let Effect::Generate { .. } = effect {
            let generator = self.generator.clone();
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                if let Some(event) = effect.run(generator.as_ref()).await {
                    // Receiver only goes away on shutdown
                    let _ = tx.send(event);
                }
            });
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('k') => self.select_api_key(),
                KeyCode::Char('u') => self.focused_input().clear(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    Field::Seed => Field::Count,
                    Field::Count => Field::Seed,
                };
            }
            KeyCode::Backspace => {
                self.focused_input().pop();
            }
            KeyCode::Char(c) => self.type_char(c),

            KeyCode::Down => self.scroll_by(1),
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(4),
            KeyCode::PageUp => self.scroll_by(-4),
            KeyCode::Home => self.scroll = 0,

            KeyCode::F(1) => self.popup = Popup::Help,
            _ => {}
        }
        Ok(())
    }

    fn focused_input(&mut self) -> &mut String {
        match self.field {
            Field::Seed => &mut self.seed_input,
            Field::Count => &mut self.count_input,
        }
    }

    fn type_char(&mut self, c: char) {
        match self.field {
            Field::Seed => {
                if !c.is_control() {
                    self.seed_input.push(c);
                }
            }
            Field::Count => {
                if c.is_ascii_digit() && self.count_input.len() < 2 {
                    self.count_input.push(c);
                }
            }
        }
    }

    /// Count as typed, clamped; empty or zero falls back to 1
    pub fn requested_count(&self) -> u8 {
        self.count_input
            .parse::<u8>()
            .unwrap_or(1)
            .clamp(1, MAX_KEYWORD_COUNT)
    }

    fn submit(&mut self) {
        if self.search.busy {
            self.set_status("Still generating, please wait");
            return;
        }

        let count = self.requested_count();
        self.count_input = count.to_string();
        self.dispatch(SearchEvent::Submit {
            seed: self.seed_input.clone(),
            count,
        });
    }

    fn select_api_key(&mut self) {
        if self.selecting_key {
            return;
        }
        self.selecting_key = true;
        self.set_status("Selecting API key...");

        let credentials = self.credentials.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match credentials.request_credential_selection().await {
                Ok(()) => SearchEvent::CredentialSelected,
                Err(e) => SearchEvent::CredentialSelectionFailed(e),
            };
            let _ = tx.send(event);
        });
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.search.suggestions.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    /// Drain finished background work and advance timers
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_background_event(event);
        }

        if self.search.busy {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }

        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    fn handle_background_event(&mut self, event: SearchEvent) {
        match &event {
            SearchEvent::CredentialSelected => {
                self.selecting_key = false;
                self.set_status("API key selected");
            }
            SearchEvent::CredentialSelectionFailed(_) => {
                self.selecting_key = false;
            }
            _ => {}
        }
        self.dispatch(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialError;
    use crate::gemini::GenerateError;
    use crate::keywords::{Difficulty, KeywordSuggestion, SearchVolume};
    use crate::search::NO_KEY_MESSAGE;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl KeywordGenerator for FixedGenerator {
        async fn generate(&self, seed: &str, count: u8) -> Result<Vec<KeywordSuggestion>, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenerateError::CredentialRejected);
            }
            Ok((0..count)
                .map(|i| KeywordSuggestion {
                    keyword: format!("{} {}", seed, i),
                    difficulty: Difficulty::Medium,
                    search_volume: SearchVolume::UpTo10K,
                    content_ideas: vec![],
                    serp_features: vec![],
                })
                .collect())
        }
    }

    struct ToggleSelector {
        available: AtomicBool,
        selectable: bool,
    }

    #[async_trait]
    impl CredentialSelector for ToggleSelector {
        async fn is_credential_available(&self) -> Result<bool, CredentialError> {
            Ok(self.available.load(Ordering::SeqCst))
        }

        async fn request_credential_selection(&self) -> Result<(), CredentialError> {
            if !self.selectable {
                return Err(CredentialError::SelectionUnavailable);
            }
            self.available.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn app(has_key: bool, fail: bool) -> (App, Arc<FixedGenerator>) {
        let generator = Arc::new(FixedGenerator {
            calls: AtomicUsize::new(0),
            fail,
        });
        let selector = Arc::new(ToggleSelector {
            available: AtomicBool::new(has_key),
            selectable: true,
        });
        let app = App::new(&AppConfig::default(), generator.clone(), selector, Theme::default()).await;
        (app, generator)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Wait for the next background event and feed it in
    async fn settle(app: &mut App) {
        let event = tokio::time::timeout(Duration::from_secs(2), app.events_rx.recv())
            .await
            .expect("background task did not report back")
            .expect("channel closed");
        app.handle_background_event(event);
    }

    #[tokio::test]
    async fn test_submit_renders_requested_count() {
        let (mut app, generator) = app(true, false).await;
        type_str(&mut app, "cold brew");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "4");
        press(&mut app, KeyCode::Enter);

        assert!(app.search.busy);
        settle(&mut app).await;

        assert!(!app.search.busy);
        assert_eq!(app.search.suggestions.len(), 4);
        assert_eq!(app.search.suggestions[0].keyword, "cold brew 0");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_key_never_calls_generator() {
        let (mut app, generator) = app(false, false).await;
        type_str(&mut app, "cold brew");
        press(&mut app, KeyCode::Enter);

        assert!(!app.search.busy);
        assert_eq!(app.search.error.as_deref(), Some(NO_KEY_MESSAGE));
        tokio::task::yield_now().await;
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_key_then_reselect() {
        let (mut app, _) = app(true, true).await;
        type_str(&mut app, "cold brew");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        assert!(!app.search.has_api_key);

        let ctrl_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_k).unwrap();
        assert!(app.selecting_key);
        settle(&mut app).await;

        assert!(!app.selecting_key);
        assert!(app.search.has_api_key);
        assert!(app.search.error.is_none());
    }

    #[tokio::test]
    async fn test_count_field_accepts_digits_only() {
        let (mut app, _) = app(true, false).await;
        press(&mut app, KeyCode::Tab);
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_u).unwrap();
        type_str(&mut app, "a9x99");

        assert_eq!(app.count_input, "99");
        assert_eq!(app.requested_count(), MAX_KEYWORD_COUNT);
    }

    #[tokio::test]
    async fn test_help_popup_swallows_keys() {
        let (mut app, _) = app(true, false).await;
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.popup, Popup::Help);

        type_str(&mut app, "abc");
        assert!(app.seed_input.is_empty());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test]
    async fn test_stale_completion_keeps_scroll() {
        let (mut app, _) = app(true, false).await;
        type_str(&mut app, "cold brew");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        assert_eq!(app.search.suggestions.len(), 10);

        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll, 4);

        app.dispatch(SearchEvent::Completed {
            request: 99,
            result: Ok(vec![]),
        });
        assert_eq!(app.scroll, 4);
        assert_eq!(app.search.suggestions.len(), 10);

        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        assert_eq!(app.scroll, 0);
    }
}
