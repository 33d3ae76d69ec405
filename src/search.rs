//! Search state and its transitions.
//!
//! Every change goes through [`SearchState::update`]; side effects are
//! returned as an [`Effect`] for the caller to run, which keeps the state
//! machine itself free of IO.

use crate::credentials::CredentialError;
use crate::gemini::{GenerateError, KeywordGenerator};
use crate::keywords::{clamp_count, KeywordSuggestion};

pub const NO_KEY_MESSAGE: &str = "API Key not selected. Please select your API key to proceed.";
pub const KEY_REJECTED_MESSAGE: &str = "API Key invalid or expired. Please select your API key again.";
pub const EMPTY_SEED_MESSAGE: &str = "Please enter a seed keyword.";

pub type RequestId = u64;

#[derive(Debug, Clone)]
pub enum SearchEvent {
    CredentialChecked(bool),
    CredentialSelected,
    CredentialSelectionFailed(CredentialError),
    Submit { seed: String, count: u8 },
    Completed {
        request: RequestId,
        result: Result<Vec<KeywordSuggestion>, GenerateError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Generate {
        request: RequestId,
        seed: String,
        count: u8,
    },
}

impl Effect {
    /// Run the effect against `generator`, producing the event that reports back
    pub async fn run(self, generator: &dyn KeywordGenerator) -> Option<SearchEvent> {
        match self {
            Effect::None => None,
            Effect::Generate { request, seed, count } => {
                let result = generator.generate(&seed, count).await;
                Some(SearchEvent::Completed { request, result })
            }
        }
    }
}

/// What the results area should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
    Failed,
    Results,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub suggestions: Vec<KeywordSuggestion>,
    pub busy: bool,
    pub error: Option<String>,
    pub has_api_key: bool,
    in_flight: Option<RequestId>,
    next_request: RequestId,
}

impl SearchState {
    pub fn new(has_api_key: bool) -> Self {
        Self {
            has_api_key,
            ..Self::default()
        }
    }

    /// Whether a completion for `request` would be applied
    pub fn is_current(&self, request: RequestId) -> bool {
        self.in_flight == Some(request)
    }

    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Busy
        } else if self.error.is_some() {
            Phase::Failed
        } else if !self.suggestions.is_empty() {
            Phase::Results
        } else {
            Phase::Idle
        }
    }

    pub fn update(&mut self, event: SearchEvent) -> Effect {
        match event {
            SearchEvent::CredentialChecked(available) => {
                self.has_api_key = available;
                Effect::None
            }
            SearchEvent::CredentialSelected => {
                self.has_api_key = true;
                self.error = None;
                Effect::None
            }
            SearchEvent::CredentialSelectionFailed(e) => {
                self.error = Some(e.to_string());
                Effect::None
            }
            SearchEvent::Submit { seed, count } => self.submit(seed, count),
            SearchEvent::Completed { request, result } => {
                self.complete(request, result);
                Effect::None
            }
        }
    }

    fn submit(&mut self, seed: String, count: u8) -> Effect {
        // First submission wins until it resolves
        if self.busy {
            tracing::debug!("Ignoring submit while request {:?} is in flight", self.in_flight);
            return Effect::None;
        }

        self.error = None;
        self.suggestions.clear();

        let seed = seed.trim().to_string();
        if seed.is_empty() {
            self.error = Some(EMPTY_SEED_MESSAGE.to_string());
            return Effect::None;
        }

        if !self.has_api_key {
            self.error = Some(NO_KEY_MESSAGE.to_string());
            return Effect::None;
        }

        self.next_request += 1;
        let request = self.next_request;
        self.in_flight = Some(request);
        self.busy = true;

        Effect::Generate {
            request,
            seed,
            count: clamp_count(count),
        }
    }

    fn complete(&mut self, request: RequestId, result: Result<Vec<KeywordSuggestion>, GenerateError>) {
        if !self.is_current(request) {
            tracing::debug!("Dropping stale result for request {}", request);
            return;
        }

        match result {
            Ok(suggestions) => {
                tracing::info!("Request {} returned {} suggestions", request, suggestions.len());
                self.suggestions = suggestions;
            }
            Err(GenerateError::CredentialRejected) => {
                tracing::warn!("Request {} rejected the API key", request);
                self.has_api_key = false;
                self.error = Some(KEY_REJECTED_MESSAGE.to_string());
            }
            Err(e) => {
                if let GenerateError::Failed(detail) = &e {
                    tracing::error!("Request {} failed: {}", request, detail);
                }
                self.error = Some(e.to_string());
            }
        }

        self.in_flight = None;
        self.busy = false;
    }
}
