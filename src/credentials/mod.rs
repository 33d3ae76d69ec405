//! API key availability and selection.
//!
//! The rest of the app only talks to [`CredentialSelector`]; which
//! implementation backs it is decided once at startup from the config.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("API Key selection is not available in this environment. Please ensure GEMINI_API_KEY is set.")]
    SelectionUnavailable,

    #[error("Failed to open API key selection. Please try again.")]
    SelectionFailed(String),
}

/// Shared slot holding the currently selected key.
///
/// The generation client reads it right before every request, so a key
/// selected mid-session is picked up without rebuilding anything.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl ApiKeyStore {
    pub fn new(key: Option<String>) -> Self {
        let store = Self::default();
        if let Some(key) = key {
            store.set(key);
        }
        store
    }

    pub fn get(&self) -> Option<String> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = if key.trim().is_empty() { None } else { Some(key.trim().to_string()) };
    }

    pub fn has_key(&self) -> bool {
        self.get().is_some()
    }
}

/// Environment collaborator that knows whether a key is selected and can
/// ask the user to pick one
#[async_trait]
pub trait CredentialSelector: Send + Sync {
    async fn is_credential_available(&self) -> Result<bool, CredentialError>;
    async fn request_credential_selection(&self) -> Result<(), CredentialError>;
}

/// Key comes from the environment or config file only; there is nothing to select
pub struct EnvSelector {
    store: ApiKeyStore,
}

impl EnvSelector {
    pub fn new(store: ApiKeyStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialSelector for EnvSelector {
    async fn is_credential_available(&self) -> Result<bool, CredentialError> {
        Ok(self.store.has_key())
    }

    async fn request_credential_selection(&self) -> Result<(), CredentialError> {
        tracing::warn!("API key selection requested but no key_command is configured");
        Err(CredentialError::SelectionUnavailable)
    }
}

/// Key is selected by running a user-provided command (password manager, etc.)
pub struct CommandSelector {
    command: String,
    timeout: Duration,
    store: ApiKeyStore,
}

impl CommandSelector {
    pub fn new(command: impl Into<String>, timeout: Duration, store: ApiKeyStore) -> Self {
        Self {
            command: command.into(),
            timeout,
            store,
        }
    }
}

#[async_trait]
impl CredentialSelector for CommandSelector {
    async fn is_credential_available(&self) -> Result<bool, CredentialError> {
        Ok(self.store.has_key())
    }

    async fn request_credential_selection(&self) -> Result<(), CredentialError> {
        let key = run_key_command(&self.command, self.timeout).await.map_err(|e| {
            tracing::error!("Key command failed: {}", e);
            CredentialError::SelectionFailed(e)
        })?;
        self.store.set(key);
        tracing::info!("API key selected via key command");
        Ok(())
    }
}

/// Pick the selector matching the config: a key command if one is set,
/// otherwise the plain environment
pub fn selector_for(config: &AppConfig, store: ApiKeyStore) -> Arc<dyn CredentialSelector> {
    match &config.key_command {
        Some(cmd) => Arc::new(CommandSelector::new(
            cmd.clone(),
            Duration::from_secs(config.key_command_timeout_secs.max(1)),
            store,
        )),
        None => Arc::new(EnvSelector::new(store)),
    }
}

/// Run `command` through `sh -c` and return the first non-empty stdout line.
/// The child is killed if it outlives `limit`.
async fn run_key_command(command: &str, limit: Duration) -> Result<String, String> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("could not run key command: {}", e))?;

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(format!("key command failed: {}", e)),
        Err(_) => return Err("key command timed out".to_string()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("key command exited with {}: {}", output.status, stderr.trim()));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "key command printed nothing".to_string())
}
