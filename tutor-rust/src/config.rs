use crate::{
    errors::ConfigError,
    gate::Gate,
    history::{HistoryStore, DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_LIMIT},
    storage::FileStorage,
    Tutor, TutorialClient,
};
use std::{fmt, path::PathBuf, sync::Arc, time::Duration};
use tutor_sdk::google::{GoogleModel, GoogleModelOptions};

/// Environment variable holding the generation service credential.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash";

/// Everything needed to assemble a [`Tutor`].
/// # Default Values
/// - `model_id`: `gemini-2.5-flash`
/// - `api_key`: `None`
/// - `base_url`: `None` (the public Gemini endpoint)
/// - `storage_dir`: `<platform data dir>/video-tutor`
/// - `history_key`: `videoTutorHistory`
/// - `history_limit`: `Some(50)`
/// - `gate_passphrase`: `None`
/// - `request_timeout`: `None`
#[derive(Clone)]
pub struct TutorConfig {
    pub model_id: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub storage_dir: PathBuf,
    pub history_key: String,
    pub history_limit: Option<usize>,
    pub gate_passphrase: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_key: None,
            base_url: None,
            storage_dir: default_storage_dir(),
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            gate_passphrase: None,
            request_timeout: None,
        }
    }
}

impl fmt::Debug for TutorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TutorConfig")
            .field("model_id", &self.model_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("storage_dir", &self.storage_dir)
            .field("history_key", &self.history_key)
            .field("history_limit", &self.history_limit)
            .field("gate_passphrase", &self.gate_passphrase.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("video-tutor")
}

impl TutorConfig {
    /// Defaults plus the credential from [`API_KEY_ENV`], if set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn storage_dir(mut self, storage_dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = storage_dir.into();
        self
    }

    #[must_use]
    pub fn history_key(mut self, history_key: impl Into<String>) -> Self {
        self.history_key = history_key.into();
        self
    }

    #[must_use]
    pub fn history_limit(mut self, history_limit: Option<usize>) -> Self {
        self.history_limit = history_limit;
        self
    }

    #[must_use]
    pub fn gate_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.gate_passphrase = Some(passphrase.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build_model(&self) -> Result<GoogleModel, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential(API_KEY_ENV))?;
        Ok(GoogleModel::new(
            self.model_id.clone(),
            GoogleModelOptions {
                api_key,
                base_url: self.base_url.clone(),
                ..Default::default()
            },
        ))
    }

    pub fn build_client(&self) -> Result<TutorialClient, ConfigError> {
        let mut params = TutorialClient::builder(Arc::new(self.build_model()?));
        if let Some(timeout) = self.request_timeout {
            params = params.timeout(timeout);
        }
        Ok(params.build())
    }

    /// A history store backed by files under `storage_dir`. Nothing is read
    /// until the store is loaded.
    #[must_use]
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(Arc::new(FileStorage::new(self.storage_dir.clone())))
            .with_key(self.history_key.clone())
            .with_limit(self.history_limit)
    }

    #[must_use]
    pub fn gate(&self) -> Gate {
        self.gate_passphrase
            .as_ref()
            .map_or_else(Gate::open, Gate::new)
    }

    /// Wire the Gemini client and the file-backed history into a [`Tutor`].
    pub fn build_tutor(&self) -> Result<Tutor, ConfigError> {
        let client = self.build_client()?;
        Ok(Tutor::new(Arc::new(client), self.history_store()))
    }
}
