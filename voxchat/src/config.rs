//! Environment-derived configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::AudioFormat;
use crate::error::ConfigError;

/// Typed settings record for the assistant.
///
/// Constructed once at process start from the environment. The only value
/// intended to change after loading is the audio output directory, which the
/// CLI may override before the first synthesis call.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the completion service. Required.
    pub openai_api_key: String,
    /// Base URL for the completion API.
    pub openai_api_base: String,
    /// Model identifier sent with every completion request.
    pub openai_model: String,
    /// API key for the speech service. Absence disables narration.
    pub heygen_api_key: Option<String>,
    /// Base URL for the speech API.
    pub heygen_api_base: String,
    /// Voice identifier for synthesis requests.
    pub heygen_voice_id: String,
    /// Audio container format requested from the speech service.
    pub audio_format: AudioFormat,
    /// Directory audio artifacts are written to.
    pub audio_dir: PathBuf,
    /// Fixed interval between task-status polls.
    pub poll_interval: Duration,
    /// Wall-clock budget for one synthesis call, measured from submission.
    pub poll_timeout: Duration,
}

impl Settings {
    /// Default completion API base URL.
    pub const DEFAULT_OPENAI_API_BASE: &'static str = "https://api.openai.com/v1";
    /// Default completion model.
    pub const DEFAULT_OPENAI_MODEL: &'static str = "gpt-5";
    /// Default speech API base URL.
    pub const DEFAULT_HEYGEN_API_BASE: &'static str = "https://api.heygen.com/v1";
    /// Default voice identifier.
    pub const DEFAULT_HEYGEN_VOICE_ID: &'static str = "charles";
    /// Default audio output directory.
    pub const DEFAULT_AUDIO_DIR: &'static str = "output";
    /// Default poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Default poll timeout.
    pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates settings with the given completion API key and defaults for
    /// everything else. Narration is disabled until a speech key is set.
    #[must_use]
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            openai_api_base: Self::DEFAULT_OPENAI_API_BASE.to_owned(),
            openai_model: Self::DEFAULT_OPENAI_MODEL.to_owned(),
            heygen_api_key: None,
            heygen_api_base: Self::DEFAULT_HEYGEN_API_BASE.to_owned(),
            heygen_voice_id: Self::DEFAULT_HEYGEN_VOICE_ID.to_owned(),
            audio_format: AudioFormat::default(),
            audio_dir: PathBuf::from(Self::DEFAULT_AUDIO_DIR),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            poll_timeout: Self::DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Creates settings from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required completion API key
    /// - `OPENAI_API_BASE` - Optional completion base URL
    /// - `OPENAI_MODEL` - Optional completion model
    /// - `HEYGEN_API_KEY` - Optional speech API key (absence disables narration)
    /// - `HEYGEN_API_BASE` - Optional speech base URL
    /// - `HEYGEN_VOICE_ID` - Optional voice identifier
    /// - `HEYGEN_AUDIO_FORMAT` - Optional audio format (mp3, wav, ...)
    /// - `HEYGEN_POLL_INTERVAL` - Optional poll interval in seconds
    /// - `HEYGEN_POLL_TIMEOUT` - Optional poll timeout in seconds
    /// - `CHATBOT_AUDIO_DIR` - Optional audio output directory
    ///
    /// # Errors
    ///
    /// Fails if the required key is absent or any optional value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates settings from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) passes the process environment here;
    /// tests pass a map.
    ///
    /// # Errors
    ///
    /// Fails if `OPENAI_API_KEY` is absent or empty, or if a poll duration
    /// or audio format value cannot be parsed.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::missing("OPENAI_API_KEY"))?;

        let mut settings = Self::new(openai_api_key);

        if let Some(base) = lookup("OPENAI_API_BASE") {
            settings.openai_api_base = base;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            settings.openai_model = model;
        }
        settings.heygen_api_key = lookup("HEYGEN_API_KEY").filter(|key| !key.is_empty());
        if let Some(base) = lookup("HEYGEN_API_BASE") {
            settings.heygen_api_base = base;
        }
        if let Some(voice) = lookup("HEYGEN_VOICE_ID") {
            settings.heygen_voice_id = voice;
        }
        if let Some(format) = lookup("HEYGEN_AUDIO_FORMAT") {
            settings.audio_format = AudioFormat::from_extension(&format)
                .ok_or_else(|| ConfigError::invalid("HEYGEN_AUDIO_FORMAT", &format))?;
        }
        if let Some(dir) = lookup("CHATBOT_AUDIO_DIR") {
            settings.audio_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("HEYGEN_POLL_INTERVAL") {
            settings.poll_interval = parse_seconds("HEYGEN_POLL_INTERVAL", &secs)?;
        }
        if let Some(secs) = lookup("HEYGEN_POLL_TIMEOUT") {
            settings.poll_timeout = parse_seconds("HEYGEN_POLL_TIMEOUT", &secs)?;
        }

        Ok(settings)
    }

    /// Whether a speech credential is configured.
    #[must_use]
    pub const fn narration_enabled(&self) -> bool {
        self.heygen_api_key.is_some()
    }

    /// Sets the audio output directory. Used for the CLI override.
    #[must_use]
    pub fn with_audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = dir.into();
        self
    }

    /// Sets the speech API key, enabling narration.
    #[must_use]
    pub fn with_heygen_api_key(mut self, key: impl Into<String>) -> Self {
        self.heygen_api_key = Some(key.into());
        self
    }

    /// Sets the completion model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = model.into();
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the poll timeout.
    #[must_use]
    pub const fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// The audio output directory as a path.
    #[must_use]
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }
}

/// Parse a duration given as (possibly fractional) seconds.
fn parse_seconds(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = value
        .parse()
        .map_err(|_| ConfigError::invalid(name, value))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::invalid(name, value));
    }
    Ok(Duration::from_secs_f64(secs))
}
