//! Task-based speech synthesis client.
//!
//! The speech service may answer a submit request synchronously with inline
//! audio, or asynchronously with a task id that must be polled until the
//! audio is ready. [`SpeechClient`] hides that difference behind one call:
//! submit, poll while in flight, download or decode, persist.
//!
//! The HTTP transport sits behind [`SynthesisApi`] so the polling state
//! machine can be driven by scripted doubles in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::audio::AudioFormat;
use crate::config::Settings;
use crate::error::SynthesisError;

/// Submit request body.
#[derive(Debug, Clone, Serialize)]
struct SubmitRequest {
    voice_id: String,
    text: String,
    format: String,
}

/// Payload of a submit response, inside the `data` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
struct SubmitData {
    /// Base64 audio, present when the service answered synchronously.
    #[serde(default)]
    audio: Option<String>,
    /// Task id to poll, present on the asynchronous path.
    #[serde(default, alias = "taskId")]
    task_id: Option<String>,
}

/// Submit response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
struct SubmitEnvelope {
    #[serde(default)]
    data: SubmitData,
}

/// Result of one submit call: the service either delivered audio inline or
/// handed back a task to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Decoded audio bytes, delivered synchronously. No polling happens.
    Immediate(Vec<u8>),
    /// Identifier of an in-flight synthesis task.
    Pending(String),
}

impl SubmitOutcome {
    /// Classify a submit envelope.
    fn from_envelope(envelope: SubmitEnvelope) -> Result<Self, SynthesisError> {
        let data = envelope.data;
        if let Some(audio) = data.audio {
            return Ok(Self::Immediate(BASE64.decode(audio)?));
        }
        data.task_id.map(Self::Pending).ok_or_else(|| {
            SynthesisError::protocol("submit response missing audio or task_id")
        })
    }
}

/// Parsed task-status payload.
///
/// Unknown fields are retained so failure payloads can be reported exactly
/// as the service sent them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStatus {
    /// Status token as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Inline base64 audio, one shape of a completed task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Download URL, the other shape of a completed task.
    #[serde(default, alias = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Additional fields the service reported, kept for diagnostics.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Status response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    data: TaskStatus,
}

impl TaskStatus {
    /// Whether the task finished successfully.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    /// Whether the remote gave up on the task. Nothing is retried past this.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_deref(), Some("failed" | "error"))
    }

    /// The payload rendered for error reporting.
    #[must_use]
    pub fn payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Transport operations against the speech service.
///
/// The production implementation is [`HttpSynthesisApi`]; tests substitute
/// scripted doubles so the polling machine runs deterministically.
#[async_trait]
pub trait SynthesisApi: Send + Sync {
    /// Submit text for synthesis.
    async fn submit(
        &self,
        text: &str,
        voice_id: &str,
        format: AudioFormat,
    ) -> Result<SubmitOutcome, SynthesisError>;

    /// Fetch the current status of an in-flight task.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, SynthesisError>;

    /// Download finished audio from the given URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// HTTP transport for a task-based speech service.
#[derive(Debug, Clone)]
pub struct HttpSynthesisApi {
    api_key: String,
    api_base: String,
    client: Client,
}

impl HttpSynthesisApi {
    const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
    const STATUS_TIMEOUT: Duration = Duration::from_secs(15);
    const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new transport.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, SynthesisError> {
        let client = Client::builder().build().map_err(|e| SynthesisError::Api {
            status: None,
            body: format!("Failed to create HTTP client: {e}"),
        })?;

        Ok(Self {
            api_key: api_key.into(),
            api_base: api_base.into(),
            client,
        })
    }

    fn tts_url(&self) -> String {
        format!("{}/tts", self.api_base)
    }

    fn status_url(&self, task_id: &str) -> String {
        format!("{}/task-status/{task_id}", self.api_base)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Turn a non-2xx response into an API error carrying the body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SynthesisError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SynthesisError::api(status.as_u16(), body))
    }
}

#[async_trait]
impl SynthesisApi for HttpSynthesisApi {
    async fn submit(
        &self,
        text: &str,
        voice_id: &str,
        format: AudioFormat,
    ) -> Result<SubmitOutcome, SynthesisError> {
        let body = SubmitRequest {
            voice_id: voice_id.to_owned(),
            text: text.to_owned(),
            format: format.as_str().to_owned(),
        };

        let response = self
            .client
            .post(self.tts_url())
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(Self::SUBMIT_TIMEOUT)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let envelope: SubmitEnvelope = response
            .json()
            .await
            .map_err(|e| SynthesisError::protocol(format!("malformed submit response: {e}")))?;

        SubmitOutcome::from_envelope(envelope)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, SynthesisError> {
        let response = self
            .client
            .get(self.status_url(task_id))
            .header("Authorization", self.bearer())
            .timeout(Self::STATUS_TIMEOUT)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let envelope: StatusEnvelope = response
            .json()
            .await
            .map_err(|e| SynthesisError::protocol(format!("malformed status response: {e}")))?;

        Ok(envelope.data)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .get(url)
            .timeout(Self::DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// A speech backend that turns text into a saved audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and write the audio to `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`SynthesisError`] on any unrecoverable condition; no file
    /// is written unless synthesis succeeded.
    async fn synthesize_to_file(
        &self,
        text: &str,
        destination: &Path,
    ) -> Result<PathBuf, SynthesisError>;
}

/// Speech synthesis client wrapping the submit/poll/persist state machine.
///
/// One call, both service shapes: a synchronous answer terminates at submit;
/// an asynchronous one polls the task at a fixed interval until it completes,
/// fails, or the wall-clock budget (measured from submission) runs out.
pub struct SpeechClient {
    api: Box<dyn SynthesisApi>,
    voice_id: String,
    format: AudioFormat,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechClient")
            .field("voice_id", &self.voice_id)
            .field("format", &self.format)
            .field("poll_interval", &self.poll_interval)
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

impl SpeechClient {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn with_api(
        api: Box<dyn SynthesisApi>,
        voice_id: impl Into<String>,
        format: AudioFormat,
        poll_interval: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            api,
            voice_id: voice_id.into(),
            format,
            poll_interval,
            poll_timeout,
        }
    }

    /// Create a client from loaded settings, or `None` when no speech
    /// credential is configured.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP transport cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, SynthesisError> {
        let Some(api_key) = settings.heygen_api_key.as_deref() else {
            return Ok(None);
        };

        let api = HttpSynthesisApi::new(api_key, &settings.heygen_api_base)?;
        Ok(Some(Self::with_api(
            Box::new(api),
            &settings.heygen_voice_id,
            settings.audio_format,
            settings.poll_interval,
            settings.poll_timeout,
        )))
    }

    /// Synthesize `text` and return the audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let submitted_at = Instant::now();
        match self
            .api
            .submit(text, &self.voice_id, self.format)
            .await?
        {
            SubmitOutcome::Immediate(audio) => Ok(audio),
            SubmitOutcome::Pending(task_id) => self.poll_for_audio(&task_id, submitted_at).await,
        }
    }

    /// Poll the task until a terminal status or the deadline.
    ///
    /// The deadline is anchored at submission time, so the budget covers
    /// generation latency, not just polling. Unrecognized statuses keep
    /// polling; the deadline bounds them.
    async fn poll_for_audio(
        &self,
        task_id: &str,
        submitted_at: Instant,
    ) -> Result<Vec<u8>, SynthesisError> {
        let deadline = submitted_at + self.poll_timeout;

        while Instant::now() < deadline {
            let status = self.api.task_status(task_id).await?;

            if status.is_completed() {
                if let Some(audio) = status.audio.as_deref() {
                    return Ok(BASE64.decode(audio)?);
                }
                if let Some(url) = status.audio_url.as_deref() {
                    return self.api.download(url).await;
                }
                return Err(SynthesisError::protocol("completed task missing audio data"));
            }
            if status.is_failed() {
                return Err(SynthesisError::task_failed(task_id, status.payload()));
            }

            tracing::trace!(
                task_id,
                status = status.status.as_deref().unwrap_or("unknown"),
                "synthesis task still in flight"
            );
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(SynthesisError::timeout(task_id, submitted_at.elapsed()))
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize_to_file(
        &self,
        text: &str,
        destination: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        let audio = self.synthesize(text).await?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(destination, &audio)?;

        tracing::info!(
            path = %destination.display(),
            bytes = audio.len(),
            "saved synthesized audio"
        );
        Ok(destination.to_path_buf())
    }
}
