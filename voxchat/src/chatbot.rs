//! Conversation orchestration.
//!
//! [`ChatBot`] owns the conversation history and wires the completion
//! provider to the optional speech synthesizer. Completion failures are
//! conversation-fatal and propagate to the caller; synthesis failures are
//! logged and swallowed so a broken narration never ends the conversation.

use std::fmt;
use std::path::PathBuf;

use crate::chat::{ChatTurn, CompletionProvider};
use crate::config::Settings;
use crate::error::{CompletionError, Result};
use crate::openai::OpenAI;
use crate::synthesis::{SpeechClient, SpeechSynthesizer};

/// System prompt seeding every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an enthusiastic assistant that creates \
     friendly, helpful replies. Keep answers concise and include actionable steps where \
     possible.";

/// Conversation manager linking the completion model with speech narration.
pub struct ChatBot {
    settings: Settings,
    completion: Box<dyn CompletionProvider>,
    speech: Option<Box<dyn SpeechSynthesizer>>,
    history: Vec<ChatTurn>,
}

impl fmt::Debug for ChatBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatBot")
            .field("provider", &self.completion.provider_name())
            .field("narration_enabled", &self.speech.is_some())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl ChatBot {
    /// Build a bot from loaded settings.
    ///
    /// The completion client is always constructed; the speech client only
    /// when a speech credential is present — its absence is the sole switch
    /// disabling narration.
    ///
    /// # Errors
    ///
    /// Fails if either client cannot be constructed.
    pub fn new(settings: Settings) -> Result<Self> {
        let completion = OpenAI::from_settings(&settings)?;
        let speech = SpeechClient::from_settings(&settings)?;

        Ok(Self::with_providers(
            settings,
            Box::new(completion),
            speech.map(|client| Box::new(client) as Box<dyn SpeechSynthesizer>),
        ))
    }

    /// Build a bot over injected providers.
    ///
    /// This is how alternate backends and test doubles come in; the bot
    /// itself never names a concrete provider.
    #[must_use]
    pub fn with_providers(
        settings: Settings,
        completion: Box<dyn CompletionProvider>,
        speech: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self {
            settings,
            completion,
            speech,
            history: vec![ChatTurn::system(DEFAULT_SYSTEM_PROMPT)],
        }
    }

    /// Replace the seeding system prompt. Only meaningful before the first
    /// [`ask`](Self::ask).
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.history[0] = ChatTurn::system(prompt);
        self
    }

    /// Send a user prompt and return the assistant's reply.
    ///
    /// The full history plus the new user turn goes to the provider; on
    /// success both the user turn and the reply are appended (history grows
    /// by exactly two). On failure the history is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates any [`CompletionError`] from the provider; a broken model
    /// call is conversation-fatal and is never retried here.
    pub async fn ask(&mut self, prompt: impl Into<String>) -> std::result::Result<String, CompletionError> {
        let user = ChatTurn::user(prompt);

        let mut turns = self.history.clone();
        turns.push(user.clone());

        let reply = self.completion.generate(&turns).await?;

        self.history.push(user);
        self.history.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }

    /// Narrate `message` to a timestamped audio file if narration is
    /// configured.
    ///
    /// Returns the written path, or `None` when narration is disabled or the
    /// synthesis failed. Failures are logged and swallowed: audio is an
    /// enhancement, never a reason to abort the conversation.
    pub async fn speak(&self, message: &str) -> Option<PathBuf> {
        let Some(speech) = self.speech.as_deref() else {
            tracing::debug!("speech synthesis not configured; skipping narration");
            return None;
        };

        let destination = self.audio_destination();
        match speech.synthesize_to_file(message, &destination).await {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "failed to synthesize narration");
                None
            }
        }
    }

    /// Read-only snapshot of the conversation history.
    #[must_use]
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Whether replies will be narrated.
    #[must_use]
    pub const fn narration_enabled(&self) -> bool {
        self.speech.is_some()
    }

    /// The settings this bot was built from.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Destination path for the next audio artifact.
    fn audio_destination(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!(
            "audio_{timestamp}.{}",
            self.settings.audio_format.extension()
        );
        self.settings.audio_dir.join(filename)
    }
}
