//! Conversation types and the completion provider trait.
//!
//! This module provides:
//! - [`Role`] and [`ChatTurn`]: one message in a conversation, tagged with
//!   who produced it
//! - [`CompletionProvider`]: the single-capability interface every chat
//!   backend implements

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions seeding the conversation.
    System,
    /// A message from the human user.
    User,
    /// A reply from the model.
    Assistant,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in a conversation.
///
/// An ordered sequence of turns forms the conversation history. The history
/// is append-only: after the initial system turn it alternates strictly
/// between user and assistant turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced this turn.
    pub role: Role,
    /// The text content of the turn.
    pub content: String,
}

impl ChatTurn {
    /// Create a system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion backend.
///
/// The endpoint is stateless, so implementations receive the full ordered
/// history on every call and return the assistant's reply text. There is no
/// retry inside the provider; the caller decides what a failed turn means.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate the assistant reply for the given conversation.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] if the remote call fails at the
    /// transport level or the response carries no usable content.
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, CompletionError>;

    /// Name of the backing provider, for logging.
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}
