//! Prelude module for convenient imports.
//!
//! Re-exports the types most callers need:
//!
//! ```rust,ignore
//! use voxchat::prelude::*;
//! ```

pub use crate::audio::{AudioFormat, Voice};
pub use crate::chat::{ChatTurn, CompletionProvider, Role};
pub use crate::chatbot::{ChatBot, DEFAULT_SYSTEM_PROMPT};
pub use crate::config::Settings;
pub use crate::error::{CompletionError, ConfigError, Error, Result, SynthesisError};
pub use crate::openai::OpenAI;
pub use crate::synthesis::{
    HttpSynthesisApi, SpeechClient, SpeechSynthesizer, SubmitOutcome, SynthesisApi, TaskStatus,
};
