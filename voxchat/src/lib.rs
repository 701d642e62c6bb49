//! voxchat - a conversational assistant that answers in text and speech
//!
//! This crate provides the building blocks for a chat assistant that relays
//! user text to an OpenAI-compatible completion API and optionally narrates
//! each reply through a task-based text-to-speech service, saving the audio
//! locally.

pub mod audio;
pub mod chat;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod openai;
pub mod prelude;
pub mod synthesis;

pub use error::{CompletionError, ConfigError, Error, Result, SynthesisError};
