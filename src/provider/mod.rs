//! The upstream AI provider boundary.
//!
//! The relay handler only ever talks to a [`ChatProvider`], a process-wide
//! singleton constructed once from the environment at startup. The trait
//! keeps the handler testable against a scripted stand-in; the one real
//! implementation lives in [`openai`].

use async_trait::async_trait;
use thiserror::Error;

use crate::api::WireMessage;

pub mod openai;

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached or the transfer broke down.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with an error status of its own. The status is
    /// carried through to the relay response.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered 200 but the body was not the expected shape.
    #[error("provider returned a malformed response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// The HTTP status the relay should surface for this failure.
    pub fn relay_status(&self) -> u16 {
        match self {
            ProviderError::Api { status, .. } => *status,
            ProviderError::Transport(_) | ProviderError::Decode(_) => 502,
        }
    }
}

/// One generated-image descriptor from an image-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run the full history through the provider's chat completion and
    /// return the single assistant message it produced.
    async fn complete_chat(
        &self,
        model: &str,
        history: &[WireMessage],
    ) -> Result<String, ProviderError>;

    /// Generate images for a prompt. May legitimately return an empty list;
    /// the relay decides what that means.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<GeneratedImage>, ProviderError>;
}
