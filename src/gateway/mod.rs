//! Content enrichment gateway boundary.
//!
//! The core depends on two externally implemented operations: room
//! illustration generation and free-text hint generation. Both are
//! asynchronous and may fail; the session absorbs failures into fixed
//! fallback content, so no gateway error ever reaches the player.

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

/// Reference to a generated (or fallback) image.
///
/// Holds either a `data:` URL with inline image bytes or a plain URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wraps an image URL or data URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External generative-content provider.
///
/// Implementations bound their own latency; the session treats a slow
/// or missing response exactly like a failed one.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Generates an illustration for the given prompt.
    async fn illustration(&self, prompt: &str) -> Result<ImageRef, GatewayError>;

    /// Generates a hint for the given room context.
    async fn hint(&self, context: &str) -> Result<String, GatewayError>;
}

/// Gateway failure.
#[derive(Debug, Clone, Display, Error)]
#[display("gateway error: {} at {}:{}", message, file, line)]
pub struct GatewayError {
    /// Error message.
    pub message: String,
    /// Line number where the error was created.
    pub line: u32,
    /// Source file where the error was created.
    pub file: &'static str,
}

impl GatewayError {
    /// Creates a new gateway error, capturing the caller location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Gateway error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
