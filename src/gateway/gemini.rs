//! Gemini-backed content gateway.

use super::{ContentGateway, GatewayError, ImageRef};
use async_trait::async_trait;
use derive_getters::Getters;
use tracing::{debug, error, info, instrument, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Style suffix appended to every illustration prompt.
const IMAGE_STYLE_SUFFIX: &str =
    " High quality, cinematic lighting, digital art style, cybernetic atmosphere, 4k resolution, no text.";

/// Configuration for the Gemini gateway.
#[derive(Debug, Clone, Getters)]
pub struct GeminiConfig {
    /// API key; `None` degrades every call to the failure path.
    api_key: Option<String>,
    /// Model used for illustration generation.
    image_model: String,
    /// Model used for hint generation.
    text_model: String,
}

impl GeminiConfig {
    /// Creates a configuration with explicit models.
    #[instrument(skip(api_key))]
    pub fn new(api_key: Option<String>, image_model: String, text_model: String) -> Self {
        debug!("Creating Gemini config");
        Self {
            api_key,
            image_model,
            text_model,
        }
    }

    /// Builds a configuration from the `GEMINI_API_KEY` environment
    /// variable, with the reference models.
    ///
    /// A missing key is not an error: the resulting client fails every
    /// call, which the session turns into fallback content.
    #[instrument]
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set, gateway calls will degrade to fallback content");
        }
        Self::new(
            api_key,
            "gemini-2.5-flash-image".to_string(),
            "gemini-3-flash-preview".to_string(),
        )
    }

    /// Builds a keyless configuration whose calls always take the
    /// failure path, for offline runs.
    #[instrument]
    pub fn offline() -> Self {
        Self::new(
            None,
            "gemini-2.5-flash-image".to_string(),
            "gemini-3-flash-preview".to_string(),
        )
    }
}

/// Content gateway backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Creates a new client.
    #[instrument(skip(config), fields(image_model = %config.image_model(), text_model = %config.text_model()))]
    pub fn new(config: GeminiConfig) -> Self {
        info!("Creating Gemini client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        self.config
            .api_key()
            .as_deref()
            .ok_or_else(|| GatewayError::new("GEMINI_API_KEY not set".to_string()))
    }

    /// Sends a generateContent request and returns the parsed body.
    #[instrument(skip(self, body))]
    async fn generate(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:generateContent", API_BASE, model);

        debug!(model, "Sending request to Gemini");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                GatewayError::new(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response");
            GatewayError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Gemini API error");
            return Err(GatewayError::new(format!(
                "Gemini API error {}: {}",
                status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing Gemini response");
        serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, "Failed to parse Gemini response");
            GatewayError::new(format!("Failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl ContentGateway for GeminiClient {
    /// Generates a 16:9 room illustration and returns it as a data URL.
    #[instrument(skip(self, prompt))]
    async fn illustration(&self, prompt: &str) -> Result<ImageRef, GatewayError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": format!("{}{}", prompt, IMAGE_STYLE_SUFFIX) }]
            }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": "16:9" }
            }
        });

        let response = self.generate(self.config.image_model(), body).await?;

        let parts = response["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                error!("No content parts in Gemini response");
                GatewayError::new("No content parts in Gemini response".to_string())
            })?;

        for part in parts {
            if let Some(data) = part["inlineData"]["data"].as_str() {
                info!(data_length = data.len(), "Generated illustration");
                return Ok(ImageRef::new(format!("data:image/png;base64,{}", data)));
            }
        }

        Err(GatewayError::new(
            "No inline image data in Gemini response".to_string(),
        ))
    }

    /// Generates a short, encouraging hint for the given room context.
    #[instrument(skip(self, context))]
    async fn hint(&self, context: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "You are the AI guide in an escape game for children. Room context: {}. \
             The player is stuck. Write a short, encouraging hint (2 sentences max) \
             that points them in the right direction without giving the solution away.",
            context
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self.generate(self.config.text_model(), body).await?;

        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!("No text content in Gemini response");
                GatewayError::new("No text content in Gemini response".to_string())
            })?
            .to_string();

        info!(content_length = text.len(), "Generated hint");
        Ok(text)
    }
}
