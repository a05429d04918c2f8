use crate::foundation::error::{UnderlayError, UnderlayResult};
use serde::{Deserialize, Serialize};

/// Filename template for the cutout-over-generated-background download.
pub const WITH_BACKGROUND_FILENAME: &str = "image-with-background.png";

/// Fixed generation parameters sent with every background-generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier.
    pub model_name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Diffusion step count.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub cfg_scale: f64,
    /// Whether the upstream refiner pass is enabled.
    pub enable_refiner: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model_name: "SD1.5".to_owned(),
            width: 1024,
            height: 1024,
            steps: 30,
            cfg_scale: 5.0,
            enable_refiner: false,
        }
    }
}

/// A validated background-generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// User-entered prompt, guaranteed non-blank.
    pub prompt: String,
    /// Generation parameters.
    pub params: GenerationParams,
}

impl GenerationRequest {
    /// Validate the prompt and attach the default parameters.
    ///
    /// An empty or whitespace-only prompt never leaves the client: the
    /// request is rejected here, before anything is sent.
    pub fn new(prompt: &str) -> UnderlayResult<Self> {
        if prompt.trim().is_empty() {
            return Err(UnderlayError::validation("generation prompt must be non-empty"));
        }
        Ok(Self {
            prompt: prompt.to_owned(),
            params: GenerationParams::default(),
        })
    }
}

/// A base64-encoded image as returned by the generation upstream.
///
/// The consumer never decodes it; the payload is handed to the shell as a
/// `data:` URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Base64Image(pub String);

impl Base64Image {
    /// Wrap into a `data:image/png;base64,...` URL for direct display.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }
}

/// Extract the generated image from the upstream's JSON response body.
///
/// The upstream returns `{"images": [{"image": "<base64>", ...}]}`; a missing
/// or malformed shape is a hard upstream error, never silently ignored.
pub fn parse_generation_response(body: &serde_json::Value) -> UnderlayResult<Base64Image> {
    body.get("images")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("image"))
        .and_then(|v| v.as_str())
        .map(|s| Base64Image(s.to_owned()))
        .ok_or_else(|| {
            UnderlayError::upstream(502, "generation response missing images[0].image")
        })
}

/// Image-generation collaborator: prompt in, one base64 image out.
pub trait ImageGeneration {
    /// Generate a background for the validated request.
    fn generate(&self, request: &GenerationRequest) -> UnderlayResult<Base64Image>;
}

#[cfg(test)]
#[path = "../../tests/unit/remote/generate.rs"]
mod tests;
