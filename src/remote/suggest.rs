use crate::foundation::error::{UnderlayError, UnderlayResult};
use serde::{Deserialize, Serialize};

/// Instruction prompt sent to the vision model alongside the image.
pub const SUGGESTION_PROMPT: &str = "Suggest 3 creative and engaging text overlays for this image. \
     Each suggestion should be short (2-5 words) and capture the mood or theme of the image. \
     Format the response as a simple list with one suggestion per line.";

/// Maximum number of suggestions surfaced to the user.
pub const MAX_SUGGESTIONS: usize = 3;

/// A validated text-suggestion request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// The composition snapshot as a `data:image/...` URL.
    pub image_data_url: String,
}

impl SuggestionRequest {
    /// Validate that the payload is an image data URL.
    pub fn new(image_data_url: &str) -> UnderlayResult<Self> {
        if !image_data_url.starts_with("data:image/") {
            return Err(UnderlayError::validation(
                "suggestion input must be a data:image/ URL",
            ));
        }
        Ok(Self {
            image_data_url: image_data_url.to_owned(),
        })
    }
}

/// Extract the raw suggestion text from the chat-completion response body.
///
/// The content must be a string at `choices[0].message.content`; anything
/// else is a hard upstream error.
pub fn parse_suggestion_response(body: &serde_json::Value) -> UnderlayResult<String> {
    body.get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            UnderlayError::upstream(502, "suggestion response missing choices[0].message.content")
        })
}

/// Split the model's free-text reply into at most [`MAX_SUGGESTIONS`] clean
/// suggestions.
///
/// The model is asked for a plain list but often numbers it anyway
/// (`1. foo`, `2) bar`) or bullets it (`- baz`); numbering is stripped, blank
/// lines dropped, and the result truncated.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_list_marker)
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_owned)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let unnumbered = line
        .strip_prefix(|c: char| c.is_ascii_digit())
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
        .and_then(|rest| {
            rest.strip_prefix('.')
                .or_else(|| rest.strip_prefix(')'))
        });
    match unnumbered {
        Some(rest) => rest.trim(),
        None => line.strip_prefix("- ").unwrap_or(line).trim(),
    }
}

/// Text-suggestion collaborator: image in, up to three short overlays out.
pub trait TextSuggestions {
    /// Produce overlay suggestions for the validated request.
    fn suggest(&self, request: &SuggestionRequest) -> UnderlayResult<Vec<String>>;
}

#[cfg(test)]
#[path = "../../tests/unit/remote/suggest.rs"]
mod tests;
