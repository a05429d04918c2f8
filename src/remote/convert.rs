use crate::foundation::error::{UnderlayError, UnderlayResult};
use serde::{Deserialize, Serialize};

/// Filename template for the assembled PDF download.
pub const PDF_FILENAME: &str = "converted-images.pdf";

/// Output format for HEIC/HEIF conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossy JPEG output.
    Jpeg,
    /// Lossless PNG output.
    Png,
}

impl TargetFormat {
    /// MIME type of the converted bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// A validated HEIC/HEIF conversion request.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertRequest {
    /// Raw HEIC/HEIF bytes.
    pub bytes: Vec<u8>,
    /// Output format.
    pub format: TargetFormat,
    /// Encoder quality in `(0, 1]`.
    pub quality: f64,
}

impl ConvertRequest {
    /// Validate the required fields.
    pub fn new(bytes: Vec<u8>, format: TargetFormat, quality: f64) -> UnderlayResult<Self> {
        if bytes.is_empty() {
            return Err(UnderlayError::validation("file and format are required"));
        }
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(UnderlayError::validation("quality must be in (0, 1]"));
        }
        Ok(Self {
            bytes,
            format,
            quality,
        })
    }
}

/// HEIC/HEIF decode collaborator; decoding itself stays an external library
/// concern.
pub trait HeicDecode {
    /// Convert HEIC/HEIF bytes into the requested target format.
    fn convert(&self, request: &ConvertRequest) -> UnderlayResult<Vec<u8>>;
}

/// Page sizes offered by the PDF export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// ISO A4.
    #[default]
    A4,
    /// US Letter.
    Letter,
}

/// Page orientation for the PDF export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// A validated image-to-PDF assembly request. Per-page scaling and centering
/// are the collaborator's responsibility.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfRequest {
    /// Encoded raster pages, in order.
    pub pages: Vec<Vec<u8>>,
    /// Page size.
    pub page_size: PageSize,
    /// Page orientation.
    pub orientation: PageOrientation,
}

impl PdfRequest {
    /// Validate that at least one page is present.
    pub fn new(
        pages: Vec<Vec<u8>>,
        page_size: PageSize,
        orientation: PageOrientation,
    ) -> UnderlayResult<Self> {
        if pages.is_empty() || pages.iter().any(Vec::is_empty) {
            return Err(UnderlayError::validation(
                "pdf assembly requires at least one non-empty image",
            ));
        }
        Ok(Self {
            pages,
            page_size,
            orientation,
        })
    }
}

/// PDF assembly collaborator: ordered rasters in, a single PDF out.
pub trait PdfAssemble {
    /// Assemble the validated request into PDF bytes.
    fn assemble(&self, request: &PdfRequest) -> UnderlayResult<Vec<u8>>;
}

#[cfg(test)]
#[path = "../../tests/unit/remote/convert.rs"]
mod tests;
