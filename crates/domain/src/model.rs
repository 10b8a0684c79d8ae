//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Confidence reported for every classification.
///
/// The remote API returns free text only, so there is no real score to carry.
pub const PLACEHOLDER_CONFIDENCE: f64 = 1.0;

/// A raster image as handed over by the host or captured from a camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Encoded image bytes (PNG, JPEG, ...)
    pub bytes: Vec<u8>,
    /// MIME type reported by the producer, if known
    pub mime_type: Option<String>,
}

impl RasterImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: Some(mime_type.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A single classification label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Label, either the yes/no description or the raw model reply
    pub class_name: String,
    /// Always [`PLACEHOLDER_CONFIDENCE`]
    pub confidence: f64,
}

impl Classification {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            confidence: PLACEHOLDER_CONFIDENCE,
        }
    }
}

/// Capabilities advertised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub classifications_supported: bool,
    pub detections_supported: bool,
    pub object_point_clouds_supported: bool,
}

impl Properties {
    /// Classification only: no detections, no 3D
    pub const CLASSIFICATION_ONLY: Properties = Properties {
        classifications_supported: true,
        detections_supported: false,
        object_point_clouds_supported: false,
    };
}

/// Per-call options supplied by the host
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overrides the configured default question when non-blank
    pub question: Option<String>,
    /// Deadline for the whole call
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            timeout: None,
        }
    }
}

/// Which artifacts a capture-all call should return
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    pub return_image: bool,
    pub return_classifications: bool,
}

/// Result of a capture-all call
#[derive(Debug, Clone, Default)]
pub struct CaptureAllResult {
    /// The captured frame, when requested
    pub image: Option<RasterImage>,
    /// Classifications of the captured frame, when requested
    pub classifications: Option<Vec<Classification>>,
}

/// Question and prepared image for one remote call
#[derive(Debug, Clone)]
pub struct VisionPrompt {
    /// Effective question text
    pub question: String,
    /// Image ready to embed in the request
    pub image: crate::upload::EncodedImage,
}
