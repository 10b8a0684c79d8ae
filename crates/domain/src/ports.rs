//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems:
//! the remote inference endpoint, the host's camera registry, and the host-facing
//! vision service interface itself.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::model::{
    CallOptions, CaptureAllResult, CaptureOptions, Classification, Properties, RasterImage,
    VisionPrompt,
};

/// Error type for every vision operation
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Remote call failed: {0}")]
    RemoteCall(String),
    #[error("Unexpected response body: {0}")]
    ResponseParse(String),
    #[error("Timeout")]
    Timeout,
    #[error("Camera error: {0}")]
    Camera(String),
}

/// Port for the remote multimodal model
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send one prompt and return the assistant's reply text
    async fn ask(&self, prompt: &VisionPrompt) -> Result<String, VisionError>;
}

#[async_trait]
impl<M: InferenceClient + ?Sized> InferenceClient for Box<M> {
    async fn ask(&self, prompt: &VisionPrompt) -> Result<String, VisionError> {
        (**self).ask(prompt).await
    }
}

/// A camera that can capture its current frame
#[async_trait]
pub trait Camera: Send + Sync {
    async fn capture(&self) -> Result<RasterImage, VisionError>;
}

/// Port for resolving camera names into cameras (host dependency injection)
pub trait CameraProvider: Send + Sync {
    /// Returns `None` when the host has no camera by that name
    fn resolve_camera(&self, name: &str) -> Option<Arc<dyn Camera>>;
}

/// The host-facing vision service interface
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Classify an image. `count` is accepted for interface compatibility only.
    async fn get_classifications(
        &self,
        image: &RasterImage,
        count: u32,
        options: &CallOptions,
    ) -> Result<Vec<Classification>, VisionError>;

    /// Capture a frame from an allow-listed camera and classify it
    async fn get_classifications_from_camera(
        &self,
        camera_name: &str,
        count: u32,
        options: &CallOptions,
    ) -> Result<Vec<Classification>, VisionError>;

    /// Capture a frame and return the requested artifacts
    async fn capture_all_from_camera(
        &self,
        camera_name: &str,
        capture: CaptureOptions,
        options: &CallOptions,
    ) -> Result<CaptureAllResult, VisionError>;

    /// Static capabilities; never performs I/O
    fn get_properties(&self, options: &CallOptions) -> Properties;
}
