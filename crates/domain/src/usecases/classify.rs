//! Classification use case

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    answer::{QuestionMode, parse_reply},
    model::{
        CallOptions, CaptureAllResult, CaptureOptions, Classification, Properties, RasterImage,
        VisionPrompt,
    },
    ports::{Camera, CameraProvider, InferenceClient, VisionError, VisionService},
    upload::{DEFAULT_MAX_PAYLOAD_BYTES, EncodedImage},
};

/// Configuration for the classifier service
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Question asked when the caller supplies none
    pub default_question: String,
    /// Cameras callers may classify from
    pub cameras: Vec<String>,
    /// Upper bound on the base64 image payload
    pub max_image_payload_bytes: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            default_question: "describe this image".to_string(),
            cameras: vec![],
            max_image_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// Translates classification requests into remote calls and parsed results
pub struct ClassifierService<M> {
    client: M,
    settings: ClassifierSettings,
    cameras: HashMap<String, Arc<dyn Camera>>,
}

impl<M: InferenceClient> ClassifierService<M> {
    /// Build the service, resolving every allow-listed camera once
    pub fn new(
        client: M,
        settings: ClassifierSettings,
        camera_provider: &dyn CameraProvider,
    ) -> Result<Self, VisionError> {
        if settings.default_question.trim().is_empty() {
            return Err(VisionError::Config(
                "default_question must not be empty".to_string(),
            ));
        }
        if settings.max_image_payload_bytes == 0 {
            return Err(VisionError::Config(
                "max_image_payload_bytes must be positive".to_string(),
            ));
        }

        let mut cameras = HashMap::new();
        for name in &settings.cameras {
            match camera_provider.resolve_camera(name) {
                Some(camera) => {
                    cameras.insert(name.clone(), camera);
                }
                None => {
                    tracing::warn!(
                        camera = %name,
                        "Camera is configured but could not be resolved"
                    );
                }
            }
        }

        Ok(Self {
            client,
            settings,
            cameras,
        })
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// The override when it is non-blank, otherwise the default question
    pub fn effective_question<'a>(&'a self, question: Option<&'a str>) -> &'a str {
        match question {
            Some(q) if !q.trim().is_empty() => q,
            _ => &self.settings.default_question,
        }
    }

    /// Classify one image with one remote call
    pub async fn classify(
        &self,
        image: &RasterImage,
        question: Option<&str>,
    ) -> Result<Vec<Classification>, VisionError> {
        let question = self.effective_question(question);
        let encoded = EncodedImage::prepare(image, self.settings.max_image_payload_bytes)?;

        tracing::info!(
            yes_no = matches!(QuestionMode::detect(question), QuestionMode::YesNo { .. }),
            payload_bytes = encoded.base64.len(),
            "Classifying image"
        );

        let prompt = VisionPrompt {
            question: question.to_string(),
            image: encoded,
        };
        let reply = self.client.ask(&prompt).await?;

        tracing::debug!(reply = %reply, "Model reply");

        let classifications = parse_reply(question, &reply);

        tracing::debug!(
            labels = ?classifications.iter().map(|c| &c.class_name).collect::<Vec<_>>(),
            "Parsed classifications"
        );

        Ok(classifications)
    }

    /// Capture a frame from an allow-listed camera and classify it
    pub async fn classify_from_camera(
        &self,
        camera_name: &str,
        question: Option<&str>,
    ) -> Result<Vec<Classification>, VisionError> {
        let camera = self.camera(camera_name)?;
        let image = camera.capture().await?;
        self.classify(&image, question).await
    }

    /// Capture a frame and return whichever artifacts were asked for
    pub async fn capture_all(
        &self,
        camera_name: &str,
        capture: CaptureOptions,
        question: Option<&str>,
    ) -> Result<CaptureAllResult, VisionError> {
        let camera = self.camera(camera_name)?;
        let image = camera.capture().await?;

        let classifications = if capture.return_classifications {
            Some(self.classify(&image, question).await?)
        } else {
            None
        };

        Ok(CaptureAllResult {
            image: capture.return_image.then_some(image),
            classifications,
        })
    }

    pub fn properties(&self) -> Properties {
        Properties::CLASSIFICATION_ONLY
    }

    fn camera(&self, name: &str) -> Result<&Arc<dyn Camera>, VisionError> {
        if !self.settings.cameras.iter().any(|c| c == name) {
            return Err(VisionError::Config(format!(
                "camera '{}' not permitted",
                name
            )));
        }

        self.cameras.get(name).ok_or_else(|| {
            VisionError::Config(format!(
                "camera '{}' is configured but was not resolved",
                name
            ))
        })
    }
}

/// Bound a call by the caller's deadline, if any
async fn with_deadline<T, F>(timeout: Option<Duration>, call: F) -> Result<T, VisionError>
where
    F: Future<Output = Result<T, VisionError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| VisionError::Timeout)?,
        None => call.await,
    }
}

#[async_trait]
impl<M: InferenceClient> VisionService for ClassifierService<M> {
    async fn get_classifications(
        &self,
        image: &RasterImage,
        _count: u32,
        options: &CallOptions,
    ) -> Result<Vec<Classification>, VisionError> {
        with_deadline(
            options.timeout,
            self.classify(image, options.question.as_deref()),
        )
        .await
    }

    async fn get_classifications_from_camera(
        &self,
        camera_name: &str,
        _count: u32,
        options: &CallOptions,
    ) -> Result<Vec<Classification>, VisionError> {
        with_deadline(
            options.timeout,
            self.classify_from_camera(camera_name, options.question.as_deref()),
        )
        .await
    }

    async fn capture_all_from_camera(
        &self,
        camera_name: &str,
        capture: CaptureOptions,
        options: &CallOptions,
    ) -> Result<CaptureAllResult, VisionError> {
        with_deadline(
            options.timeout,
            self.capture_all(camera_name, capture, options.question.as_deref()),
        )
        .await
    }

    fn get_properties(&self, _options: &CallOptions) -> Properties {
        self.properties()
    }
}
