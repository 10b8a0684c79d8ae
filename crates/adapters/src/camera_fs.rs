//! Filesystem-backed cameras
//!
//! A camera named `front` is the first of `front.jpg`, `front.jpeg` or
//! `front.png` found in the camera directory. Every capture re-reads the file,
//! so an external process can keep overwriting it with fresh frames.

use async_trait::async_trait;
use nim_vision_domain::{Camera, CameraProvider, RasterImage, VisionError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FRAME_EXTENSIONS: [(&str, &str); 3] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// Resolves camera names to frame files in a directory
pub struct FsCameraProvider {
    camera_dir: PathBuf,
}

impl FsCameraProvider {
    pub fn new(camera_dir: impl AsRef<Path>) -> Self {
        Self {
            camera_dir: camera_dir.as_ref().to_path_buf(),
        }
    }

    pub fn camera_dir(&self) -> &Path {
        &self.camera_dir
    }

    /// Frame file and MIME type backing `name`, if one exists
    pub fn frame_path(&self, name: &str) -> Option<(PathBuf, &'static str)> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }

        FRAME_EXTENSIONS.iter().find_map(|(ext, mime)| {
            let path = self.camera_dir.join(format!("{}.{}", name, ext));
            path.is_file().then_some((path, *mime))
        })
    }
}

impl CameraProvider for FsCameraProvider {
    fn resolve_camera(&self, name: &str) -> Option<Arc<dyn Camera>> {
        let (path, mime_type) = self.frame_path(name)?;
        tracing::debug!(camera = %name, path = %path.display(), "Resolved camera");
        Some(Arc::new(FileCamera { path, mime_type }))
    }
}

/// A camera whose current frame is a file on disk
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
    mime_type: &'static str,
}

#[async_trait]
impl Camera for FileCamera {
    async fn capture(&self) -> Result<RasterImage, VisionError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            VisionError::Camera(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        Ok(RasterImage::with_mime_type(bytes, self.mime_type))
    }
}
