//! nim-vision adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `llm`: Inference clients (NVIDIA NIM chat completions, stub)
//! - `camera`: Filesystem-backed camera provider

mod camera_fs;

pub mod llm;

/// Re-exports for camera adapters
pub mod camera {
    pub use crate::camera_fs::{FileCamera, FsCameraProvider};
}
