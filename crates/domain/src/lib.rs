//! nim-vision domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters) and the host interface
//! - `answer`: Parsing model replies into classifications
//! - `upload`: Preparing images for inline upload
//! - `usecases`: The classifier service

pub mod answer;
pub mod model;
pub mod ports;
pub mod upload;
pub mod usecases;

pub use upload::EncodedImage;
pub use model::*;
pub use ports::*;
