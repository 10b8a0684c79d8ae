//! Application use cases / business logic

pub mod classify;

pub use classify::{ClassifierService, ClassifierSettings};
