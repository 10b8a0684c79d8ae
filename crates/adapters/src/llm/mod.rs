//! Inference client adapters

pub mod nim;
pub mod stub;

pub use nim::{NimConfig, NimVisionClient};
pub use stub::StubInferenceClient;

pub const DEFAULT_MODEL_NAME: &str = "meta/llama-3.2-11b-vision-instruct";
pub const DEFAULT_INVOKE_URL: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
