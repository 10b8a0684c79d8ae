//! Configuration loading and management

use anyhow::{Context, Result};
use nim_vision_adapters::llm::{
    DEFAULT_INVOKE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_NAME, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_P,
};
use nim_vision_domain::upload::DEFAULT_MAX_PAYLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub stub: StubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_camera_dir")]
    pub camera_dir: PathBuf,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default = "default_question")]
    pub default_question: String,

    #[serde(default = "default_invoke_url")]
    pub invoke_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_image_payload_bytes")]
    pub max_image_payload_bytes: usize,

    #[serde(default)]
    pub cameras: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubConfig {
    #[serde(default = "default_stub_reply")]
    pub reply: String,
}

// Default value functions
fn default_camera_dir() -> PathBuf {
    PathBuf::from("./cameras")
}

fn default_provider() -> String {
    "nim".to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

fn default_question() -> String {
    "describe this image".to_string()
}

fn default_invoke_url() -> String {
    DEFAULT_INVOKE_URL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_image_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

fn default_stub_reply() -> String {
    "stub reply".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            camera_dir: default_camera_dir(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model_name: default_model_name(),
            default_question: default_question(),
            invoke_url: default_invoke_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout(),
            max_image_payload_bytes: default_max_image_payload_bytes(),
            cameras: vec![],
        }
    }
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            reply: default_stub_reply(),
        }
    }
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "(not set)"
        } else {
            "[REDACTED]"
        };

        f.debug_struct("VisionConfig")
            .field("provider", &self.provider)
            .field("api_key", &api_key)
            .field("model_name", &self.model_name)
            .field("default_question", &self.default_question)
            .field("invoke_url", &self.invoke_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_image_payload_bytes", &self.max_image_payload_bytes)
            .field("cameras", &self.cameras)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("NIM_VISION")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("vision.cameras"),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Every problem that would stop the service from starting
    pub fn problems(&self) -> Vec<String> {
        let vision = &self.vision;
        let mut problems = Vec::new();

        match vision.provider.as_str() {
            "nim" => {
                if vision.api_key.trim().is_empty() {
                    problems.push(
                        "vision.api_key is required (or set NIM_VISION__VISION__API_KEY)"
                            .to_string(),
                    );
                }
            }
            "stub" => {}
            other => problems.push(format!("Unknown vision provider: {}", other)),
        }

        if vision.model_name.trim().is_empty() {
            problems.push("vision.model_name must not be empty".to_string());
        }
        if vision.default_question.trim().is_empty() {
            problems.push("vision.default_question must not be empty".to_string());
        }
        if !(vision.invoke_url.starts_with("https://") || vision.invoke_url.starts_with("http://"))
        {
            problems.push(format!(
                "vision.invoke_url must be an http(s) URL, got '{}'",
                vision.invoke_url
            ));
        }
        if vision.max_tokens == 0 {
            problems.push("vision.max_tokens must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&vision.temperature) {
            problems.push(format!(
                "vision.temperature must be within 0..=2, got {}",
                vision.temperature
            ));
        }
        if !(0.0..=1.0).contains(&vision.top_p) {
            problems.push(format!(
                "vision.top_p must be within 0..=1, got {}",
                vision.top_p
            ));
        }
        if vision.timeout_secs == 0 {
            problems.push("vision.timeout_secs must be positive".to_string());
        }
        if vision.max_image_payload_bytes == 0 {
            problems.push("vision.max_image_payload_bytes must be positive".to_string());
        }

        let mut seen = HashSet::new();
        for camera in &vision.cameras {
            if camera.trim().is_empty() {
                problems.push("vision.cameras contains an empty name".to_string());
            } else if !seen.insert(camera.as_str()) {
                problems.push(format!("vision.cameras lists '{}' twice", camera));
            }
        }

        problems
    }

    /// Fail with every problem at once
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }

        anyhow::bail!("Invalid configuration:\n  - {}", problems.join("\n  - "))
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# nim-vision configuration

[general]
# A camera named "front" reads its current frame from <camera_dir>/front.{jpg,jpeg,png}
camera_dir = "./cameras"

[vision]
provider = "nim"  # nim, stub
# Prefer the NIM_VISION__VISION__API_KEY environment variable
# api_key = "nvapi-..."
model_name = "meta/llama-3.2-11b-vision-instruct"
default_question = "describe this image"
invoke_url = "https://integrate.api.nvidia.com/v1/chat/completions"
max_tokens = 512
temperature = 1.0
top_p = 1.0
timeout_secs = 60
# Base64 payload limit for inline images
max_image_payload_bytes = 180000
cameras = []

[stub]
reply = "stub reply"
"#
        .to_string()
    }
}
