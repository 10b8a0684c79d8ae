//! Subcommand implementations

pub mod capture;
pub mod classify;
pub mod config;
pub mod doctor;
pub mod properties;

use anyhow::{Context, Result, bail};
use nim_vision_adapters::camera::FsCameraProvider;
use nim_vision_adapters::llm::{NimConfig, NimVisionClient, StubInferenceClient};
use nim_vision_domain::usecases::{ClassifierService, ClassifierSettings};
use nim_vision_domain::{Classification, InferenceClient};
use secrecy::SecretString;

use crate::config::AppConfig;

pub(crate) type Service = ClassifierService<Box<dyn InferenceClient>>;

/// Validate the configuration and wire up the classifier service
pub(crate) fn build_service(config: &AppConfig) -> Result<Service> {
    config.validate()?;

    let client = build_client(config)?;
    let settings = ClassifierSettings {
        default_question: config.vision.default_question.clone(),
        cameras: config.vision.cameras.clone(),
        max_image_payload_bytes: config.vision.max_image_payload_bytes,
    };
    let cameras = FsCameraProvider::new(&config.general.camera_dir);

    ClassifierService::new(client, settings, &cameras)
        .context("Failed to initialize classifier service")
}

pub(crate) fn build_client(config: &AppConfig) -> Result<Box<dyn InferenceClient>> {
    let vision = &config.vision;

    match vision.provider.as_str() {
        "nim" => {
            let nim_config = NimConfig {
                api_key: SecretString::new(vision.api_key.clone().into()),
                invoke_url: vision.invoke_url.clone(),
                model_name: vision.model_name.clone(),
                max_tokens: vision.max_tokens,
                temperature: vision.temperature,
                top_p: vision.top_p,
                timeout_secs: vision.timeout_secs,
            };
            let client =
                NimVisionClient::new(nim_config).context("Failed to configure NIM client")?;
            Ok(Box::new(client))
        }
        "stub" => Ok(Box::new(StubInferenceClient::with_reply(
            config.stub.reply.clone(),
        ))),
        other => bail!("Unknown vision provider: {}", other),
    }
}

pub(crate) fn print_classifications(classifications: &[Classification]) {
    if classifications.is_empty() {
        println!("No classifications.");
        return;
    }

    println!("Classifications:");
    for c in classifications {
        println!("  - {} (confidence: {:.2})", c.class_name, c.confidence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_service_with_stub_provider() {
        let mut config = AppConfig::default();
        config.vision.provider = "stub".to_string();

        assert!(build_service(&config).is_ok());
    }

    #[test]
    fn test_build_service_requires_api_key_for_nim() {
        let config = AppConfig::default();

        let err = build_service(&config).err().unwrap();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_build_client_nim_with_key() {
        let mut config = AppConfig::default();
        config.vision.api_key = "nvapi-test".to_string();

        assert!(build_client(&config).is_ok());
    }
}
