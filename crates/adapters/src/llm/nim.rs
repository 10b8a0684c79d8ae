//! NVIDIA NIM chat-completions adapter

use async_trait::async_trait;
use nim_vision_domain::{InferenceClient, VisionError, VisionPrompt};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    DEFAULT_INVOKE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_NAME, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_P,
};

/// Settings for the NIM client
#[derive(Debug)]
pub struct NimConfig {
    /// Bearer credential
    pub api_key: SecretString,
    /// Full chat-completions URL
    pub invoke_url: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl NimConfig {
    /// Config with default endpoint, model and sampling parameters
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            invoke_url: DEFAULT_INVOKE_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Vision client for NIM-hosted multimodal models
pub struct NimVisionClient {
    client: Client,
    config: NimConfig,
}

impl NimVisionClient {
    pub fn new(config: NimConfig) -> Result<Self, VisionError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(VisionError::Config("api_key is required".to_string()));
        }
        if config.invoke_url.trim().is_empty() {
            return Err(VisionError::Config("invoke_url is required".to_string()));
        }
        if config.max_tokens == 0 {
            return Err(VisionError::Config(
                "max_tokens must be positive".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VisionError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn build_request<'a>(&'a self, prompt: &'a VisionPrompt) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &prompt.question,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: prompt.image.data_uri(),
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stream: false,
        }
    }
}

fn transport_error(e: reqwest::Error) -> VisionError {
    if e.is_timeout() {
        VisionError::Timeout
    } else {
        VisionError::RemoteCall(e.to_string())
    }
}

/// Extract `choices[0].message.content` from a response body
fn extract_reply(body: &str) -> Result<String, VisionError> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| VisionError::ResponseParse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| VisionError::ResponseParse("response has no choices".to_string()))
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[async_trait]
impl InferenceClient for NimVisionClient {
    async fn ask(&self, prompt: &VisionPrompt) -> Result<String, VisionError> {
        let request = self.build_request(prompt);

        tracing::debug!(
            url = %self.config.invoke_url,
            model = %self.config.model_name,
            "Calling NIM endpoint"
        );

        let response = self
            .client
            .post(&self.config.invoke_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(VisionError::RemoteCall(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(body = %body, "NIM response");

        extract_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nim_vision_domain::EncodedImage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INVOKE_PATH: &str = "/v1/chat/completions";

    fn sample_prompt() -> VisionPrompt {
        VisionPrompt {
            question: "Is this a dog? Answer YES or NO.".to_string(),
            image: EncodedImage {
                mime_type: "image/jpeg",
                base64: "aGVsbG8=".to_string(),
            },
        }
    }

    fn client_for(server: &MockServer) -> NimVisionClient {
        let mut config = NimConfig::new(SecretString::new("test-key".into()));
        config.invoke_url = format!("{}{}", server.uri(), INVOKE_PATH);
        NimVisionClient::new(config).unwrap()
    }

    fn reply_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chat-1",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_ask_success_and_request_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("YES, it is a dog.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let reply = client.ask(&sample_prompt()).await.unwrap();
        assert_eq!(reply, "YES, it is a dog.");

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

        assert_eq!(body["model"], "meta/llama-3.2-11b-vision-instruct");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["stream"], false);

        let message = &body["messages"][0];
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"][0]["type"], "text");
        assert_eq!(message["content"][0]["text"], "Is this a dog? Answer YES or NO.");
        assert_eq!(message["content"][1]["type"], "image_url");
        assert_eq!(
            message["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    #[tokio::test]
    async fn test_ask_returns_empty_content_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("")))
            .mount(&mock_server)
            .await;

        let reply = client_for(&mock_server).ask(&sample_prompt()).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_ask_auth_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).ask(&sample_prompt()).await;

        match result {
            Err(VisionError::RemoteCall(msg)) => assert!(msg.contains("401")),
            other => panic!("expected RemoteCall, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_ask_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).ask(&sample_prompt()).await;

        assert!(matches!(result, Err(VisionError::RemoteCall(_))));
    }

    #[tokio::test]
    async fn test_ask_malformed_bodies() {
        let bodies = [
            ResponseTemplate::new(200).set_body_string("not json"),
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "foo": 1 })),
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })),
        ];

        for template in bodies {
            let mock_server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(template)
                .mount(&mock_server)
                .await;

            let result = client_for(&mock_server).ask(&sample_prompt()).await;
            assert!(matches!(result, Err(VisionError::ResponseParse(_))));
        }
    }

    #[tokio::test]
    async fn test_ask_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_body("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let mut config = NimConfig::new(SecretString::new("test-key".into()));
        config.invoke_url = format!("{}{}", mock_server.uri(), INVOKE_PATH);
        config.timeout_secs = 1;
        let client = NimVisionClient::new(config).unwrap();

        let result = client.ask(&sample_prompt()).await;
        assert!(matches!(result, Err(VisionError::Timeout)));
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = NimVisionClient::new(NimConfig::new(SecretString::new("  ".into())));
        match result {
            Err(VisionError::Config(msg)) => assert!(msg.contains("api_key")),
            _ => panic!("expected Config error"),
        }
    }

    #[test]
    fn test_new_rejects_zero_max_tokens() {
        let mut config = NimConfig::new(SecretString::new("key".into()));
        config.max_tokens = 0;
        assert!(matches!(
            NimVisionClient::new(config),
            Err(VisionError::Config(_))
        ));
    }
}
