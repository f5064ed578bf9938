//! OpenAI gateway implementation
//!
//! One HTTP client serves both ports: chat completions (streaming and
//! blocking) and speech synthesis.

use super::error::{OpenAiError, Result};
use super::sse::forward_events;
use super::types::{ChatCompletionBody, ChatCompletionResponse, SpeechBody, error_message};
use async_trait::async_trait;
use docchat_application::{
    CompletionGateway, CompletionRequest, GatewayError, SpeechGateway, StreamHandle,
};
use docchat_domain::{AudioClip, SpeechRequest};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const SPEECH_PATH: &str = "/v1/audio/speech";
const STREAM_BUFFER: usize = 64;

/// Connection settings for [`OpenAiGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// Bearer token; `None` means requests are refused before any network call.
    pub api_key: Option<String>,
    /// Name of the environment variable the key is expected in (for messages).
    pub api_key_env: String,
    /// Base URL without the `/v1/...` path.
    pub base_url: String,
    /// Whole-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout: None,
        }
    }
}

impl OpenAiSettings {
    /// Resolve the API key from `api_key_env` unless one is already set
    pub fn resolve_api_key_from_env(mut self) -> Self {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            self.api_key = std::env::var(&self.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        self
    }
}

/// Gateway for the OpenAI chat-completion and speech endpoints
pub struct OpenAiGateway {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| OpenAiError::ClientBuild(e.to_string()))?;

        info!("OpenAiGateway initialized for {}", settings.base_url);
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str> {
        self.settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| OpenAiError::MissingApiKey(self.settings.api_key_env.clone()))
    }

    async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let key = self.api_key()?;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn chat(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response> {
        let body = ChatCompletionBody {
            model: request.model.as_str(),
            messages: &request.messages,
            stream,
        };
        debug!(
            "POST {} model={} messages={} stream={}",
            CHAT_COMPLETIONS_PATH,
            body.model,
            body.messages.len(),
            stream
        );
        self.post_json(CHAT_COMPLETIONS_PATH, &body).await
    }

    async fn complete_text(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.chat(request, false).await?;
        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let choice = parsed.choices.into_iter().next().ok_or(OpenAiError::NoChoices)?;
        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }

    async fn speech_bytes(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let body = SpeechBody {
            model: request.model,
            voice: request.voice,
            input: &request.input,
            response_format: "mp3",
        };
        let response = self.post_json(SPEECH_PATH, &body).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    fn ensure_ready(&self) -> std::result::Result<(), GatewayError> {
        self.api_key().map(|_| ()).map_err(GatewayError::from)
    }

    async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, GatewayError> {
        Ok(self.complete_text(request).await?)
    }

    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let response = self.chat(request, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(forward_events(Box::pin(response.bytes_stream()), tx));
        Ok(StreamHandle::new(rx))
    }
}

#[async_trait]
impl SpeechGateway for OpenAiGateway {
    fn ensure_ready(&self) -> std::result::Result<(), GatewayError> {
        CompletionGateway::ensure_ready(self)
    }

    async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<AudioClip, GatewayError> {
        let bytes = self.speech_bytes(request).await?;
        debug!("Received {} bytes of speech audio", bytes.len());
        Ok(AudioClip::mp3(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_domain::{Message, Model, SpeechModel, StreamEvent, Voice};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP exchange and hand back the raw request
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(header_end) = find(&request, b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let head = format!(
                "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (base_url, handle)
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn gateway(base_url: String, api_key: Option<&str>) -> OpenAiGateway {
        OpenAiGateway::new(OpenAiSettings {
            api_key: api_key.map(str::to_string),
            base_url,
            ..OpenAiSettings::default()
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            Model::Gpt4oMini,
            vec![Message::system("sys"), Message::user("hi")],
        )
    }

    #[tokio::test]
    async fn blocking_completion_extracts_content() {
        let body = serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "  Hello there \n"}}]
        });
        let (base_url, server) =
            serve_once("200 OK", "application/json", body.to_string().into_bytes()).await;
        let gateway = gateway(base_url, Some("sk-test"));

        let text = gateway.complete(&request()).await.unwrap();
        assert_eq!(text, "Hello there");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(raw.contains(r#""stream":false"#));
        assert!(raw.contains(r#""model":"gpt-4o-mini""#));
    }

    #[tokio::test]
    async fn streaming_completion_yields_deltas() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" you\"}}]}\n\n",
            "data: [DONE]\n\n"
        );
        let (base_url, server) =
            serve_once("200 OK", "text/event-stream", body.as_bytes().to_vec()).await;
        let gateway = gateway(base_url, Some("sk-test"));

        let mut handle = gateway.complete_streaming(&request()).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hi".to_string()),
                StreamEvent::Delta(" you".to_string()),
                StreamEvent::Completed("Hi you".to_string()),
            ]
        );
        assert!(server.await.unwrap().contains(r#""stream":true"#));
    }

    #[tokio::test]
    async fn api_error_status_is_reported() {
        let body = br#"{"error": {"message": "Invalid model", "type": "invalid_request_error"}}"#;
        let (base_url, _server) =
            serve_once("404 Not Found", "application/json", body.to_vec()).await;
        let gateway = gateway(base_url, Some("sk-test"));

        let err = gateway.complete(&request()).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::ApiError {
                status: 404,
                message: "Invalid model".to_string()
            }
        );
    }

    #[tokio::test]
    async fn speech_returns_audio_bytes() {
        let audio = vec![0x49, 0x44, 0x33, 0x04, 0x00];
        let (base_url, server) = serve_once("200 OK", "audio/mpeg", audio.clone()).await;
        let gateway = gateway(base_url, Some("sk-test"));

        let clip = gateway
            .synthesize(&SpeechRequest::new(SpeechModel::Tts1Hd, Voice::Echo, "Say it"))
            .await
            .unwrap();
        assert_eq!(clip.bytes(), &audio[..]);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/audio/speech"));
        assert!(raw.contains(r#""voice":"echo""#));
        assert!(raw.contains(r#""model":"tts-1-hd""#));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let gateway = gateway("http://127.0.0.1:9".to_string(), None);
        assert_eq!(
            CompletionGateway::ensure_ready(&gateway),
            Err(GatewayError::MissingApiKey("OPENAI_API_KEY".to_string()))
        );
        assert_eq!(
            gateway.complete(&request()).await,
            Err(GatewayError::MissingApiKey("OPENAI_API_KEY".to_string()))
        );
    }

    #[test]
    fn url_joins_without_double_slash() {
        let gateway = gateway("https://example.test/".to_string(), Some("k"));
        assert_eq!(
            gateway.url(CHAT_COMPLETIONS_PATH),
            "https://example.test/v1/chat/completions"
        );
    }
}
