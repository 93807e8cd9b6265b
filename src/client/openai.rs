use bytes::Bytes;
use reqwest::{Client, Response, StatusCode, Url, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::config::UpstreamConfig;
use crate::credential::ApiKey;
use crate::error::{GatewayError, Result};
use crate::models::{ChatRequest, ChatResponse, CreateVideoRequest, MediaVariant, VideoJob};
use crate::provider::{ProviderFuture, VideoProvider};

const DEFAULT_UPLOAD_NAME: &str = "input_reference";
const DEFAULT_UPLOAD_TYPE: &str = "application/octet-stream";

pub struct OpenAiClient {
    client: Client,
    base_url: Url,
}

impl OpenAiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::ConfigError(format!("Invalid upstream URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::ConfigError(format!(
                "Upstream URL cannot be a base: {}",
                config.base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn video_form(request: CreateVideoRequest) -> Result<multipart::Form> {
        let mut form = multipart::Form::new()
            .text("model", request.model)
            .text("prompt", request.prompt)
            .text("seconds", request.seconds)
            .text("size", request.size);

        if let Some(file) = request.input_reference {
            let part = multipart::Part::bytes(file.data.to_vec())
                .file_name(
                    file.filename
                        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string()),
                )
                .mime_str(file.content_type.as_deref().unwrap_or(DEFAULT_UPLOAD_TYPE))
                .map_err(|e| GatewayError::Upstream(format!("Invalid reference content type: {}", e)))?;
            form = form.part("input_reference", part);
        }

        Ok(form)
    }

    async fn create_video_impl(&self, api_key: &ApiKey, request: CreateVideoRequest) -> Result<VideoJob> {
        let url = self.endpoint(&["videos"]);
        info!(
            "OpenAI: creating video (model: {}, seconds: {}, size: {}, reference: {})",
            request.model,
            request.seconds,
            request.size,
            request.input_reference.is_some()
        );

        let form = Self::video_form(request)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        decode_json(response).await
    }

    async fn retrieve_video_impl(&self, api_key: &ApiKey, video_id: &str) -> Result<VideoJob> {
        let url = self.endpoint(&["videos", video_id]);
        debug!("OpenAI: retrieving video {}", video_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        decode_json(response).await
    }

    async fn download_content_impl(
        &self,
        api_key: &ApiKey,
        video_id: &str,
        variant: MediaVariant,
    ) -> Result<Bytes> {
        let mut url = self.endpoint(&["videos", video_id, "content"]);
        url.query_pairs_mut().append_pair("variant", variant.as_str());
        info!("OpenAI: downloading {} for video {}", variant, video_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Failed to read OpenAI response: {}", e)))?;
        debug!("OpenAI: downloaded {} bytes", body.len());
        Ok(body)
    }

    async fn delete_video_impl(&self, api_key: &ApiKey, video_id: &str) -> Result<()> {
        let url = self.endpoint(&["videos", video_id]);
        info!("OpenAI: deleting video {}", video_id);

        let response = self
            .client
            .delete(url)
            .bearer_auth(api_key.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn remix_video_impl(&self, api_key: &ApiKey, video_id: &str, prompt: &str) -> Result<VideoJob> {
        let url = self.endpoint(&["videos", video_id, "remix"]);
        info!("OpenAI: remixing video {}", video_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.as_str())
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(transport_error)?;

        decode_json(response).await
    }

    async fn complete_chat_impl(&self, api_key: &ApiKey, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["chat", "completions"]);
        info!("OpenAI: chat completion with model {}", request.model);

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        decode_json(response).await
    }
}

impl VideoProvider for OpenAiClient {
    fn create_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: CreateVideoRequest,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(self.create_video_impl(api_key, request))
    }

    fn retrieve_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(self.retrieve_video_impl(api_key, video_id))
    }

    fn download_content<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        variant: MediaVariant,
    ) -> ProviderFuture<'a, Bytes> {
        Box::pin(self.download_content_impl(api_key, video_id, variant))
    }

    fn delete_video<'a>(&'a self, api_key: &'a ApiKey, video_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(self.delete_video_impl(api_key, video_id))
    }

    fn remix_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        prompt: &'a str,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(self.remix_video_impl(api_key, video_id, prompt))
    }

    fn complete_chat<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: ChatRequest,
    ) -> ProviderFuture<'a, ChatResponse> {
        Box::pin(self.complete_chat_impl(api_key, request))
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Upstream(format!("Connection error: {}", e))
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    info!("OpenAI responded with status: {}", status);

    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(GatewayError::Upstream(upstream_error_message(status, &body)))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let body = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Upstream(format!("Failed to read OpenAI response: {}", e)))?;
    Ok(serde_json::from_slice(&body)?)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Human-readable message for a non-2xx downstream response
pub fn upstream_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("Error code: {} - {}", status.as_u16(), body),
    }
}
