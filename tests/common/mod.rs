#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use bytes::Bytes;
use serde_json::{Value, json};
use sora_gateway::{
    GatewayConfig, GatewayError,
    credential::{ApiKey, CredentialAlias, CredentialResolver},
    handler::AppState,
    models::{ChatRequest, ChatResponse, CreateVideoRequest, MediaVariant, VideoJob},
    provider::{ProviderFuture, VideoProvider},
    router::build_router,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const BOUNDARY: &str = "----gatewaytestboundary";

/// One recorded downstream call
#[derive(Debug, Clone)]
pub enum Call {
    Create { key: String, request: CreateVideoRequest },
    Retrieve { key: String, id: String },
    Download { key: String, id: String, variant: MediaVariant },
    Delete { key: String, id: String },
    Remix { key: String, id: String, prompt: String },
    Chat { key: String, request: ChatRequest },
}

impl Call {
    pub fn key(&self) -> &str {
        match self {
            Call::Create { key, .. }
            | Call::Retrieve { key, .. }
            | Call::Download { key, .. }
            | Call::Delete { key, .. }
            | Call::Remix { key, .. }
            | Call::Chat { key, .. } => key,
        }
    }
}

/// Recording stand-in for the downstream API
#[derive(Default)]
pub struct MockProvider {
    pub calls: Mutex<Vec<Call>>,
    /// Jobs known to `retrieve`; unknown ids fail with "Video not found"
    pub jobs: HashMap<String, Value>,
    /// Job returned by create/remix
    pub created: Option<Value>,
    pub content: Bytes,
    pub completion: Option<String>,
    /// When set, every call fails with this message
    pub fail_with: Option<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            created: Some(job_json("video_new")),
            content: Bytes::from_static(b"media-bytes"),
            completion: Some("  An improved prompt.\n".to_string()),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_job(mut self, job: Value) -> Self {
        let id = job["id"].as_str().unwrap().to_string();
        self.jobs.insert(id, job);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> sora_gateway::Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(GatewayError::Upstream(message.clone())),
            None => Ok(()),
        }
    }

    fn created_job(&self) -> sora_gateway::Result<VideoJob> {
        let value = self.created.clone().expect("created job configured");
        Ok(serde_json::from_value(value)?)
    }
}

impl VideoProvider for MockProvider {
    fn create_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: CreateVideoRequest,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(async move {
            self.record(Call::Create {
                key: api_key.as_str().to_string(),
                request,
            })?;
            self.created_job()
        })
    }

    fn retrieve_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(async move {
            self.record(Call::Retrieve {
                key: api_key.as_str().to_string(),
                id: video_id.to_string(),
            })?;
            match self.jobs.get(video_id) {
                Some(value) => Ok(serde_json::from_value(value.clone())?),
                None => Err(GatewayError::Upstream("Video not found".to_string())),
            }
        })
    }

    fn download_content<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        variant: MediaVariant,
    ) -> ProviderFuture<'a, Bytes> {
        Box::pin(async move {
            self.record(Call::Download {
                key: api_key.as_str().to_string(),
                id: video_id.to_string(),
                variant,
            })?;
            Ok(self.content.clone())
        })
    }

    fn delete_video<'a>(&'a self, api_key: &'a ApiKey, video_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            self.record(Call::Delete {
                key: api_key.as_str().to_string(),
                id: video_id.to_string(),
            })
        })
    }

    fn remix_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        prompt: &'a str,
    ) -> ProviderFuture<'a, VideoJob> {
        Box::pin(async move {
            self.record(Call::Remix {
                key: api_key.as_str().to_string(),
                id: video_id.to_string(),
                prompt: prompt.to_string(),
            })?;
            self.created_job()
        })
    }

    fn complete_chat<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: ChatRequest,
    ) -> ProviderFuture<'a, ChatResponse> {
        Box::pin(async move {
            self.record(Call::Chat {
                key: api_key.as_str().to_string(),
                request,
            })?;
            let response = json!({
                "choices": [{"message": {"role": "assistant", "content": self.completion}}]
            });
            Ok(serde_json::from_value(response)?)
        })
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

pub fn job_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "video",
        "model": "sora-2",
        "status": "queued",
        "created_at": 1712697600,
        "size": "720x1280",
        "seconds": "4"
    })
}

pub fn config_without_frontend() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.frontend.static_dir = PathBuf::from("/nonexistent/sora-gateway-static");
    config
}

pub fn app(provider: Arc<MockProvider>) -> Router {
    app_with(provider, None, &config_without_frontend())
}

pub fn app_with_alias(provider: Arc<MockProvider>, name: &str, value: &str) -> Router {
    let alias = CredentialAlias {
        name: name.to_string(),
        value: value.to_string(),
    };
    app_with(provider, Some(alias), &config_without_frontend())
}

pub fn app_with(
    provider: Arc<MockProvider>,
    alias: Option<CredentialAlias>,
    config: &GatewayConfig,
) -> Router {
    let state = Arc::new(AppState::new(provider, CredentialResolver::new(alias)));
    build_router(state, config)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    request("GET", uri, auth).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, auth: Option<&str>) -> Request<Body> {
    request("DELETE", uri, auth).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    request("POST", uri, auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_multipart(uri: &str, auth: Option<&str>, body: Vec<u8>) -> Request<Body> {
    request("POST", uri, auth)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn request(method: &str, uri: &str, auth: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match auth {
        Some(value) => builder.header("authorization", value),
        None => builder,
    }
}

/// Build a multipart/form-data body; `file` is (filename, content type, bytes)
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"input_reference\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
