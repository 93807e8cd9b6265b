use axum::{
    Json,
    extract::{FromRef, Multipart, Path, Query, State, multipart::Field},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::batch::{parse_video_ids, retrieve_all};
use crate::credential::{ApiKey, CredentialResolver};
use crate::error::{GatewayError, Result};
use crate::models::{
    CreateVideoRequest, DeletedVideo, ImprovePromptRequest, ImprovedPrompt, JobStatus, JobSummary,
    ListedJob, MediaVariant, ReferenceFile, RemixRequest, RemixedJob, VideoList,
};
use crate::prompt::improve_request;
use crate::provider::VideoProvider;

pub const SERVICE_NAME: &str = "Sora API Playground Backend";

pub struct AppState {
    pub provider: Arc<dyn VideoProvider>,
    pub credentials: CredentialResolver,
}

impl AppState {
    pub fn new(provider: Arc<dyn VideoProvider>, credentials: CredentialResolver) -> Self {
        Self {
            provider,
            credentials,
        }
    }
}

impl FromRef<Arc<AppState>> for CredentialResolver {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.credentials.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub variant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub video_ids: Option<String>,
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    multipart: Multipart,
) -> Result<Json<JobSummary>> {
    let request = read_create_form(multipart).await?;
    info!(
        "{}: create video request (model: {}, seconds: {}, size: {})",
        state.provider.name(),
        request.model,
        request.seconds,
        request.size
    );

    let job = state.provider.create_video(&api_key, request).await?;
    Ok(Json(JobSummary::from(&job)))
}

/// Collect the create-job form; unknown fields are ignored
async fn read_create_form(mut multipart: Multipart) -> Result<CreateVideoRequest> {
    let mut prompt = None;
    let mut request = CreateVideoRequest::new(String::new());

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => prompt = Some(field_text(field).await?),
            "model" => request.model = field_text(field).await?,
            "seconds" => request.seconds = field_text(field).await?,
            "size" => request.size = field_text(field).await?,
            "input_reference" => request.input_reference = read_reference(field).await?,
            _ => {}
        }
    }

    request.prompt =
        prompt.ok_or_else(|| GatewayError::InvalidRequest("prompt is required".to_string()))?;
    Ok(request)
}

async fn field_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid form field: {}", e)))
}

async fn read_reference(field: Field<'_>) -> Result<Option<ReferenceFile>> {
    let filename = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid reference file: {}", e)))?;

    // Browsers submit an empty, unnamed part when no file was picked
    if data.is_empty() && filename.as_deref().unwrap_or_default().is_empty() {
        return Ok(None);
    }

    Ok(Some(ReferenceFile {
        filename,
        content_type,
        data,
    }))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Path(video_id): Path<String>,
) -> Result<Json<JobStatus>> {
    let job = state.provider.retrieve_video(&api_key, &video_id).await?;
    Ok(Json(JobStatus::from(job)))
}

pub async fn download_content(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Path(video_id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Result<Response> {
    let variant = match query.variant.as_deref() {
        Some(v) => v.parse::<MediaVariant>()?,
        None => MediaVariant::default(),
    };

    let disposition = attachment_disposition(&variant.attachment_filename(&video_id))?;

    let content = state
        .provider
        .download_content(&api_key, &video_id, variant)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(variant.mime_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

/// `attachment; filename="..."` with `\` and `"` escaped as a quoted-string
fn attachment_disposition(filename: &str) -> Result<HeaderValue> {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", quoted))
        .map_err(|_| GatewayError::InvalidRequest(format!("Invalid video id: {:?}", filename)))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Query(query): Query<ListQuery>,
) -> Json<VideoList> {
    let ids = parse_video_ids(query.video_ids.as_deref());
    if ids.is_empty() {
        return Json(VideoList::new(Vec::new()));
    }

    info!("{}: retrieving {} videos", state.provider.name(), ids.len());
    let data = retrieve_all(state.provider.as_ref(), &api_key, &ids)
        .await
        .into_iter()
        .filter_map(|lookup| lookup.into_found())
        .map(ListedJob::from)
        .collect();

    Json(VideoList::new(data))
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Path(video_id): Path<String>,
) -> Result<Json<DeletedVideo>> {
    state.provider.delete_video(&api_key, &video_id).await?;
    Ok(Json(DeletedVideo {
        id: video_id,
        deleted: true,
    }))
}

pub async fn remix_video(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Path(video_id): Path<String>,
    Json(request): Json<RemixRequest>,
) -> Result<Json<RemixedJob>> {
    let job = state
        .provider
        .remix_video(&api_key, &video_id, &request.prompt)
        .await?;
    Ok(Json(RemixedJob::new(job, &video_id)))
}

pub async fn improve_prompt(
    State(state): State<Arc<AppState>>,
    api_key: ApiKey,
    Json(request): Json<ImprovePromptRequest>,
) -> Result<Json<ImprovedPrompt>> {
    let response = state
        .provider
        .complete_chat(&api_key, improve_request(&request.prompt))
        .await?;

    let improved = response
        .first_content()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| GatewayError::Upstream("Model returned no content".to_string()))?;

    Ok(Json(ImprovedPrompt {
        original: request.prompt,
        improved,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": SERVICE_NAME }))
}

/// Root status when no frontend bundle is deployed
pub async fn dev_root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": format!("{} (Development Mode)", SERVICE_NAME)
    }))
}
