use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

pub const DEFAULT_MODEL: &str = "sora-2";
pub const DEFAULT_SECONDS: &str = "4";
pub const DEFAULT_SIZE: &str = "720x1280";

/// Video job as returned by the downstream API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoJob {
    pub id: String,

    /// Object marker ("video")
    #[serde(default = "default_object")]
    pub object: String,

    pub model: String,

    pub status: VideoStatus,

    /// Completion percentage (0-100)
    pub progress: Option<u32>,

    /// Unix seconds
    pub created_at: i64,

    pub completed_at: Option<i64>,

    pub expires_at: Option<i64>,

    /// Resolution, e.g. "720x1280"
    pub size: Option<String>,

    /// Clip duration as sent to the API, e.g. "4"
    pub seconds: Option<String>,

    pub error: Option<VideoError>,

    pub remixed_from_video_id: Option<String>,
}

fn default_object() -> String {
    "video".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Downloadable artifact of a finished job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaVariant {
    #[default]
    Video,
    Thumbnail,
    Spritesheet,
}

impl MediaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaVariant::Video => "video",
            MediaVariant::Thumbnail => "thumbnail",
            MediaVariant::Spritesheet => "spritesheet",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaVariant::Video => "video/mp4",
            MediaVariant::Thumbnail => "image/webp",
            MediaVariant::Spritesheet => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaVariant::Video => "mp4",
            MediaVariant::Thumbnail => "webp",
            MediaVariant::Spritesheet => "jpg",
        }
    }

    /// `{id}.{variant}.{ext}`
    pub fn attachment_filename(&self, video_id: &str) -> String {
        format!("{}.{}.{}", video_id, self.as_str(), self.extension())
    }
}

impl fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaVariant {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaVariant::Video),
            "thumbnail" => Ok(MediaVariant::Thumbnail),
            "spritesheet" => Ok(MediaVariant::Spritesheet),
            other => Err(GatewayError::InvalidRequest(format!(
                "Invalid variant '{}'. Use video, thumbnail, or spritesheet",
                other
            ))),
        }
    }
}

/// Fields forwarded to the downstream "create" call
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVideoRequest {
    pub prompt: String,
    pub model: String,
    pub seconds: String,
    pub size: String,
    pub input_reference: Option<ReferenceFile>,
}

impl CreateVideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            seconds: DEFAULT_SECONDS.to_string(),
            size: DEFAULT_SIZE.to_string(),
            input_reference: None,
        }
    }
}

/// Uploaded first-frame image, relayed byte for byte
#[derive(Clone, PartialEq)]
pub struct ReferenceFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl fmt::Debug for ReferenceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemixRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImprovePromptRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovedPrompt {
    pub original: String,
    pub improved: String,
}

/// Core job fields shared by every response shape
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub object: String,
    pub model: String,
    pub status: VideoStatus,
    pub progress: u32,
    pub created_at: i64,
    pub size: Option<String>,
    pub seconds: Option<String>,
}

impl From<&VideoJob> for JobSummary {
    fn from(job: &VideoJob) -> Self {
        Self {
            id: job.id.clone(),
            object: job.object.clone(),
            model: job.model.clone(),
            status: job.status,
            progress: job.progress.unwrap_or(0),
            created_at: job.created_at,
            size: job.size.clone(),
            seconds: job.seconds.clone(),
        }
    }
}

/// Single-job status; absent optional fields are omitted
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    #[serde(flatten)]
    pub summary: JobSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VideoError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remixed_from_video_id: Option<String>,
}

impl From<VideoJob> for JobStatus {
    fn from(job: VideoJob) -> Self {
        Self {
            summary: JobSummary::from(&job),
            completed_at: job.completed_at,
            expires_at: job.expires_at,
            error: job.error,
            remixed_from_video_id: job.remixed_from_video_id,
        }
    }
}

/// List entry; every optional field is present, `null` when absent
#[derive(Debug, Clone, Serialize)]
pub struct ListedJob {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub completed_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub error: Option<VideoError>,
    pub remixed_from_video_id: Option<String>,
}

impl From<VideoJob> for ListedJob {
    fn from(job: VideoJob) -> Self {
        Self {
            summary: JobSummary::from(&job),
            completed_at: job.completed_at,
            expires_at: job.expires_at,
            error: job.error,
            remixed_from_video_id: job.remixed_from_video_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoList {
    pub object: &'static str,
    pub data: Vec<ListedJob>,
}

impl VideoList {
    pub fn new(data: Vec<ListedJob>) -> Self {
        Self {
            object: "list",
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemixedJob {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub remixed_from_video_id: String,
}

impl RemixedJob {
    /// Lineage falls back to `source_id` when the downstream record lacks it
    pub fn new(job: VideoJob, source_id: &str) -> Self {
        let summary = JobSummary::from(&job);
        Self {
            summary,
            remixed_from_video_id: job
                .remixed_from_video_id
                .unwrap_or_else(|| source_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedVideo {
    pub id: String,
    pub deleted: bool,
}
