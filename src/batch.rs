//! Batched job lookup.
//!
//! The downstream API has no multi-get, so a list request fans out one
//! retrieve per id. Lookups run concurrently; the output keeps input order and
//! a failed lookup drops only its own entry.

use futures::future::join_all;
use tracing::warn;

use crate::credential::ApiKey;
use crate::models::VideoJob;
use crate::provider::VideoProvider;

/// Outcome of retrieving one id
#[derive(Debug)]
pub enum Lookup {
    Found(VideoJob),
    Skipped { id: String, reason: String },
}

impl Lookup {
    pub fn into_found(self) -> Option<VideoJob> {
        match self {
            Lookup::Found(job) => Some(job),
            Lookup::Skipped { id, reason } => {
                warn!("Failed to retrieve video {}: {}", id, reason);
                None
            }
        }
    }
}

/// Split a comma-separated id list, trimming and dropping empty segments
pub fn parse_video_ids(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

pub async fn retrieve_all(
    provider: &dyn VideoProvider,
    api_key: &ApiKey,
    ids: &[&str],
) -> Vec<Lookup> {
    let lookups = ids.iter().map(|&id| async move {
        match provider.retrieve_video(api_key, id).await {
            Ok(job) => Lookup::Found(job),
            Err(e) => Lookup::Skipped {
                id: id.to_string(),
                reason: e.to_string(),
            },
        }
    });

    join_all(lookups).await
}
