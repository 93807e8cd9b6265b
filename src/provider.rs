use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

use crate::credential::ApiKey;
use crate::error::Result;
use crate::models::{ChatRequest, ChatResponse, CreateVideoRequest, MediaVariant, VideoJob};

/// Type alias for the futures returned by provider calls
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait for the downstream video generation API
///
/// Every call takes the already-resolved credential; implementations never see
/// the raw `Authorization` header. Any failure (transport, non-2xx status,
/// undecodable body) is reported as an error carrying a human-readable message.
pub trait VideoProvider: Send + Sync {
    /// Start a new generation job
    fn create_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: CreateVideoRequest,
    ) -> ProviderFuture<'a, VideoJob>;

    /// Fetch the current state of a job
    fn retrieve_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
    ) -> ProviderFuture<'a, VideoJob>;

    /// Download one media artifact of a finished job, fully buffered
    fn download_content<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        variant: MediaVariant,
    ) -> ProviderFuture<'a, Bytes>;

    fn delete_video<'a>(&'a self, api_key: &'a ApiKey, video_id: &'a str) -> ProviderFuture<'a, ()>;

    /// Start a new job derived from an existing one
    fn remix_video<'a>(
        &'a self,
        api_key: &'a ApiKey,
        video_id: &'a str,
        prompt: &'a str,
    ) -> ProviderFuture<'a, VideoJob>;

    /// Run a chat completion (used for prompt improvement)
    fn complete_chat<'a>(
        &'a self,
        api_key: &'a ApiKey,
        request: ChatRequest,
    ) -> ProviderFuture<'a, ChatResponse>;

    /// Get the provider name for logging
    fn name(&self) -> &str;
}
