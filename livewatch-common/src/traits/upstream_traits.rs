use async_trait::async_trait;

use crate::error::Error;
use crate::models::{ChannelMetadata, VideoDetails};

/// The three provider lookups the pipeline needs.
///
/// Implementations must bound every call with a timeout and report failures
/// as `Error::UpstreamUnavailable` or `Error::NotFound`.
#[async_trait]
pub trait LiveUpstream: Send + Sync {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelMetadata, Error>;

    /// Id of the channel's currently running broadcast, if any.
    async fn find_active_live_video_id(&self, channel_id: &str) -> Result<Option<String>, Error>;

    async fn resolve_video(&self, video_id: &str) -> Result<VideoDetails, Error>;
}
