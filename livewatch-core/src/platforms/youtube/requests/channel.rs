// ========================================================
// File: livewatch-core/src/platforms/youtube/requests/channel.rs
// ========================================================
use serde::Deserialize;
use tracing::{debug, warn};

use livewatch_common::models::ChannelMetadata;

use crate::platforms::youtube::client::YouTubeClient;
use crate::platforms::youtube::requests::Thumbnails;
use crate::Error;

/// Response from the "channels.list" endpoint.
#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Looks up the channel's display name and logo.
pub async fn fetch_channel(client: &YouTubeClient, channel_id: &str) -> Result<ChannelMetadata, Error> {
    let url = client.endpoint("channels", &[("part", "snippet"), ("id", channel_id)])?;
    let resp: ChannelListResponse = client.get_json("fetch_channel", url).await?;
    channel_from_response(channel_id, resp)
}

pub fn channel_from_response(channel_id: &str, resp: ChannelListResponse) -> Result<ChannelMetadata, Error> {
    let Some(item) = resp.items.into_iter().next() else {
        return Err(Error::NotFound(format!("channel {}", channel_id)));
    };

    let logo = item.snippet.thumbnails.preferred_url().unwrap_or_else(|| {
        warn!("Channel {} has no thumbnails", channel_id);
        String::new()
    });

    debug!("Fetched channel '{}' ({})", item.snippet.title, channel_id);
    Ok(ChannelMetadata::new(item.snippet.title, logo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_high_thumbnail_for_logo() {
        let resp: ChannelListResponse = serde_json::from_str(
            r#"{"items":[{"id":"UC1","snippet":{"title":"St. Example",
                "thumbnails":{"default":{"url":"https://yt3/s88"},"high":{"url":"https://yt3/s800"}}}}]}"#,
        )
        .unwrap();
        let meta = channel_from_response("UC1", resp).unwrap();
        assert_eq!(meta, ChannelMetadata::new("St. Example", "https://yt3/s800"));
    }

    #[test]
    fn empty_items_is_not_found() {
        let resp: ChannelListResponse = serde_json::from_str(r#"{"kind":"youtube#channelListResponse"}"#).unwrap();
        assert!(matches!(channel_from_response("UC1", resp), Err(Error::NotFound(_))));
    }
}
