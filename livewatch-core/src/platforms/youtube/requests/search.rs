// ========================================================
// File: livewatch-core/src/platforms/youtube/requests/search.rs
// ========================================================
use serde::Deserialize;
use tracing::debug;

use crate::platforms::youtube::client::YouTubeClient;
use crate::Error;

/// Response from the "search.list" endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

/// Id of the channel's running broadcast, if the search finds one.
pub async fn fetch_live_video_id(client: &YouTubeClient, channel_id: &str) -> Result<Option<String>, Error> {
    let url = client.endpoint(
        "search",
        &[
            ("part", "snippet"),
            ("channelId", channel_id),
            ("eventType", "live"),
            ("type", "video"),
            ("maxResults", "1"),
        ],
    )?;
    let resp: SearchListResponse = client.get_json("fetch_live_video_id", url).await?;

    let video_id = resp.items.into_iter().find_map(|item| item.id.video_id);
    debug!("Live search for {} => {:?}", channel_id, video_id);
    Ok(video_id)
}
