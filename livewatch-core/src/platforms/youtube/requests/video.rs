// ========================================================
// File: livewatch-core/src/platforms/youtube/requests/video.rs
// ========================================================
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use livewatch_common::models::VideoDetails;

use crate::platforms::youtube::client::YouTubeClient;
use crate::platforms::youtube::requests::Thumbnails;
use crate::Error;

/// Response from the "videos.list" endpoint.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    /// The API sends this as a decimal string.
    pub concurrent_viewers: Option<Value>,
}

/// Resolves one video's broadcast state.
pub async fn fetch_video(client: &YouTubeClient, video_id: &str) -> Result<VideoDetails, Error> {
    let url = client.endpoint(
        "videos",
        &[("part", "snippet,liveStreamingDetails"), ("id", video_id)],
    )?;
    let resp: VideoListResponse = client.get_json("fetch_video", url).await?;

    let Some(item) = resp.items.into_iter().next() else {
        return Err(Error::NotFound(format!("video {}", video_id)));
    };
    Ok(video_details(item))
}

/// A video counts as live while its broadcast has started and not ended.
/// Plain uploads carry no `liveStreamingDetails` at all.
pub fn video_details(item: VideoItem) -> VideoDetails {
    let thumbnail = item
        .snippet
        .thumbnails
        .preferred_url()
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", item.id));

    let (is_broadcast, is_live, started_at, viewer_count) = match &item.live_streaming_details {
        Some(details) => (
            true,
            details.actual_start_time.is_some() && details.actual_end_time.is_none(),
            details.actual_start_time,
            details.concurrent_viewers.as_ref().and_then(parse_viewer_count),
        ),
        None => (false, false, None, None),
    };

    debug!(
        "Resolved video {}: broadcast={}, live={}, viewers={:?}",
        item.id, is_broadcast, is_live, viewer_count
    );

    VideoDetails {
        video_id: item.id,
        is_broadcast,
        is_live,
        title: Some(item.snippet.title),
        thumbnail: Some(thumbnail),
        started_at,
        viewer_count,
    }
}

fn parse_viewer_count(raw: &Value) -> Option<u64> {
    match raw {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(json: &str) -> VideoItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn running_broadcast_is_live_with_viewers() {
        let v = video_details(item(
            r#"{"id":"v1","snippet":{"title":"Vespers","thumbnails":{"high":{"url":"https://i.ytimg.com/vi/v1/hq.jpg"}}},
                "liveStreamingDetails":{"actualStartTime":"2025-03-02T09:00:12Z","concurrentViewers":"317"}}"#,
        ));
        assert!(v.is_live);
        assert_eq!(v.viewer_count, Some(317));
        assert_eq!(v.started_at, Some(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 12).unwrap()));
        assert_eq!(v.thumbnail.as_deref(), Some("https://i.ytimg.com/vi/v1/hq.jpg"));
    }

    #[test]
    fn missing_concurrent_viewers_stays_unknown() {
        let v = video_details(item(
            r#"{"id":"v1","snippet":{"title":"t"},"liveStreamingDetails":{"actualStartTime":"2025-03-02T09:00:12Z"}}"#,
        ));
        assert!(v.is_live);
        assert_eq!(v.viewer_count, None);
        // falls back to the well-known thumbnail path
        assert_eq!(v.thumbnail.as_deref(), Some("https://i.ytimg.com/vi/v1/hqdefault.jpg"));
    }

    #[test]
    fn ended_broadcast_is_not_live() {
        let v = video_details(item(
            r#"{"id":"v1","snippet":{"title":"t"},"liveStreamingDetails":{
                "actualStartTime":"2025-03-02T09:00:12Z","actualEndTime":"2025-03-02T11:00:00Z"}}"#,
        ));
        assert!(v.is_broadcast);
        assert!(!v.is_live);
    }

    #[test]
    fn plain_upload_is_not_a_broadcast() {
        let v = video_details(item(r#"{"id":"v1","snippet":{"title":"t"}}"#));
        assert!(!v.is_broadcast);
        assert!(!v.is_live);
    }

    #[test]
    fn garbage_viewer_count_is_dropped() {
        assert_eq!(parse_viewer_count(&Value::String("lots".into())), None);
        assert_eq!(parse_viewer_count(&serde_json::json!(0)), Some(0));
    }
}
