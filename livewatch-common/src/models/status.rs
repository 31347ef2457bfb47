// File: livewatch-common/src/models/status.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::channel::ChannelMetadata;

/// Details that only exist while the channel is broadcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveBroadcast {
    pub title: String,
    pub video_id: String,
    pub thumbnail: String,
    pub started_at: DateTime<Utc>,
    /// `None` means the provider did not report a count. Zero is a real value.
    pub viewer_count: Option<u64>,
}

/// The single current fact about the tracked channel.
///
/// Live fields sit behind `live`, so a record cannot be "offline with a title"
/// or "live without a video id". The wire form is flat camelCase JSON and is
/// validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StatusWire", into = "StatusWire")]
pub struct StatusRecord {
    pub live: Option<LiveBroadcast>,
    pub channel_name: String,
    pub channel_logo: String,
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn offline(channel: &ChannelMetadata, now: DateTime<Utc>) -> Self {
        Self {
            live: None,
            channel_name: channel.name.clone(),
            channel_logo: channel.logo.clone(),
            updated_at: now,
        }
    }

    pub fn live(broadcast: LiveBroadcast, channel: &ChannelMetadata, now: DateTime<Utc>) -> Self {
        Self {
            live: Some(broadcast),
            channel_name: channel.name.clone(),
            channel_logo: channel.logo.clone(),
            updated_at: now,
        }
    }

    /// Builds the record for a freshly resolved video: live if the video is a
    /// running broadcast, offline otherwise.
    pub fn from_video(video: VideoDetails, channel: &ChannelMetadata, now: DateTime<Utc>) -> Self {
        match video.into_broadcast() {
            Some(broadcast) => Self::live(broadcast, channel, now),
            None => Self::offline(channel, now),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Compares everything except `updated_at`.
    pub fn same_state(&self, other: &StatusRecord) -> bool {
        self.live == other.live
            && self.channel_name == other.channel_name
            && self.channel_logo == other.channel_logo
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings, numbers and timestamps cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Parses a stored value. Blank, `null`, `undefined` and anything that
    /// breaks the live-field invariant come back as `None`.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}

/// Result of a video-details lookup, before it is folded into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub video_id: String,
    /// False for plain uploads, which have no broadcast lifecycle at all.
    pub is_broadcast: bool,
    pub is_live: bool,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub viewer_count: Option<u64>,
}

impl VideoDetails {
    pub fn into_broadcast(self) -> Option<LiveBroadcast> {
        if !self.is_live {
            return None;
        }
        Some(LiveBroadcast {
            title: self.title?,
            video_id: self.video_id,
            thumbnail: self.thumbnail?,
            started_at: self.started_at?,
            viewer_count: self.viewer_count,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusWire {
    is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    viewer_count: Option<u64>,
    channel_name: String,
    channel_logo: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
}

impl From<StatusRecord> for StatusWire {
    fn from(record: StatusRecord) -> Self {
        let (title, video_id, thumbnail, started_at, viewer_count) = match record.live {
            Some(b) => (
                Some(b.title),
                Some(b.video_id),
                Some(b.thumbnail),
                Some(b.started_at),
                b.viewer_count,
            ),
            None => (None, None, None, None, None),
        };
        StatusWire {
            is_live: title.is_some(),
            title,
            video_id,
            thumbnail,
            started_at,
            viewer_count,
            channel_name: record.channel_name,
            channel_logo: record.channel_logo,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<StatusWire> for StatusRecord {
    type Error = String;

    fn try_from(wire: StatusWire) -> Result<Self, Self::Error> {
        if wire.channel_name.trim().is_empty() {
            return Err("status record has an empty channel name".into());
        }

        let live = match (wire.is_live, wire.title, wire.video_id, wire.thumbnail, wire.started_at) {
            (true, Some(title), Some(video_id), Some(thumbnail), Some(started_at)) => {
                Some(LiveBroadcast {
                    title,
                    video_id,
                    thumbnail,
                    started_at,
                    viewer_count: wire.viewer_count,
                })
            }
            (false, None, None, None, None) if wire.viewer_count.is_none() => None,
            (true, ..) => return Err("live status record is missing broadcast fields".into()),
            (false, ..) => return Err("offline status record carries broadcast fields".into()),
        };

        Ok(StatusRecord {
            live,
            channel_name: wire.channel_name,
            channel_logo: wire.channel_logo,
            updated_at: wire.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn channel() -> ChannelMetadata {
        ChannelMetadata::new("Test Channel", "https://yt3.example/logo.jpg")
    }

    fn broadcast(viewers: Option<u64>) -> LiveBroadcast {
        LiveBroadcast {
            title: "Sunday Liturgy".into(),
            video_id: "abc123".into(),
            thumbnail: "https://i.ytimg.com/vi/abc123/hqdefault.jpg".into(),
            started_at: Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap(),
            viewer_count: viewers,
        }
    }

    #[test]
    fn offline_record_has_no_live_fields_on_the_wire() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let v: Value = serde_json::from_str(&StatusRecord::offline(&channel(), now).to_json()).unwrap();

        assert_eq!(v["isLive"], Value::Bool(false));
        for key in ["title", "videoId", "thumbnail", "startedAt", "viewerCount"] {
            assert!(v.get(key).is_none(), "{key} should be absent");
        }
        assert_eq!(v["channelName"], "Test Channel");
        assert_eq!(v["updatedAt"], 1_700_000_000_000i64);
    }

    #[test]
    fn live_record_carries_all_live_fields() {
        let rec = StatusRecord::live(broadcast(Some(0)), &channel(), Utc::now());
        let v: Value = serde_json::from_str(&rec.to_json()).unwrap();

        assert_eq!(v["isLive"], Value::Bool(true));
        assert_eq!(v["videoId"], "abc123");
        assert_eq!(v["startedAt"], "2025-03-02T09:00:00Z");
        // zero viewers is reported, not dropped
        assert_eq!(v["viewerCount"], 0);
    }

    #[test]
    fn unknown_viewer_count_is_omitted() {
        let rec = StatusRecord::live(broadcast(None), &channel(), Utc::now());
        let v: Value = serde_json::from_str(&rec.to_json()).unwrap();
        assert!(v.get("viewerCount").is_none());
    }

    #[test]
    fn stored_value_survives_a_reload() {
        let rec = StatusRecord::live(broadcast(Some(42)), &channel(), Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());
        let back = StatusRecord::from_stored(&rec.to_json()).expect("valid record");
        assert_eq!(back, rec);
    }

    #[test]
    fn corrupt_stored_values_are_rejected() {
        assert!(StatusRecord::from_stored("").is_none());
        assert!(StatusRecord::from_stored("null").is_none());
        assert!(StatusRecord::from_stored("undefined").is_none());
        assert!(StatusRecord::from_stored("{not json").is_none());
        // old payloads without channel data
        assert!(StatusRecord::from_stored(r#"{"isLive":false}"#).is_none());
        // live without its fields
        assert!(StatusRecord::from_stored(
            r#"{"isLive":true,"channelName":"A","channelLogo":"","updatedAt":1}"#
        )
        .is_none());
        // offline with a stray title
        assert!(StatusRecord::from_stored(
            r#"{"isLive":false,"title":"x","channelName":"A","channelLogo":"","updatedAt":1}"#
        )
        .is_none());
    }

    #[test]
    fn video_without_start_time_is_not_a_broadcast() {
        let details = VideoDetails {
            video_id: "v1".into(),
            is_broadcast: true,
            is_live: true,
            title: Some("Upcoming".into()),
            thumbnail: Some("t".into()),
            started_at: None,
            viewer_count: None,
        };
        let rec = StatusRecord::from_video(details, &channel(), Utc::now());
        assert!(!rec.is_live());
    }

    #[test]
    fn same_state_ignores_timestamp() {
        let a = StatusRecord::offline(&channel(), Utc.timestamp_millis_opt(1).unwrap());
        let b = StatusRecord::offline(&channel(), Utc.timestamp_millis_opt(2).unwrap());
        assert_ne!(a, b);
        assert!(a.same_state(&b));
    }
}
