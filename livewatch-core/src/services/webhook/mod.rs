// File: livewatch-core/src/services/webhook/mod.rs
//
// Hub (WebSub) callback handling: subscription verification and content
// notifications.

pub mod feed;

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use livewatch_common::models::StatusRecord;
use livewatch_common::traits::LiveUpstream;

use crate::cache::MetadataCache;
use crate::eventbus::Broadcaster;
use crate::Error;

pub use feed::{parse_notification, FeedEntry};

/// Query string of a verification request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationRequest {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.topic")]
    pub topic: Option<String>,
    #[serde(rename = "hub.lease_seconds")]
    pub lease_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Echo this back verbatim.
    Challenge(String),
    Unsubscribed,
    InvalidMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    Published(StatusRecord),
    /// Well-formed feed without an entry.
    NoEntry,
    /// Entry for a channel we do not track.
    ChannelMismatch,
    /// A plain upload, or an ended broadcast other than the one we show as
    /// live. Neither says anything about the current live state.
    Ignored,
    /// The video could not be resolved; logged, nothing published.
    ResolutionFailed,
}

pub struct WebhookIngestor {
    channel_id: String,
    upstream: Arc<dyn LiveUpstream>,
    metadata: Arc<MetadataCache>,
    broadcaster: Arc<Broadcaster>,
}

impl WebhookIngestor {
    pub fn new(
        channel_id: impl Into<String>,
        upstream: Arc<dyn LiveUpstream>,
        metadata: Arc<MetadataCache>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            upstream,
            metadata,
            broadcaster,
        }
    }

    pub fn verify(&self, req: &VerificationRequest) -> VerificationOutcome {
        debug!(
            "Webhook verification: mode={:?} topic={:?} lease={:?}",
            req.mode, req.topic, req.lease_seconds
        );
        match (req.mode.as_deref(), req.challenge.as_deref()) {
            (Some("subscribe"), Some(challenge)) => {
                info!("Hub subscription verified for topic {:?}", req.topic);
                VerificationOutcome::Challenge(challenge.to_string())
            }
            (Some("unsubscribe"), _) => {
                info!("Hub unsubscription acknowledged for topic {:?}", req.topic);
                VerificationOutcome::Unsubscribed
            }
            _ => VerificationOutcome::InvalidMode,
        }
    }

    /// Handles one notification body. The only error is
    /// `Error::InvalidPayload`; everything downstream of parsing is absorbed
    /// so the hub never sees a failure it would redeliver for.
    pub async fn ingest(&self, body: &str) -> Result<NotificationOutcome, Error> {
        let Some(entry) = parse_notification(body)? else {
            debug!("Notification without entry");
            return Ok(NotificationOutcome::NoEntry);
        };

        if let Err(e) = self.check_channel(&entry.channel_id) {
            debug!("Discarding notification: {}", e);
            return Ok(NotificationOutcome::ChannelMismatch);
        }

        let video = match self.upstream.resolve_video(&entry.video_id).await {
            Ok(video) => video,
            Err(e) => {
                warn!("Webhook could not resolve video {}: {}", entry.video_id, e);
                return Ok(NotificationOutcome::ResolutionFailed);
            }
        };

        if !video.is_broadcast {
            debug!("Video {} is a plain upload; live state unchanged", video.video_id);
            return Ok(NotificationOutcome::Ignored);
        }

        if !video.is_live {
            if let Some(current) = self.broadcaster.current().await {
                if let Some(shown) = &current.live {
                    if shown.video_id != video.video_id {
                        debug!(
                            "Ended broadcast {} is not the one on air ({}); ignoring",
                            video.video_id, shown.video_id
                        );
                        return Ok(NotificationOutcome::Ignored);
                    }
                }
            }
        }

        let channel = self.metadata.get_or_fetch().await;
        let record = StatusRecord::from_video(video, &channel, Utc::now());
        info!("Webhook => {}", if record.is_live() { "LIVE" } else { "OFFLINE" });
        self.broadcaster.publish(record.clone()).await;
        Ok(NotificationOutcome::Published(record))
    }

    fn check_channel(&self, channel_id: &str) -> Result<(), Error> {
        if channel_id == self.channel_id {
            Ok(())
        } else {
            Err(Error::ChannelMismatch {
                expected: self.channel_id.clone(),
                actual: channel_id.to_string(),
            })
        }
    }
}
