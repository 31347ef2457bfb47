// File: livewatch-core/tests/webhook_tests.rs

mod test_utils;

use std::sync::Arc;

use chrono::Utc;
use livewatch_common::models::{ChannelMetadata, StatusRecord};
use livewatch_core::Error;
use livewatch_core::services::{NotificationOutcome, VerificationOutcome, VerificationRequest};
use livewatch_core::test_utils::mocks::{ended_video, live_video, uploaded_video, MockUpstream, Reply};
use test_utils::helpers::{notification, pipeline_with, CHANNEL_ID};

fn request(mode: Option<&str>, challenge: Option<&str>) -> VerificationRequest {
    VerificationRequest {
        mode: mode.map(str::to_string),
        challenge: challenge.map(str::to_string),
        topic: Some(format!(
            "https://www.youtube.com/xml/feeds/videos.xml?channel_id={}",
            CHANNEL_ID
        )),
        lease_seconds: Some(432000),
    }
}

#[tokio::test]
async fn subscribe_echoes_challenge() {
    let pipeline = pipeline_with(Arc::new(MockUpstream::new()));

    let outcome = pipeline.ingestor.verify(&request(Some("subscribe"), Some("abc123")));

    assert_eq!(outcome, VerificationOutcome::Challenge("abc123".into()));
}

#[tokio::test]
async fn unsubscribe_is_acknowledged_without_challenge() {
    let pipeline = pipeline_with(Arc::new(MockUpstream::new()));

    assert_eq!(
        pipeline.ingestor.verify(&request(Some("unsubscribe"), None)),
        VerificationOutcome::Unsubscribed
    );
}

#[tokio::test]
async fn unknown_or_incomplete_verification_is_rejected() {
    let pipeline = pipeline_with(Arc::new(MockUpstream::new()));

    for req in [
        request(Some("denied"), Some("x")),
        request(None, Some("x")),
        request(Some("subscribe"), None),
    ] {
        assert_eq!(pipeline.ingestor.verify(&req), VerificationOutcome::InvalidMode);
    }
}

#[tokio::test]
async fn live_notification_publishes_to_store_and_subscribers() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("v1", Reply::Ok(live_video("v1", Some(321))));
    let pipeline = pipeline_with(upstream);
    let mut sub = pipeline.registry.attach();

    let outcome = pipeline
        .ingestor
        .ingest(&notification("v1", CHANNEL_ID))
        .await
        .unwrap();

    let NotificationOutcome::Published(record) = outcome else {
        panic!("expected publish, got {:?}", outcome);
    };
    assert!(record.is_live());
    assert_eq!(record.channel_name, "Mock Channel");

    let stored = pipeline.broadcaster.current().await.expect("stored");
    assert_eq!(stored.to_json(), record.to_json());

    let payload = sub.receiver.recv().await.expect("delivered");
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(json["isLive"], true);
    assert_eq!(json["videoId"], "v1");
    assert_eq!(json["viewerCount"], 321);
}

#[tokio::test]
async fn foreign_channel_leaves_store_untouched() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("v1", Reply::Ok(live_video("v1", None)));
    let pipeline = pipeline_with(upstream.clone());

    let outcome = pipeline
        .ingestor
        .ingest(&notification("v1", "UCsomeoneelse"))
        .await
        .unwrap();

    assert_eq!(outcome, NotificationOutcome::ChannelMismatch);
    assert!(pipeline.broadcaster.current().await.is_none());
    assert_eq!(upstream.video_calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_invalid_payload() {
    let pipeline = pipeline_with(Arc::new(MockUpstream::new()));

    let err = pipeline
        .ingestor
        .ingest("<feed><entry><yt:videoId>v1</yt:videoId>")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidPayload(_)), "got {:?}", err);
    assert!(pipeline.broadcaster.current().await.is_none());
}

#[tokio::test]
async fn feed_without_entry_is_acknowledged() {
    let pipeline = pipeline_with(Arc::new(MockUpstream::new()));
    let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>nothing</title></feed>"#;

    let outcome = pipeline.ingestor.ingest(body).await.unwrap();

    assert_eq!(outcome, NotificationOutcome::NoEntry);
}

#[tokio::test]
async fn unresolvable_video_publishes_nothing() {
    let upstream = Arc::new(MockUpstream::new());
    let pipeline = pipeline_with(upstream.clone());

    let outcome = pipeline
        .ingestor
        .ingest(&notification("deleted", CHANNEL_ID))
        .await
        .unwrap();

    assert_eq!(outcome, NotificationOutcome::ResolutionFailed);
    assert_eq!(upstream.video_calls(), 1);
    assert!(pipeline.broadcaster.current().await.is_none());
}

#[tokio::test]
async fn ended_current_broadcast_publishes_offline() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("v1", Reply::Ok(live_video("v1", Some(10))));
    let pipeline = pipeline_with(upstream.clone());
    pipeline.ingestor.ingest(&notification("v1", CHANNEL_ID)).await.unwrap();

    upstream.set_video("v1", Reply::Ok(ended_video("v1")));
    let outcome = pipeline
        .ingestor
        .ingest(&notification("v1", CHANNEL_ID))
        .await
        .unwrap();

    assert!(matches!(outcome, NotificationOutcome::Published(ref r) if !r.is_live()));
    let stored = pipeline.broadcaster.current().await.unwrap();
    assert!(!stored.is_live());
    assert!(!stored.to_json().contains("videoId"));
}

#[tokio::test]
async fn ended_other_broadcast_does_not_clear_live_state() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("current", Reply::Ok(live_video("current", None)));
    upstream.set_video("older", Reply::Ok(ended_video("older")));
    let pipeline = pipeline_with(upstream);
    pipeline
        .ingestor
        .ingest(&notification("current", CHANNEL_ID))
        .await
        .unwrap();

    let outcome = pipeline
        .ingestor
        .ingest(&notification("older", CHANNEL_ID))
        .await
        .unwrap();

    assert_eq!(outcome, NotificationOutcome::Ignored);
    let stored = pipeline.broadcaster.current().await.unwrap();
    assert_eq!(stored.live.map(|l| l.video_id).as_deref(), Some("current"));
}

#[tokio::test]
async fn ended_broadcast_while_offline_is_published() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("older", Reply::Ok(ended_video("older")));
    let pipeline = pipeline_with(upstream);

    let outcome = pipeline
        .ingestor
        .ingest(&notification("older", CHANNEL_ID))
        .await
        .unwrap();

    assert!(matches!(outcome, NotificationOutcome::Published(ref r) if !r.is_live()));
}

#[tokio::test]
async fn plain_upload_is_ignored() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_video("clip", Reply::Ok(uploaded_video("clip")));
    let pipeline = pipeline_with(upstream);
    let shown = StatusRecord::offline(&ChannelMetadata::new("Shown", "https://logo.test/a.png"), Utc::now());
    pipeline.broadcaster.publish(shown.clone()).await;

    let outcome = pipeline
        .ingestor
        .ingest(&notification("clip", CHANNEL_ID))
        .await
        .unwrap();

    assert_eq!(outcome, NotificationOutcome::Ignored);
    let stored = pipeline.broadcaster.current().await.unwrap();
    assert_eq!(stored.to_json(), shown.to_json());
}

#[tokio::test]
async fn metadata_outage_still_publishes_with_fallback() {
    let upstream = Arc::new(MockUpstream::new());
    upstream.set_channel(Reply::Unavailable);
    upstream.set_video("v1", Reply::Ok(live_video("v1", None)));
    let pipeline = pipeline_with(upstream);

    let outcome = pipeline
        .ingestor
        .ingest(&notification("v1", CHANNEL_ID))
        .await
        .unwrap();

    let NotificationOutcome::Published(record) = outcome else {
        panic!("expected publish");
    };
    assert_eq!(record.channel_name, "Fallback Channel");
    assert_eq!(record.channel_logo, "https://fallback.test/logo.png");
}
