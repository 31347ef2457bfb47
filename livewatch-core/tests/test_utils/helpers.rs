// File: livewatch-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use livewatch_common::models::ChannelMetadata;
use livewatch_core::config::PipelineConfig;
use livewatch_core::repositories::InMemoryKeyValueRepository;
use livewatch_core::services::LivePipeline;
use livewatch_core::test_utils::mocks::MockUpstream;
use livewatch_common::traits::LiveUpstream;

pub const CHANNEL_ID: &str = "UCtracked";

pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::new(CHANNEL_ID);
    config.metadata.fallback = ChannelMetadata::new("Fallback Channel", "https://fallback.test/logo.png");
    config.reconcile_timeout = Duration::from_secs(2);
    config.subscriber_buffer = 8;
    config
}

pub fn pipeline_with(upstream: Arc<MockUpstream>) -> LivePipeline {
    pipeline_over(upstream)
}

pub fn pipeline_over(upstream: Arc<dyn LiveUpstream>) -> LivePipeline {
    LivePipeline::new(test_config(), upstream, Arc::new(InMemoryKeyValueRepository::new()))
}

/// Atom body as the hub posts it.
pub fn notification(video_id: &str, channel_id: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <link rel="hub" href="https://pubsubhubbub.appspot.com"/>
  <title>YouTube video feed</title>
  <entry>
    <id>yt:video:{video_id}</id>
    <yt:videoId>{video_id}</yt:videoId>
    <yt:channelId>{channel_id}</yt:channelId>
    <title>Update</title>
  </entry>
</feed>
"#
    )
}
