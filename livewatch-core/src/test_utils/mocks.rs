use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use livewatch_common::models::{ChannelMetadata, VideoDetails};
use livewatch_common::traits::LiveUpstream;

use crate::http::HttpClient;
use crate::Error;

/// Canned answer for one upstream lookup.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    NotFound,
    Unavailable,
    /// Never answers (well, not for an hour).
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self, what: &str) -> Result<T, Error> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::NotFound => Err(Error::NotFound(what.to_string())),
            Reply::Unavailable => Err(Error::UpstreamUnavailable(format!("{} unavailable", what))),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::UpstreamUnavailable(format!("{} hung", what)))
            }
        }
    }
}

/// Scriptable `LiveUpstream` that counts its calls.
pub struct MockUpstream {
    channel: Mutex<Reply<ChannelMetadata>>,
    live_search: Mutex<Reply<Option<String>>>,
    videos: Mutex<HashMap<String, Reply<VideoDetails>>>,
    delay: Mutex<Duration>,
    channel_calls: AtomicUsize,
    search_calls: AtomicUsize,
    video_calls: AtomicUsize,
}

impl MockUpstream {
    /// Channel resolves as "Mock Channel", nothing is live, no videos exist.
    pub fn new() -> Self {
        Self {
            channel: Mutex::new(Reply::Ok(ChannelMetadata::new("Mock Channel", "https://yt3.test/mock.png"))),
            live_search: Mutex::new(Reply::Ok(None)),
            videos: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            channel_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_channel(&self, reply: Reply<ChannelMetadata>) {
        *self.channel.lock() = reply;
    }

    pub fn set_live_search(&self, reply: Reply<Option<String>>) {
        *self.live_search.lock() = reply;
    }

    pub fn set_video(&self, video_id: &str, reply: Reply<VideoDetails>) {
        self.videos.lock().insert(video_id.to_string(), reply);
    }

    /// Added before every answer, to widen race windows.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Everything down: all three lookups fail.
    pub fn go_down(&self) {
        self.set_channel(Reply::Unavailable);
        self.set_live_search(Reply::Unavailable);
        self.videos.lock().clear();
    }

    pub fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn video_calls(&self) -> usize {
        self.video_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveUpstream for MockUpstream {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelMetadata, Error> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let reply = self.channel.lock().clone();
        reply.resolve(&format!("channel {}", channel_id)).await
    }

    async fn find_active_live_video_id(&self, channel_id: &str) -> Result<Option<String>, Error> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let reply = self.live_search.lock().clone();
        reply.resolve(&format!("live search {}", channel_id)).await
    }

    async fn resolve_video(&self, video_id: &str) -> Result<VideoDetails, Error> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let reply = self
            .videos
            .lock()
            .get(video_id)
            .cloned()
            .unwrap_or(Reply::NotFound);
        reply.resolve(&format!("video {}", video_id)).await
    }
}

/// A running broadcast, started at a fixed instant.
pub fn live_video(video_id: &str, viewers: Option<u64>) -> VideoDetails {
    VideoDetails {
        video_id: video_id.to_string(),
        is_broadcast: true,
        is_live: true,
        title: Some(format!("Broadcast {}", video_id)),
        thumbnail: Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)),
        started_at: Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).single(),
        viewer_count: viewers,
    }
}

/// A broadcast that has finished.
pub fn ended_video(video_id: &str) -> VideoDetails {
    VideoDetails {
        is_live: false,
        viewer_count: None,
        ..live_video(video_id, None)
    }
}

/// A regular upload with no broadcast lifecycle.
pub fn uploaded_video(video_id: &str) -> VideoDetails {
    VideoDetails {
        is_broadcast: false,
        started_at: None,
        ..ended_video(video_id)
    }
}

enum HttpReply {
    Body(String),
    Fail(String),
    Hang,
}

/// `HttpClient` keyed by the last path segment of the URL (`channels`,
/// `search`, `videos`).
#[derive(Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<String, HttpReply>>,
    requests: Mutex<Vec<Url>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, resource: &str, body: &str) {
        self.routes
            .lock()
            .insert(resource.to_string(), HttpReply::Body(body.to_string()));
    }

    pub fn fail(&self, resource: &str, message: &str) {
        self.routes
            .lock()
            .insert(resource.to_string(), HttpReply::Fail(message.to_string()));
    }

    pub fn hang(&self, resource: &str) {
        self.routes.lock().insert(resource.to_string(), HttpReply::Hang);
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: Url) -> Result<String, Error> {
        self.requests.lock().push(url.clone());
        let resource = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string();

        let outcome = match self.routes.lock().get(&resource) {
            Some(HttpReply::Body(b)) => Ok(Some(b.clone())),
            Some(HttpReply::Fail(m)) => Err(Error::UpstreamUnavailable(m.clone())),
            Some(HttpReply::Hang) => Ok(None),
            None => Err(Error::UpstreamUnavailable(format!("HTTP 404 => no route for {}", resource))),
        };

        match outcome? {
            Some(body) => Ok(body),
            None => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::UpstreamUnavailable("hung".into()))
            }
        }
    }
}
