// File: livewatch-common/src/models/mod.rs
pub mod channel;
pub mod event;
pub mod status;

pub use channel::ChannelMetadata;
pub use event::StreamEvent;
pub use status::{LiveBroadcast, StatusRecord, VideoDetails};
