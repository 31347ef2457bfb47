// ========================================================
// File: livewatch-core/src/platforms/youtube/mod.rs
// ========================================================
pub mod client;
pub mod requests;

pub use client::YouTubeClient;
