// livewatch-core/src/lib.rs

pub mod cache;
pub mod config;
pub mod db;
pub mod eventbus;
pub mod http;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use livewatch_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient};
