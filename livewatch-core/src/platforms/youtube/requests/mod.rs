pub mod channel;
pub mod search;
pub mod video;

use serde::Deserialize;

/// Thumbnail set shared by channel and video snippets.
#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl Thumbnails {
    /// Largest of high, medium, default that is present.
    pub fn preferred_url(&self) -> Option<String> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.clone())
            .find(|u| !u.is_empty())
    }
}
