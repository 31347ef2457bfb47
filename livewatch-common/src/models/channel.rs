use serde::{Deserialize, Serialize};

/// Display name and logo of the tracked channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub name: String,
    pub logo: String,
}

impl ChannelMetadata {
    pub fn new(name: impl Into<String>, logo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo: logo.into(),
        }
    }

    /// A stored entry with an empty name is as good as no entry.
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn has_logo(&self) -> bool {
        !self.logo.trim().is_empty()
    }
}
