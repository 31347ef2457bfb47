pub mod repository_traits;
pub mod upstream_traits;

pub use repository_traits::{KeyValueRepository, StoredValue, CHANNEL_KEY, CURRENT_KEY};
pub use upstream_traits::LiveUpstream;
