pub mod metadata_cache;
pub mod status_store;

pub use metadata_cache::MetadataCache;
pub use status_store::StatusStore;
