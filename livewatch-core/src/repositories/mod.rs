// livewatch-core/src/repositories/mod.rs

pub mod memory;
pub mod postgres;

pub use livewatch_common::traits::{KeyValueRepository, StoredValue, CHANNEL_KEY, CURRENT_KEY};
pub use memory::InMemoryKeyValueRepository;
pub use postgres::PostgresKeyValueRepository;

/// Converts a std duration to the chrono one used for expiry math,
/// saturating on absurd values.
pub(crate) fn to_chrono(ttl: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500))
}
