// File: livewatch-core/src/test_utils/mod.rs
//
// In-memory doubles for the provider seams, shared by unit tests, the
// integration tests under tests/, and the server crate's router tests.

pub mod mocks;
