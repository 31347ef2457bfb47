pub mod live_stream;
pub mod pipeline;
pub mod reconciler;
pub mod webhook;

pub use live_stream::{prime_subscriber, PrimeOutcome};
pub use pipeline::LivePipeline;
pub use reconciler::Reconciler;
pub use webhook::{NotificationOutcome, VerificationOutcome, VerificationRequest, WebhookIngestor};
