//! livewatch-server/src/server.rs
//!
//! HTTP surface: hub callback, status snapshot, explicit re-poll and the live
//! event stream.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_stream::wrappers::ReceiverStream;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use livewatch_common::models::{ChannelMetadata, LiveBroadcast, StatusRecord};
use livewatch_core::Error;
use livewatch_core::eventbus::{SubscriberId, Subscription, SubscriptionRegistry};
use livewatch_core::services::{
    LivePipeline, NotificationOutcome, VerificationOutcome, VerificationRequest, prime_subscriber,
};

use crate::Args;
use crate::context::ServerContext;

pub async fn run_server(args: Args) -> Result<(), Error> {
    let addr: SocketAddr = args.server_addr.parse()?;
    let ctx = ServerContext::new(&args).await?;

    if !ctx.youtube.probe(&args.channel_id).await {
        warn!("YouTube API not confirmed; lookups will degrade to fallbacks until it answers");
    }

    // Serve only once there is something to serve.
    match ctx.pipeline.reconciler.ensure_initial_status().await {
        Ok(status) => info!("Initial status ready (live={})", status.is_live()),
        Err(e) => error!("Initial status poll failed: {}", e),
    }

    let registry = ctx.pipeline.registry.clone();
    let app = build_router(ctx.pipeline.clone());

    let listener = TcpListener::bind(addr).await?;
    info!("Livewatch listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await?;

    if let Some(db) = &ctx.db {
        db.close().await;
    }
    info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal(registry: SubscriptionRegistry) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, closing live streams...");
    registry.shutdown();
}

pub fn build_router(pipeline: LivePipeline) -> Router {
    Router::new()
        .route("/api/webhook", get(webhook_verify).post(webhook_notify))
        .route("/api/status", get(current_status))
        .route("/api/check-live", get(check_live))
        .route("/api/live", get(live_stream))
        .route("/healthz", get(|| async { "OK" }))
        .with_state(pipeline)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn webhook_verify(
    State(pipeline): State<LivePipeline>,
    Query(req): Query<VerificationRequest>,
) -> Response {
    match pipeline.ingestor.verify(&req) {
        VerificationOutcome::Challenge(challenge) => (StatusCode::OK, challenge).into_response(),
        VerificationOutcome::Unsubscribed => (StatusCode::OK, "OK").into_response(),
        VerificationOutcome::InvalidMode => {
            warn!("Webhook verification with unexpected mode {:?}", req.mode);
            (StatusCode::BAD_REQUEST, "Invalid mode").into_response()
        }
    }
}

async fn webhook_notify(State(pipeline): State<LivePipeline>, body: Bytes) -> Response {
    let outcome = match std::str::from_utf8(&body) {
        Ok(text) => pipeline.ingestor.ingest(text).await,
        Err(e) => Err(Error::InvalidPayload(format!("body is not UTF-8: {}", e))),
    };
    match outcome {
        Ok(NotificationOutcome::NoEntry) => (StatusCode::OK, "No entry").into_response(),
        Ok(NotificationOutcome::ChannelMismatch) => (StatusCode::OK, "Wrong channel").into_response(),
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            warn!("Rejected hub notification: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid XML").into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StatusQuery {
    test: Option<String>,
}

/// Stored status, or an offline record with whatever metadata is on hand.
/// `?test=live|offline` answers with a synthetic record for widget previews.
async fn current_status(
    State(pipeline): State<LivePipeline>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusRecord> {
    match query.test.as_deref() {
        Some("live") => {
            let channel = pipeline.metadata.get_or_fetch().await;
            return Json(preview_live(&channel));
        }
        Some("offline") => {
            let channel = pipeline.metadata.get_or_fetch().await;
            return Json(StatusRecord::offline(&channel, Utc::now()));
        }
        _ => {}
    }

    match pipeline.broadcaster.current().await {
        Some(record) => Json(record),
        None => {
            let channel = pipeline.metadata.best_effort().await;
            Json(StatusRecord::offline(&channel, Utc::now()))
        }
    }
}

fn preview_live(channel: &ChannelMetadata) -> StatusRecord {
    let now = Utc::now();
    let broadcast = LiveBroadcast {
        title: "TEST: Preview broadcast".to_string(),
        video_id: "dQw4w9WgXcQ".to_string(),
        thumbnail: "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".to_string(),
        started_at: now,
        viewer_count: Some(1234),
    };
    StatusRecord::live(broadcast, channel, now)
}

async fn check_live(State(pipeline): State<LivePipeline>) -> Response {
    match pipeline.reconciler.refresh().await {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            error!("Explicit re-poll failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": true }))).into_response()
        }
    }
}

/// Detaches the subscriber when its stream is dropped (client gone or
/// server shutting down).
struct DetachGuard {
    registry: SubscriptionRegistry,
    id: SubscriberId,
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        if self.registry.detach(self.id) {
            debug!("Live client {} disconnected", self.id);
        }
    }
}

async fn live_stream(
    State(pipeline): State<LivePipeline>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let Subscription { id, sender, receiver } = pipeline.registry.attach();
    let guard = DetachGuard {
        registry: pipeline.registry.clone(),
        id,
    };

    tokio::spawn(prime_subscriber(
        pipeline.reconciler.clone(),
        sender,
        pipeline.config.reconcile_timeout,
    ));

    let stream = ReceiverStream::new(receiver)
        .map(move |payload| {
            let _held = &guard;
            Ok::<_, Infallible>(Event::default().data(&*payload))
        })
        .take_until(pipeline.registry.shutdown_signal());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(pipeline.config.heartbeat)
            .text("ping"),
    )
}
