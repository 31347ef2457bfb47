use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "livewatch")]
#[command(author, version, about = "Livewatch - relays a YouTube channel's live status to web clients")]
pub struct Args {
    /// YouTube Data API v3 key
    #[arg(long, env = "YOUTUBE_API_KEY")]
    pub api_key: String,

    /// The one channel being tracked
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: String,

    /// Address to which the server will bind
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8787")]
    pub server_addr: String,

    /// Postgres connection URL. Without it, state is kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Per-call timeout for provider lookups, in seconds
    #[arg(long, default_value_t = 8)]
    pub upstream_timeout_secs: u64,

    /// Interval between keep-alive comments on live streams, in seconds
    #[arg(long, default_value_t = 15)]
    pub heartbeat_secs: u64,

    #[arg(long, default_value_t = 86_400)]
    pub metadata_ttl_secs: u64,

    /// Lifetime of substituted channel metadata after a failed lookup
    #[arg(long, default_value_t = 3_600)]
    pub fallback_ttl_secs: u64,

    #[arg(long, env = "FALLBACK_CHANNEL_NAME", default_value = "Live channel")]
    pub fallback_channel_name: String,

    #[arg(long, env = "FALLBACK_CHANNEL_LOGO", default_value = "https://www.youtube.com/favicon.ico")]
    pub fallback_channel_logo: String,

    #[arg(long, env = "YOUTUBE_BASE_URL", default_value = livewatch_core::config::DEFAULT_YOUTUBE_BASE_URL)]
    pub youtube_base_url: String,

    /// Queue depth per live-stream client before it is dropped as too slow
    #[arg(long, default_value_t = 16)]
    pub subscriber_buffer: usize,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("livewatch=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "Livewatch starting. channel={}, addr={}, durable={}",
        args.channel_id,
        args.server_addr,
        args.database_url.is_some()
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }

    info!("Livewatch stopped.");
    Ok(())
}
