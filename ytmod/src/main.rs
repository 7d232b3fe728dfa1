mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ytdlp_mod::YtDlp;

use commands::{AudioArgs, Context, FormatsArgs, VideoArgs};

#[derive(Parser)]
#[command(
    name = "ytmod",
    about = "Download videos and audio at a chosen quality tier",
    long_about = "Resolves the formats yt-dlp reports for a URL into fixed quality tiers\n\
    and downloads the requested one, falling back to a neighbouring tier when needed.\n\n\
    Examples:\n\
      ytmod video https://example.com/watch?v=id                  # Best video as mp4\n\
      ytmod video -q 720p -f webm https://example.com/watch?v=id  # 720p webm\n\
      ytmod audio -f mp3 -b 192k https://example.com/watch?v=id   # MP3 at 192k\n\
      ytmod formats --json https://example.com/watch?v=id         # Resolved tiers as JSON\n\n\
    Environment:\n\
      YTDLP_PATH     yt-dlp binary to run\n\
      FFMPEG_PATH    ffmpeg location passed to yt-dlp\n\
      YTDLP_COOKIES  cookies file passed to yt-dlp"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only print errors
    #[arg(short = 'Q', long = "quiet", global = true)]
    quiet: bool
}

#[derive(Subcommand)]
enum Command {
    /// Download a video at a quality tier
    Video(VideoArgs),
    /// Download the audio track of a video
    Audio(AudioArgs),
    /// List the resolved quality tiers without downloading
    Formats(FormatsArgs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "error" } else { "ytmod=info,ytdlp_mod=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into())
        )
        .init();

    let client = client_from_env();
    match client.check_binary().await {
        Ok(version) => tracing::debug!("yt-dlp version: {}", version),
        Err(e) => tracing::warn!("yt-dlp is not usable: {}", e)
    }

    let ctx = Context {
        client,
        quiet: cli.quiet
    };

    match cli.command {
        Command::Video(args) => commands::video::run(&ctx, args).await,
        Command::Audio(args) => commands::audio::run(&ctx, args).await,
        Command::Formats(args) => commands::formats::run(&ctx, args).await
    }
}

fn client_from_env() -> YtDlp {
    let mut client = match non_empty_env("YTDLP_PATH") {
        Some(path) => {
            tracing::info!("Using custom yt-dlp path: {}", path);
            YtDlp::with_binary(path)
        }
        None => YtDlp::new()
    };

    if let Some(path) = non_empty_env("FFMPEG_PATH") {
        tracing::info!("Using custom ffmpeg path: {}", path);
        client.set_ffmpeg_location(Some(PathBuf::from(path)));
    }

    if let Some(path) = non_empty_env("YTDLP_COOKIES") {
        let path = PathBuf::from(path);
        if path.exists() {
            tracing::info!("Using cookies file: {}", path.display());
            client.set_cookies_file(Some(path));
        } else {
            tracing::warn!("Cookies file {} does not exist, ignoring", path.display());
        }
    }

    client
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
