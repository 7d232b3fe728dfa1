use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;
use ytdlp_mod::{
    AudioQuality, DownloadOptions, FormatSelection, MediaExtension, SelectorBuilder, SelectorChain,
    VideoQuality, resolve
};

use super::{Context, output_dir};

#[derive(Args)]
pub struct VideoArgs {
    /// URL of the video
    url: String,

    /// Quality tier (144p ... 4320p, 2k, 4k, 8k or best)
    #[arg(short = 'q', long = "quality", default_value = "best")]
    quality: VideoQuality,

    /// Directory to download into
    #[arg(short = 'd', long = "dir", default_value = ".")]
    output_dir: PathBuf,

    /// Video container (webm or mp4)
    #[arg(short = 'f', long = "format", default_value = "webm")]
    format: MediaExtension,

    /// Download and embed subtitles in this language
    #[arg(long = "subtitle-lang")]
    subtitle_lang: Option<String>
}

pub async fn run(ctx: &Context, args: VideoArgs) -> anyhow::Result<()> {
    if !args.format.is_video_container() {
        bail!("{} is not a video container, use webm or mp4", args.format);
    }
    let dir = output_dir(&args.output_dir)?;

    let info = ctx.extract(&args.url).await?;
    let map = resolve(&info, args.format, Some(args.format.audio_family()));

    let fallback_audio = map.get(AudioQuality::Medium).or_else(|| map.get(AudioQuality::Low));
    let selection = SelectorBuilder::new(MediaExtension::M4a).build(&map, args.quality, fallback_audio)?;

    if let Some(degradation) = selection.degradation {
        tracing::warn!("{}", degradation);
    }
    tracing::info!("Downloading \"{}\" at {}", info.title, selection.quality);

    let options = video_options(selection.chain, &dir, args.subtitle_lang, ctx.quiet);
    ctx.download(info.url().unwrap_or(&args.url), &options).await
}

/// Merges into mp4 with AAC audio, replacing any earlier download.
fn video_options(chain: SelectorChain, dir: &Path, subtitle_lang: Option<String>, quiet: bool) -> DownloadOptions {
    let mut options = DownloadOptions::new()
        .format(FormatSelection::Chain(chain))
        .merge_output_format(MediaExtension::Mp4)
        .merger_audio_codec("aac")
        .output_dir(dir)
        .overwrites(true)
        .quiet(quiet);
    if let Some(lang) = subtitle_lang {
        options = options.subtitle_lang(lang);
    }
    options
}
