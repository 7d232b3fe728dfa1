use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use ytdlp_mod::{
    AudioBitrate, AudioQuality, DownloadOptions, Error, FormatSelection, MediaExtension,
    SelectorBuilder, resolve_audio
};

use super::{Context, output_dir};

#[derive(Args)]
pub struct AudioArgs {
    /// URL of the video
    url: String,

    /// Audio tier (ultralow, low, medium or bestaudio)
    #[arg(short = 'q', long = "quality", default_value = "bestaudio")]
    quality: AudioQuality,

    /// Directory to download into
    #[arg(short = 'd', long = "dir", default_value = ".")]
    output_dir: PathBuf,

    /// Output format (webm, mp4, m4a or mp3)
    #[arg(short = 'f', long = "format", default_value = "webm")]
    format: MediaExtension,

    /// Target bitrate when converting (64k ... 320k)
    #[arg(short = 'b', long = "bitrate")]
    bitrate: Option<AudioBitrate>
}

/// Codec and bitrate to convert the downloaded audio to, if any.
fn extraction(format: MediaExtension, bitrate: Option<AudioBitrate>) -> Option<(MediaExtension, Option<AudioBitrate>)> {
    match format {
        MediaExtension::Mp3 => Some((MediaExtension::Mp3, Some(bitrate.unwrap_or(AudioBitrate::K128)))),
        MediaExtension::M4a => Some((MediaExtension::M4a, bitrate)),
        MediaExtension::Webm | MediaExtension::Mp4 => bitrate.map(|b| (MediaExtension::Mp3, Some(b)))
    }
}

pub async fn run(ctx: &Context, args: AudioArgs) -> anyhow::Result<()> {
    let dir = output_dir(&args.output_dir)?;

    let info = ctx.extract(&args.url).await?;
    if !info.has_audio() {
        return Err(Error::NoAudioStreams).with_context(|| format!("cannot download audio of {}", info.id));
    }

    let source = args.format.source_container();
    let map = resolve_audio(&info, source.audio_family());
    let chain = SelectorBuilder::new(source.audio_family()).build_audio(&map, args.quality)?;
    tracing::info!("Downloading audio of \"{}\" at {}", info.title, args.quality);

    let mut options = DownloadOptions::new()
        .format(FormatSelection::Chain(chain))
        .output_dir(dir)
        .quiet(ctx.quiet);
    if let Some((codec, bitrate)) = extraction(args.format, args.bitrate) {
        options = options.extract_audio(codec);
        if let Some(bitrate) = bitrate {
            options = options.audio_bitrate(bitrate);
        }
    }

    ctx.download(info.url().unwrap_or(&args.url), &options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp3_defaults_to_128k() {
        assert_eq!(
            extraction(MediaExtension::Mp3, None),
            Some((MediaExtension::Mp3, Some(AudioBitrate::K128)))
        );
        assert_eq!(
            extraction(MediaExtension::Mp3, Some(AudioBitrate::K320)),
            Some((MediaExtension::Mp3, Some(AudioBitrate::K320)))
        );
    }

    #[test]
    fn test_m4a_extracts_without_forced_bitrate() {
        assert_eq!(extraction(MediaExtension::M4a, None), Some((MediaExtension::M4a, None)));
    }

    #[test]
    fn test_source_containers() {
        assert_eq!(extraction(MediaExtension::Webm, None), None);
        assert_eq!(
            extraction(MediaExtension::Webm, Some(AudioBitrate::K192)),
            Some((MediaExtension::Mp3, Some(AudioBitrate::K192)))
        );
    }
}
