use clap::Args;
use ytdlp_mod::{AudioQuality, MediaExtension, QualityResolvedMap, StreamCandidate, format_bytes, resolve};

use super::Context;

#[derive(Args)]
pub struct FormatsArgs {
    /// URL of the video
    url: String,

    /// Container to resolve tiers for (webm or mp4)
    #[arg(short = 'f', long = "format", default_value = "webm")]
    format: MediaExtension,

    /// Audio tier whose size is added to video-only streams
    #[arg(short = 'a', long = "audio-tier", default_value = "medium")]
    audio_tier: AudioQuality,

    /// Print the resolved map as JSON
    #[arg(long = "json")]
    json: bool
}

pub async fn run(ctx: &Context, args: FormatsArgs) -> anyhow::Result<()> {
    let info = ctx.extract(&args.url).await?;

    let container = args.format.source_container();
    let map = resolve(&info, container, None).with_audio_video_size(args.audio_tier)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("{} [{}]", info.title, info.id);
    print!("{}", render_table(&map));
    Ok(())
}

fn render_table(map: &QualityResolvedMap) -> String {
    if map.is_empty() {
        return format!("No {} streams found.\n", map.container());
    }

    let mut out = format!("{:<10} {:<8} {:<5} {:<11} {:>12}\n", "TIER", "ID", "EXT", "RESOLUTION", "SIZE");
    for (tier, candidate) in map.iter() {
        out.push_str(&format!(
            "{:<10} {:<8} {:<5} {:<11} {:>12}\n",
            tier.as_str(),
            candidate.format_id,
            candidate.ext,
            resolution(candidate),
            candidate
                .audio_video_size
                .filter(|size| *size > 0)
                .map_or_else(|| "unknown".to_string(), format_bytes)
        ));
    }
    out
}

fn resolution(candidate: &StreamCandidate) -> String {
    match (candidate.width, candidate.height) {
        (Some(width), Some(height)) => format!("{width}x{height}"),
        (None, Some(height)) => format!("{height}p"),
        _ => "audio only".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ytdlp_mod::ExtractedInfo;

    fn map() -> QualityResolvedMap {
        let info = ExtractedInfo::from_value(&json!({
            "id": "x",
            "title": "t",
            "formats": [
                {"format_id": "244", "ext": "webm", "width": 854, "height": 480, "acodec": "none", "filesize": 2000},
                {"format_id": "251", "ext": "webm", "vcodec": "none", "abr": 130, "filesize": 500}
            ]
        }))
        .unwrap();
        resolve(&info, MediaExtension::Webm, None)
            .with_audio_video_size(AudioQuality::Medium)
            .unwrap()
    }

    #[test]
    fn test_table_lists_combined_sizes() {
        let table = render_table(&map());
        assert!(table.starts_with("TIER"));
        assert!(table.lines().any(|line| line.starts_with("480p") && line.contains("2.50 KB")));
        assert!(table.lines().any(|line| line.starts_with("medium") && line.contains("audio only")));
    }

    #[test]
    fn test_empty_map() {
        let table = render_table(&QualityResolvedMap::empty(MediaExtension::Mp4));
        assert_eq!(table, "No mp4 streams found.\n");
    }

    #[test]
    fn test_json_is_keyed_by_tier() {
        let value = serde_json::to_value(map()).unwrap();
        assert_eq!(value["480p"]["format_id"], "244");
        assert_eq!(value["best"]["audio_video_size"], 2500);
    }
}
