use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::validate::{ValidationError, Validator};
use crate::error::Result;

/// One stream offered for a media item, as listed under `formats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamCandidate {
    pub format_id: String,
    pub ext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Video size plus the size of the audio stream it will be muxed with.
    /// Only set by [`QualityResolvedMap::with_audio_video_size`](crate::QualityResolvedMap::with_audio_video_size).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_video_size: Option<u64>
}

const NO_CODEC: &str = "none";

impl StreamCandidate {
    pub fn from_value(value: &Value) -> std::result::Result<Self, ValidationError> {
        let mut validator = Validator::new();
        let candidate = Self::read(&mut validator, value, "");
        validator.finish(candidate)
    }

    pub(crate) fn read(validator: &mut Validator, value: &Value, path: &str) -> Option<Self> {
        let object = validator.object(value, path)?;
        let format_id = validator.required_string(object, path, "format_id");
        let ext = validator.required_string(object, path, "ext");

        let candidate = Self {
            format_id: String::new(),
            ext: String::new(),
            format_note: validator.optional_string(object, path, "format_note"),
            width: validator.optional_u32(object, path, "width"),
            height: validator.optional_u32(object, path, "height"),
            fps: validator.optional_f64(object, path, "fps"),
            vcodec: validator.optional_string(object, path, "vcodec"),
            acodec: validator.optional_string(object, path, "acodec"),
            abr: validator.optional_f64(object, path, "abr"),
            vbr: validator.optional_f64(object, path, "vbr"),
            tbr: validator.optional_f64(object, path, "tbr"),
            filesize: validator.optional_u64(object, path, "filesize"),
            filesize_approx: validator.optional_u64(object, path, "filesize_approx"),
            protocol: validator.optional_string(object, path, "protocol"),
            url: validator.optional_string(object, path, "url"),
            audio_video_size: validator.optional_u64(object, path, "audio_video_size")
        };

        Some(Self {
            format_id: format_id?,
            ext: ext?,
            ..candidate
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_ref().is_some_and(|a| a != NO_CODEC)
    }

    pub fn has_video(&self) -> bool {
        self.height.is_some() && !self.is_audio_only()
    }

    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some(NO_CODEC)
    }

    /// Video stream without sound that needs an audio stream muxed in.
    pub fn is_video_only(&self) -> bool {
        self.acodec.as_deref() == Some(NO_CODEC) && !self.is_audio_only()
    }

    pub fn estimated_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// A combined size of exactly zero means no size data was available.
    pub fn is_unsizable(&self) -> bool {
        self.audio_video_size == Some(0)
    }

    pub(crate) fn audio_bitrate(&self) -> Option<f64> {
        self.abr.or(self.tbr)
    }

    pub fn display_size(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            (None, Some(h)) => Some(format!("{h}p")),
            _ => None
        }
    }
}

/// A single extracted media item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedInfo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpage_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
    pub formats: Vec<StreamCandidate>
}

impl ExtractedInfo {
    pub fn from_value(value: &Value) -> std::result::Result<Self, ValidationError> {
        let mut validator = Validator::new();
        let info = Self::read(&mut validator, value, "");
        validator.finish(info)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value)?)
    }

    /// Loads an extraction result previously saved with `--dump-json` or
    /// [`ExtractedInfo::to_value`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading extracted info");
        Self::from_json_str(&contents)
    }

    pub(crate) fn read(validator: &mut Validator, value: &Value, path: &str) -> Option<Self> {
        let object: &Map<String, Value> = validator.object(value, path)?;
        let id = validator.required_string(object, path, "id");
        let title = validator.required_string(object, path, "title");

        let formats = validator
            .required_array(object, path, "formats")
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let item_path = super::validate::join_path(path, &format!("formats[{i}]"));
                        StreamCandidate::read(validator, item, &item_path)
                    })
                    .collect::<Vec<_>>()
            });

        let info = Self {
            id: String::new(),
            title: String::new(),
            webpage_url: validator.optional_string(object, path, "webpage_url"),
            original_url: validator.optional_string(object, path, "original_url"),
            duration: validator.optional_f64(object, path, "duration"),
            description: validator.optional_string(object, path, "description"),
            uploader: validator.optional_string(object, path, "uploader"),
            channel: validator.optional_string(object, path, "channel"),
            upload_date: validator.optional_string(object, path, "upload_date"),
            view_count: validator.optional_u64(object, path, "view_count"),
            thumbnail: validator.optional_string(object, path, "thumbnail"),
            is_live: validator.optional_bool(object, path, "is_live"),
            extractor: validator.optional_string(object, path, "extractor"),
            formats: Vec::new()
        };

        Some(Self {
            id: id?,
            title: title?,
            formats: formats?,
            ..info
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn url(&self) -> Option<&str> {
        self.webpage_url.as_deref().or(self.original_url.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        self.formats.iter().any(StreamCandidate::has_audio)
    }
}
