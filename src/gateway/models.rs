// Data models shared by the gateway core
//
// Everything here is decoded from provider output per request and dropped at
// response time. Nothing is mutated after decoding.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Number;

lazy_static! {
    /// Manifest-style URL endings (HLS, DASH, HDS, Smooth Streaming)
    static ref MANIFEST_URL_RE: Regex =
        Regex::new(r"(?i)(\.m3u8|\.mpd|\.f4m|\.ism/manifest)($|[?#])").unwrap();
}

/// Protocol name fragments that mean fragment reassembly on the client.
const SEGMENTED_PROTOCOLS: [&str; 5] = ["m3u8", "dash", "f4m", "ism", "websocket_frag"];

/// Which selection algorithm runs for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionIntent {
    /// Hand back a time-limited link the client fetches itself
    DirectUrl,
    /// Transfer bytes server-side into storage
    DownloadToStorage,
}

/// One encoded representation as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Format ID (e.g., "18", "137", "hls-720p")
    #[serde(default)]
    pub format_id: String,
    /// Container extension (mp4, webm, m4a)
    #[serde(default)]
    pub ext: String,
    /// Transport protocol (https, m3u8_native, http_dash_segments)
    pub protocol: Option<String>,
    /// Video codec, "none" for audio-only, absent when unknown
    pub vcodec: Option<String>,
    /// Audio codec, "none" for video-only, absent when unknown
    pub acodec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    pub filesize: Option<Number>,
    pub filesize_approx: Option<Number>,
    /// Direct access URL
    pub url: Option<String>,
    /// Human label (e.g., "360p", "storyboard")
    pub format_note: Option<String>,
}

/// Only an explicit "none" (or empty) codec means the stream is missing.
/// An absent field is unknown, which extractors for plain progressive files
/// routinely leave out.
fn codec_present(codec: &Option<String>) -> bool {
    codec
        .as_deref()
        .map_or(true, |c| !c.is_empty() && c != "none")
}

fn number_to_u64(n: &Number) -> Option<u64> {
    n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

impl FormatDescriptor {
    pub fn has_video(&self) -> bool {
        codec_present(&self.vcodec)
    }

    pub fn has_audio(&self) -> bool {
        codec_present(&self.acodec)
    }

    /// Video and audio in one stream
    pub fn is_combined(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    /// Check if delivery needs client-side fragment reassembly
    pub fn is_manifest_segmented(&self) -> bool {
        let by_protocol = self.protocol.as_deref().map_or(false, |p| {
            let p = p.to_lowercase();
            SEGMENTED_PROTOCOLS.iter().any(|s| p.contains(s))
        });
        let by_url = self
            .url
            .as_deref()
            .map_or(false, |u| MANIFEST_URL_RE.is_match(u));
        by_protocol || by_url
    }

    /// Storyboard/preview placeholder rather than real media
    pub fn is_storyboard(&self) -> bool {
        self.format_id.starts_with("sb")
            || self
                .format_note
                .as_deref()
                .map_or(false, |n| n.to_lowercase().contains("storyboard"))
    }

    /// Non-empty direct URL
    pub fn direct_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize
            .as_ref()
            .and_then(number_to_u64)
            .or_else(|| self.filesize_approx.as_ref().and_then(number_to_u64))
    }

    /// Label for display: format note, else "<height>p"
    pub fn quality_label(&self) -> String {
        match (&self.format_note, self.height) {
            (Some(note), _) if !note.is_empty() => note.clone(),
            (_, Some(h)) => format!("{}p", h),
            _ => "unknown".to_string(),
        }
    }

    pub fn summary(&self) -> FormatSummary {
        FormatSummary {
            format_id: self.format_id.clone(),
            ext: self.ext.clone(),
            protocol: self.protocol.clone(),
            vcodec: self.vcodec.clone(),
            acodec: self.acodec.clone(),
            height: self.height,
            format_note: self.format_note.clone(),
        }
    }
}

/// Compact format view listed when no direct link exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSummary {
    pub format_id: String,
    pub ext: String,
    pub protocol: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub height: Option<u32>,
    pub format_note: Option<String>,
}

/// Resolved media (or playlist) as reported by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<Number>,
    pub uploader: Option<String>,
    /// Fixed-width YYYYMMDD
    pub upload_date: Option<String>,
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
    /// Present when the source is a playlist; broken entries decode as None
    pub entries: Option<Vec<Option<MediaMetadata>>>,
}

impl MediaMetadata {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Projection of a playlist entry for list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    pub duration: Option<Number>,
}

impl From<&MediaMetadata> for PlaylistEntry {
    fn from(media: &MediaMetadata) -> Self {
        Self {
            id: media.id.clone(),
            title: media.title.clone(),
            url: media.webpage_url.clone(),
            uploader: media.uploader.clone(),
            upload_date: media.upload_date.clone(),
            duration: media.duration.clone(),
        }
    }
}
