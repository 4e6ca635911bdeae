// Direct link projection for /download-url

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Number;
use time::OffsetDateTime;

use super::models::{FormatDescriptor, MediaMetadata};

lazy_static! {
    static ref EXPIRE_RE: Regex = Regex::new(r"[?&/]expire[=/](\d+)").unwrap();
}

/// Lifetime reported when the URL carries no expiry
pub const DEFAULT_EXPIRES_IN_HOURS: i64 = 6;

/// Response body for a direct link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectLink {
    pub url: String,
    pub format_id: String,
    pub ext: String,
    pub quality: String,
    pub filesize: Option<u64>,
    pub expires_in_hours: i64,
    pub title: Option<String>,
    pub duration: Option<Number>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
}

impl DirectLink {
    pub fn new(metadata: &MediaMetadata, format: &FormatDescriptor, url: &str) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            url: url.to_string(),
            format_id: format.format_id.clone(),
            ext: format.ext.clone(),
            quality: format.quality_label(),
            filesize: format.effective_size(),
            expires_in_hours: expires_in_hours(url, now),
            title: metadata.title.clone(),
            duration: metadata.duration.clone(),
            width: format.width,
            height: format.height,
            fps: format.fps,
        }
    }
}

/// Whole hours until the `expire` timestamp embedded in the URL, never negative
pub fn expires_in_hours(url: &str, now_unix: i64) -> i64 {
    EXPIRE_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(|expire| ((expire - now_unix) / 3600).max(0))
        .unwrap_or(DEFAULT_EXPIRES_IN_HOURS)
}
