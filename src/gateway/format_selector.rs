// FormatSelector - decides which representation a request gets
//
// Two intents:
// - DownloadToStorage: builds the provider fallback chain, the provider picks
// - DirectUrl: filters and ranks the provider's formats ourselves
//
// Pure over the supplied metadata. The provider's format list is only read.

use std::cmp::Ordering;

use tracing::debug;

use super::errors::GatewayError;
use super::models::{FormatDescriptor, MediaMetadata, ResolutionIntent};

/// 360p progressive mp4 with audio, available on almost every video
pub const CANONICAL_FORMAT_ID: &str = "18";

/// Upper bound on diagnostic formats listed for a streaming-only source
pub const MAX_LISTED_FORMATS: usize = 10;

/// Height ceiling of the storage chain, keeps output around 10-30 MB
const STORAGE_HEIGHT_CEILING: u32 = 480;

/// Outcome of a selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// Format whose URL is handed to the client
    Direct(&'a FormatDescriptor),
    /// Provider format expression evaluated left to right
    FallbackChain(String),
}

/// Format selector for direct links and storage downloads
pub struct FormatSelector;

impl FormatSelector {
    pub fn select<'a>(
        metadata: &'a MediaMetadata,
        requested_format_id: Option<&str>,
        intent: ResolutionIntent,
    ) -> Result<Selection<'a>, GatewayError> {
        match intent {
            ResolutionIntent::DownloadToStorage => Ok(Selection::FallbackChain(
                Self::download_chain(requested_format_id),
            )),
            ResolutionIntent::DirectUrl => {
                Self::select_direct(metadata, requested_format_id).map(Selection::Direct)
            }
        }
    }

    /// Get the provider format expression for a storage download.
    ///
    /// The literal order and the 480p ceiling are part of the provider
    /// contract; do not reorder.
    pub fn download_chain(requested_format_id: Option<&str>) -> String {
        let head = requested_format_id
            .filter(|id| !id.is_empty())
            .unwrap_or(CANONICAL_FORMAT_ID);
        let h = STORAGE_HEIGHT_CEILING;

        format!(
            "{head}/bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]/worst"
        )
    }

    /// Pick the format served as a direct link.
    ///
    /// Order of rules:
    /// 1. drop formats without URL, segmented ones, storyboards, audio-only
    ///    (a missing vcodec is unknown and kept)
    /// 2. nothing left: `StreamingOnly`
    /// 3. exact requested id wins over any ranking
    /// 4. best combined (video+audio) by height*fps, then bitrate
    /// 5. canonical id 18
    /// 6. first remaining candidate in provider order
    pub fn select_direct<'a>(
        metadata: &'a MediaMetadata,
        requested_format_id: Option<&str>,
    ) -> Result<&'a FormatDescriptor, GatewayError> {
        let candidates = Self::direct_candidates(&metadata.formats);

        if candidates.is_empty() {
            debug!(
                "No direct candidates among {} formats",
                metadata.formats.len()
            );
            return Err(GatewayError::StreamingOnly {
                available: metadata
                    .formats
                    .iter()
                    .take(MAX_LISTED_FORMATS)
                    .map(FormatDescriptor::summary)
                    .collect(),
            });
        }

        let chosen = Self::pick(&candidates, requested_format_id);

        if chosen.direct_url().is_none() {
            return Err(GatewayError::NoDirectUrl(chosen.format_id.clone()));
        }

        debug!(
            format_id = %chosen.format_id,
            candidates = candidates.len(),
            "Selected direct format"
        );
        Ok(chosen)
    }

    /// Formats that can be fetched with one plain request
    fn direct_candidates(formats: &[FormatDescriptor]) -> Vec<&FormatDescriptor> {
        formats
            .iter()
            .filter(|f| f.direct_url().is_some())
            .filter(|f| !f.is_manifest_segmented())
            .filter(|f| !f.is_storyboard())
            .filter(|f| f.has_video())
            .collect()
    }

    fn pick<'a>(
        candidates: &[&'a FormatDescriptor],
        requested_format_id: Option<&str>,
    ) -> &'a FormatDescriptor {
        if let Some(requested) = requested_format_id.filter(|id| !id.is_empty()) {
            if let Some(exact) = candidates.iter().copied().find(|f| f.format_id == requested) {
                return exact;
            }
            debug!("Requested format {} not directly available", requested);
        }

        let mut combined: Vec<&FormatDescriptor> =
            candidates.iter().copied().filter(|f| f.is_combined()).collect();
        // Stable: equal ranks keep provider order
        combined.sort_by(|a, b| Self::rank(b, a));
        if let Some(best) = combined.first() {
            return *best;
        }

        if let Some(canonical) = candidates
            .iter()
            .copied()
            .find(|f| f.format_id == CANONICAL_FORMAT_ID)
        {
            return canonical;
        }

        // Provider order, not ranked
        candidates[0]
    }

    /// Ascending order by (height * fps, bitrate); missing values count as 0
    fn rank(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
        let score = |f: &FormatDescriptor| f64::from(f.height.unwrap_or(0)) * f.fps.unwrap_or(0.0);
        let bitrate = |f: &FormatDescriptor| f.tbr.unwrap_or(0.0);

        score(a)
            .total_cmp(&score(b))
            .then_with(|| bitrate(a).total_cmp(&bitrate(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(formats: serde_json::Value) -> MediaMetadata {
        MediaMetadata::from_value(&json!({
            "id": "vid",
            "title": "Video",
            "formats": formats,
        }))
        .unwrap()
    }

    fn direct_id(meta: &MediaMetadata, requested: Option<&str>) -> String {
        FormatSelector::select_direct(meta, requested)
            .unwrap()
            .format_id
            .clone()
    }

    #[test]
    fn test_download_chain_default_head() {
        assert_eq!(
            FormatSelector::download_chain(None),
            "18/bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/best[height<=480][ext=mp4]/best[height<=480]/worst"
        );
        assert_eq!(
            FormatSelector::download_chain(Some("")),
            FormatSelector::download_chain(None)
        );
    }

    #[test]
    fn test_download_chain_requested_head() {
        assert_eq!(
            FormatSelector::download_chain(Some("22")),
            "22/bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/best[height<=480][ext=mp4]/best[height<=480]/worst"
        );
    }

    #[test]
    fn test_select_storage_intent_ignores_formats() {
        let meta = metadata(json!([]));
        let selection =
            FormatSelector::select(&meta, Some("140"), ResolutionIntent::DownloadToStorage).unwrap();
        assert_eq!(
            selection,
            Selection::FallbackChain(FormatSelector::download_chain(Some("140")))
        );
    }

    #[test]
    fn test_exact_id_overrides_combined_preference() {
        let meta = metadata(json!([
            {"format_id": "18", "url": "u1", "vcodec": "h264", "acodec": "aac", "protocol": "https"},
            {"format_id": "22", "url": "u2", "vcodec": "h264", "acodec": "none", "protocol": "https"}
        ]));
        assert_eq!(direct_id(&meta, Some("22")), "22");
        assert_eq!(direct_id(&meta, None), "18");
    }

    #[test]
    fn test_requested_segmented_format_is_not_returned() {
        let meta = metadata(json!([
            {"format_id": "18", "url": "u1", "vcodec": "h264", "acodec": "aac", "protocol": "https"},
            {"format_id": "hls-1080", "url": "https://x/a.m3u8", "vcodec": "avc1", "acodec": "mp4a", "protocol": "m3u8_native"}
        ]));
        assert_eq!(direct_id(&meta, Some("hls-1080")), "18");
    }

    #[test]
    fn test_combined_ranked_by_height_times_fps_then_bitrate() {
        let meta = metadata(json!([
            {"format_id": "a", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 720, "fps": 30, "tbr": 900},
            {"format_id": "b", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 720, "fps": 60, "tbr": 100},
            {"format_id": "c", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 1440, "fps": 30, "tbr": 500},
            {"format_id": "d", "url": "u", "vcodec": "avc1", "acodec": "none", "height": 2160, "fps": 60, "tbr": 9000}
        ]));
        // b and c tie on 43200, c has the higher bitrate
        assert_eq!(direct_id(&meta, None), "c");
    }

    #[test]
    fn test_equal_rank_keeps_provider_order() {
        let meta = metadata(json!([
            {"format_id": "first", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 360, "fps": 30, "tbr": 500},
            {"format_id": "second", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 360, "fps": 30, "tbr": 500}
        ]));
        assert_eq!(direct_id(&meta, None), "first");
    }

    #[test]
    fn test_canonical_fallback_without_combined() {
        let meta = metadata(json!([
            {"format_id": "137", "url": "u", "vcodec": "avc1", "acodec": "none", "height": 1080},
            {"format_id": "18", "url": "u", "vcodec": "avc1", "acodec": "none", "height": 360}
        ]));
        assert_eq!(direct_id(&meta, None), "18");
    }

    #[test]
    fn test_first_candidate_as_last_resort() {
        let meta = metadata(json!([
            {"format_id": "sb0", "url": "u", "vcodec": "none", "format_note": "storyboard"},
            {"format_id": "248", "url": "u", "vcodec": "vp9", "acodec": "none", "height": 1080},
            {"format_id": "137", "url": "u", "vcodec": "avc1", "acodec": "none", "height": 1080}
        ]));
        assert_eq!(direct_id(&meta, None), "248");
    }

    #[test]
    fn test_audio_only_and_urlless_formats_are_excluded() {
        let meta = metadata(json!([
            {"format_id": "140", "url": "u", "vcodec": "none", "acodec": "mp4a"},
            {"format_id": "18", "vcodec": "avc1", "acodec": "mp4a"}
        ]));
        let err = FormatSelector::select_direct(&meta, Some("140")).unwrap_err();
        assert!(matches!(err, GatewayError::StreamingOnly { .. }));
    }

    #[test]
    fn test_progressive_format_without_codec_fields_is_direct() {
        let meta = metadata(json!([
            {"format_id": "mp4", "ext": "mp4", "protocol": "https", "url": "https://cdn.example.com/clip.mp4"}
        ]));
        assert_eq!(direct_id(&meta, None), "mp4");
    }

    #[test]
    fn test_unknown_codecs_rank_alongside_combined() {
        let meta = metadata(json!([
            {"format_id": "generic", "url": "https://cdn/a.mp4", "height": 240, "fps": 25},
            {"format_id": "18", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 360, "fps": 25}
        ]));
        assert_eq!(direct_id(&meta, None), "18");
    }

    #[test]
    fn test_all_segmented_is_streaming_only_with_capped_list() {
        let formats: Vec<serde_json::Value> = (0..14)
            .map(|i| {
                json!({
                    "format_id": format!("hls-{}", i),
                    "url": format!("https://cdn/{}.m3u8", i),
                    "vcodec": "avc1",
                    "acodec": "mp4a",
                    "protocol": "m3u8_native"
                })
            })
            .collect();
        let meta = metadata(serde_json::Value::Array(formats));

        match FormatSelector::select(&meta, None, ResolutionIntent::DirectUrl) {
            Err(GatewayError::StreamingOnly { available }) => {
                assert_eq!(available.len(), MAX_LISTED_FORMATS);
                assert_eq!(available[0].format_id, "hls-0");
                assert_eq!(available[9].format_id, "hls-9");
            }
            other => panic!("expected StreamingOnly, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_format_list_is_streaming_only() {
        let meta = metadata(json!([]));
        match FormatSelector::select_direct(&meta, None) {
            Err(GatewayError::StreamingOnly { available }) => assert!(available.is_empty()),
            other => panic!("expected StreamingOnly, got {:?}", other),
        }
    }

    #[test]
    fn test_selection_never_mutates_formats() {
        let meta = metadata(json!([
            {"format_id": "a", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 360, "fps": 30},
            {"format_id": "b", "url": "u", "vcodec": "avc1", "acodec": "mp4a", "height": 720, "fps": 30}
        ]));
        let _ = FormatSelector::select_direct(&meta, None).unwrap();
        let ids: Vec<&str> = meta.formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
