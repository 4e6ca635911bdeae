// Playlist curation - newest dated entries first, bounded by a limit

use tracing::debug;

use super::models::{MediaMetadata, PlaylistEntry};

/// Default number of entries returned when the caller gives no limit
pub const DEFAULT_PLAYLIST_LIMIT: usize = 5;

pub struct PlaylistCurator;

impl PlaylistCurator {
    /// Return at most `limit` entries ordered by upload date, newest first.
    ///
    /// Missing entries and entries without an upload date are dropped. Dates
    /// are fixed-width `YYYYMMDD`, so string order is date order; the sort is
    /// stable, so entries sharing a date keep their playlist order.
    pub fn curate(metadata: &MediaMetadata, limit: usize) -> Vec<PlaylistEntry> {
        let mut dated: Vec<&MediaMetadata> = metadata
            .entries
            .iter()
            .flatten()
            .flatten()
            .filter(|e| e.upload_date.as_deref().map_or(false, |d| !d.is_empty()))
            .collect();

        dated.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));

        debug!(
            "Curating {} dated entries down to {}",
            dated.len(),
            limit.min(dated.len())
        );

        dated
            .into_iter()
            .take(limit)
            .map(PlaylistEntry::from)
            .collect()
    }
}
