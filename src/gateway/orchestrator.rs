// Download orchestrator - server-side transfer into the storage mount
//
// Picks a unique file name, hands the fallback chain to the provider and
// builds the public URL. Placing the bytes behind that URL is the storage
// mount's job. No retries here: the provider's retry options cover that.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::errors::GatewayError;
use super::format_selector::FormatSelector;
use super::provider::ProviderOptions;
use super::traits::MediaProvider;
use crate::config::GatewayConfig;

/// Object storage endpoint the bucket is served from
pub const STORAGE_BASE_URL: &str = "https://storage.yandexcloud.net";

const VIDEO_CONTAINER: &str = "mp4";
const AUDIO_CONTAINER: &str = "m4a";

/// YouTube audio-only format ids (AAC, Opus, xHE-AAC)
const AUDIO_FORMAT_IDS: [&str; 10] = [
    "139", "140", "141", "171", "172", "249", "250", "251", "599", "600",
];

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMedia {
    #[serde(rename = "url")]
    pub public_url: String,
    #[serde(skip)]
    pub file_name: String,
}

pub struct DownloadOrchestrator {
    provider: Arc<dyn MediaProvider>,
    config: Arc<GatewayConfig>,
}

impl DownloadOrchestrator {
    pub fn new(provider: Arc<dyn MediaProvider>, config: Arc<GatewayConfig>) -> Self {
        Self { provider, config }
    }

    pub async fn download_to_storage(
        &self,
        url: &str,
        requested_format_id: Option<&str>,
    ) -> Result<StoredMedia, GatewayError> {
        let file_name = Self::file_name(requested_format_id);
        let destination = self.config.storage_path.join(&file_name);
        let chain = FormatSelector::download_chain(requested_format_id);

        let options = ProviderOptions::from_config(&self.config).for_download(chain, &destination);

        info!(
            provider = self.provider.name(),
            destination = %destination.display(),
            "Starting downloading..."
        );
        self.provider.download(url, &options).await?;

        let public_url = self.public_url(&file_name);
        info!("Stored {} at {}", url, public_url);

        Ok(StoredMedia {
            public_url,
            file_name,
        })
    }

    /// `<base>/<bucket>/<file>`; not checked against storage
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            STORAGE_BASE_URL, self.config.bucket_name, file_name
        )
    }

    /// Random v4 UUID name with a container matching the request
    pub fn file_name(requested_format_id: Option<&str>) -> String {
        let ext = if requested_format_id.map_or(false, is_audio_only_request) {
            AUDIO_CONTAINER
        } else {
            VIDEO_CONTAINER
        };
        format!("{}.{}", Uuid::new_v4(), ext)
    }
}

/// Check if a format request denotes audio without video
pub fn is_audio_only_request(format: &str) -> bool {
    let format = format.trim().to_lowercase();
    AUDIO_FORMAT_IDS.contains(&format.as_str())
        || format == "ba"
        || format == "wa"
        || format.starts_with("ba[")
        || format.starts_with("wa[")
        || format.starts_with("bestaudio")
        || format.starts_with("worstaudio")
}
