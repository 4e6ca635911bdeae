// CLI provider - drives the native `yt-dlp` binary
//
// resolve:  yt-dlp --dump-single-json <flags> <url>
// download: yt-dlp -f <chain> -o <destination> <flags> <url>

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::diagnostics::{classify, to_gateway_error};
use super::options::ProviderOptions;
use crate::gateway::errors::GatewayError;
use crate::gateway::traits::MediaProvider;
use crate::gateway::utils::run_output;

/// yt-dlp binary provider
pub struct YtDlpCli {
    ytdlp_path: String,
}

impl YtDlpCli {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    fn resolve_args(url: &str, options: &ProviderOptions) -> Vec<String> {
        let mut args = vec!["--dump-single-json".to_string()];
        args.extend(options.to_args());
        args.push(url.to_string());
        args
    }

    fn download_args(url: &str, options: &ProviderOptions) -> Vec<String> {
        let mut args = vec!["--newline".to_string(), "--no-progress".to_string()];
        args.extend(options.to_args());
        args.push(url.to_string());
        args
    }

    /// Parse --dump-single-json output. A `null` document means nothing was
    /// extracted (all entries failed under --ignore-errors).
    fn parse_json(stdout: &[u8]) -> Result<serde_json::Value, GatewayError> {
        let json_str = String::from_utf8_lossy(stdout);
        let json: serde_json::Value = serde_json::from_str(json_str.trim())?;

        if json.is_null() {
            return Err(GatewayError::NotFound("No media found for URL".to_string()));
        }
        Ok(json)
    }

    fn failure(&self, stderr: &[u8]) -> GatewayError {
        let stderr = String::from_utf8_lossy(stderr);
        let kind = classify(&stderr);
        warn!(
            provider = self.name(),
            reason = kind.description(),
            proxy_might_help = kind.proxy_might_help(),
            cookies_might_help = kind.cookies_might_help(),
            "Provider call failed"
        );
        to_gateway_error(&stderr)
    }
}

impl Default for YtDlpCli {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MediaProvider for YtDlpCli {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn resolve(
        &self,
        url: &str,
        options: &ProviderOptions,
    ) -> Result<serde_json::Value, GatewayError> {
        let args = Self::resolve_args(url, options);
        debug!("Resolving with {} {}", self.ytdlp_path, args.join(" "));

        let out = run_output(&self.ytdlp_path, &args).await?;

        // With --ignore-errors yt-dlp may exit non-zero yet still print the
        // playlist document; prefer the document when there is one
        if !out.status.success() && out.stdout.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(self.failure(&out.stderr));
        }

        Self::parse_json(&out.stdout)
    }

    async fn download(&self, url: &str, options: &ProviderOptions) -> Result<(), GatewayError> {
        let args = Self::download_args(url, options);
        info!("Starting download: {}", url);
        debug!("Downloading with {} {}", self.ytdlp_path, args.join(" "));

        let out = run_output(&self.ytdlp_path, &args).await?;

        if !out.status.success() {
            return Err(self.failure(&out.stderr));
        }

        info!("Download finished: {}", url);
        Ok(())
    }
}
