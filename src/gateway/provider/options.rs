// Typed provider options, serialized to yt-dlp flags only at the boundary

use std::path::PathBuf;

use crate::config::GatewayConfig;

/// Playlist handling for a provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistMode {
    /// Resolve only the single item behind the URL
    #[default]
    Single,
    /// Walk the playlist up to `end` entries
    Scan { end: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    pub proxy: Option<String>,
    pub cookies_path: Option<PathBuf>,
    /// Format expression (single id or fallback chain)
    pub format: Option<String>,
    /// Output file for transfers
    pub destination: Option<PathBuf>,
    pub playlist: PlaylistMode,
    /// Skip broken playlist entries instead of aborting
    pub ignore_errors: bool,
    pub concurrent_fragments: u32,
    pub retries: u32,
    pub fragment_retries: u32,
    pub http_chunk_size: String,
    pub socket_timeout_secs: u32,
    pub no_cache_dir: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

impl ProviderOptions {
    /// Transport options shared by every call
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            proxy: config.proxy_url.clone(),
            cookies_path: config.existing_cookies().map(|p| p.to_path_buf()),
            format: None,
            destination: None,
            playlist: PlaylistMode::Single,
            ignore_errors: false,
            concurrent_fragments: config.concurrent_fragments,
            retries: config.retries,
            fragment_retries: config.fragment_retries,
            http_chunk_size: config.http_chunk_size.clone(),
            socket_timeout_secs: config.socket_timeout_secs,
            no_cache_dir: true,
        }
    }

    /// Metadata only, single item
    pub fn for_resolve(mut self) -> Self {
        self.playlist = PlaylistMode::Single;
        self
    }

    /// Metadata for a playlist, scanning at least `limit` entries
    pub fn for_playlist(mut self, limit: usize, scan_limit: usize) -> Self {
        self.playlist = PlaylistMode::Scan {
            end: limit.max(scan_limit),
        };
        self.ignore_errors = true;
        self
    }

    /// Transfer using `format` into `destination`
    pub fn for_download(mut self, format: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        self.playlist = PlaylistMode::Single;
        self.format = Some(format.into());
        self.destination = Some(destination.into());
        self
    }

    /// yt-dlp command-line flags (URL not included)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
            "--retries".to_string(),
            self.retries.to_string(),
        ];

        if self.no_cache_dir {
            args.push("--no-cache-dir".to_string());
        }

        match self.playlist {
            PlaylistMode::Single => args.push("--no-playlist".to_string()),
            PlaylistMode::Scan { end } => {
                args.push("--yes-playlist".to_string());
                args.push("--playlist-end".to_string());
                args.push(end.to_string());
            }
        }

        if self.ignore_errors {
            args.push("--ignore-errors".to_string());
        }

        // Cookies
        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        // Proxy
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        if let Some(format) = &self.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }

        if let Some(destination) = &self.destination {
            args.extend([
                "-o".to_string(),
                destination.to_string_lossy().to_string(),
                "--concurrent-fragments".to_string(),
                self.concurrent_fragments.to_string(),
                "--fragment-retries".to_string(),
                self.fragment_retries.to_string(),
                "--http-chunk-size".to_string(),
                self.http_chunk_size.clone(),
            ]);
        }

        args
    }
}
