// Gateway configuration
//
// Read once at startup (env vars, optionally a .env file) and shared read-only
// afterwards. Nothing below this module touches the process environment.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// .env mounted from object storage in production
pub const PRODUCTION_ENV_FILE: &str = "/function/storage/env/.env";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Where downloaded files are written
    pub fn default_storage_path(&self) -> PathBuf {
        match self {
            Self::Development => PathBuf::from("./downloads"),
            Self::Production => PathBuf::from("/function/storage/storage"),
        }
    }

    /// Directory holding cookies.txt
    pub fn default_env_dir(&self) -> PathBuf {
        match self {
            Self::Development => PathBuf::from("."),
            Self::Production => PathBuf::from("/function/storage/env"),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Immutable gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    /// Bucket the storage mount belongs to, used in public URLs
    pub bucket_name: String,
    /// HTTP/SOCKS proxy for the provider
    pub proxy_url: Option<String>,
    pub storage_path: PathBuf,
    /// Path to cookies.txt (only used when the file exists)
    pub cookies_path: PathBuf,
    /// yt-dlp binary
    pub ytdlp_bin: String,
    pub concurrent_fragments: u32,
    pub retries: u32,
    pub fragment_retries: u32,
    /// Chunk size for HTTP downloads (e.g., "10M")
    pub http_chunk_size: String,
    /// Minimum number of playlist entries scanned for /playlist
    pub playlist_scan_limit: usize,
    pub socket_timeout_secs: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            environment,
            bucket_name: String::new(),
            proxy_url: None,
            storage_path: environment.default_storage_path(),
            cookies_path: environment.default_env_dir().join("cookies.txt"),
            ytdlp_bin: "yt-dlp".to_string(),
            concurrent_fragments: 4,
            retries: 10,
            fragment_retries: 10,
            http_chunk_size: "10M".to_string(),
            playlist_scan_limit: 50,
            socket_timeout_secs: 30,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match non_empty_var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={}", key, raw);
            default
        }),
        None => default,
    }
}

/// Report the outcome of a .env load. A missing file is normal and stays
/// quiet; a file that exists but does not parse is logged.
fn report_env_load<T>(source: &str, result: dotenvy::Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.not_found() => false,
        Err(e) => {
            warn!("Failed to load {}: {}", source, e);
            false
        }
    }
}

impl GatewayConfig {
    /// Load .env (production mount first, then local) and build from env vars
    pub fn load() -> Self {
        if Path::new(PRODUCTION_ENV_FILE).exists() {
            info!("Loading env from {}", PRODUCTION_ENV_FILE);
            report_env_load(PRODUCTION_ENV_FILE, dotenvy::from_path(PRODUCTION_ENV_FILE));
        } else {
            report_env_load("local .env", dotenvy::dotenv());
        }

        Self::from_env()
    }

    /// Build from the current process environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let environment = non_empty_var("ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        Self {
            environment,
            bucket_name: non_empty_var("BUCKET_NAME").unwrap_or_default(),
            proxy_url: non_empty_var("PROXY_URL"),
            storage_path: non_empty_var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| environment.default_storage_path()),
            cookies_path: non_empty_var("COOKIES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| environment.default_env_dir().join("cookies.txt")),
            ytdlp_bin: non_empty_var("YTDL_BIN").unwrap_or(defaults.ytdlp_bin),
            concurrent_fragments: parsed_var("CONCURRENT_FRAGMENTS", defaults.concurrent_fragments),
            retries: parsed_var("RETRIES", defaults.retries),
            fragment_retries: parsed_var("FRAGMENT_RETRIES", defaults.fragment_retries),
            http_chunk_size: non_empty_var("HTTP_CHUNK_SIZE").unwrap_or(defaults.http_chunk_size),
            playlist_scan_limit: parsed_var("PLAYLIST_SCAN_LIMIT", defaults.playlist_scan_limit),
            socket_timeout_secs: parsed_var("SOCKET_TIMEOUT", defaults.socket_timeout_secs),
        }
    }

    /// Cookie file, if one is actually present
    pub fn existing_cookies(&self) -> Option<&Path> {
        let path = self.cookies_path.as_path();
        path.is_file().then_some(path)
    }

    pub fn with_bucket_name(mut self, bucket: impl Into<String>) -> Self {
        self.bucket_name = bucket.into();
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy_url = proxy;
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_cookies_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookies_path = path.into();
        self
    }

    pub fn with_playlist_scan_limit(mut self, limit: usize) -> Self {
        self.playlist_scan_limit = limit;
        self
    }

    /// Startup summary, secrets left out
    pub fn log_summary(&self) {
        info!("ENV {}", self.environment);
        info!("BUCKET_NAME {}", self.bucket_name);
        info!("STORAGE_PATH {}", self.storage_path.display());
        info!("PROXY {}", if self.proxy_url.is_some() { "configured" } else { "none" });
        match self.existing_cookies() {
            Some(path) => info!("COOKIES {}", path.display()),
            None => warn!("No cookies file at {}", self.cookies_path.display()),
        }
    }
}
