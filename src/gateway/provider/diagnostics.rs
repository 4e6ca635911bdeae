// Provider failure diagnostics
//
// Classifies yt-dlp error output so the gateway can tell "no media behind this
// URL" apart from transient or access failures.

use crate::gateway::errors::GatewayError;

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// URL unsupported, media deleted or never existed
    MediaNotFound,

    /// Private video requiring authorization
    PrivateVideo,

    /// Sign-in, age gate or members-only
    AuthRequired,

    /// Geographic restriction
    GeoBlocked,

    /// HTTP 429 or bot detection
    RateLimited,

    /// HTTP 403 Forbidden
    AccessDenied,

    /// Network timeout
    NetworkTimeout,

    /// Generic/unknown failure
    Unknown,
}

impl FailureKind {
    /// Provider says there is nothing at this URL
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MediaNotFound)
    }

    /// Check if a proxy might help
    pub fn proxy_might_help(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::GeoBlocked | Self::NetworkTimeout | Self::RateLimited
        )
    }

    /// Check if cookies might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::AuthRequired | Self::PrivateVideo | Self::RateLimited
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MediaNotFound => "Media not found",
            Self::PrivateVideo => "Private video",
            Self::AuthRequired => "Authentication required",
            Self::GeoBlocked => "Geographic restriction",
            Self::RateLimited => "Rate limited by the source",
            Self::AccessDenied => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown provider failure",
        }
    }
}

/// Classify a provider error message
pub fn classify(error: &str) -> FailureKind {
    let lower = error.to_lowercase();

    if lower.contains("unsupported url")
        || lower.contains("video unavailable")
        || lower.contains("this video is unavailable")
        || lower.contains("does not exist")
        || lower.contains("no video formats found")
        || lower.contains("http error 404")
        || lower.contains("has been removed")
    {
        return FailureKind::MediaNotFound;
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return FailureKind::PrivateVideo;
    }

    if lower.contains("sign in to confirm your age")
        || lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("login required")
    {
        return FailureKind::AuthRequired;
    }

    if lower.contains("not available in your country") || lower.contains("geo restrict") {
        return FailureKind::GeoBlocked;
    }

    if lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("confirm you're not a bot")
        || lower.contains("confirm you’re not a bot")
    {
        return FailureKind::RateLimited;
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return FailureKind::AccessDenied;
    }

    if lower.contains("timed out") || lower.contains("timeout") {
        return FailureKind::NetworkTimeout;
    }

    FailureKind::Unknown
}

/// Turn raw provider stderr into a gateway error, keeping the message
pub fn to_gateway_error(stderr: &str) -> GatewayError {
    let message = last_error_line(stderr);
    if classify(&message).is_not_found() {
        GatewayError::NotFound(message)
    } else {
        GatewayError::Upstream(message)
    }
}

/// Last `ERROR:` line, or the whole trimmed output when there is none
fn last_error_line(stderr: &str) -> String {
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with("ERROR:"))
        .unwrap_or(stderr)
        .trim();

    if line.is_empty() {
        "Provider exited with an error and no output".to_string()
    } else {
        line.to_string()
    }
}
