//! Request dispatcher.
//!
//! Merges request parameters, routes to one of the four operations and is the
//! only place where a [`GatewayError`] becomes an HTTP status code.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::gateway::playlist::DEFAULT_PLAYLIST_LIMIT;
use crate::gateway::{
    DirectLink, DownloadOrchestrator, ErrorKind, FormatSelector, GatewayError, MediaMetadata,
    MediaProvider, PlaylistCurator, ProviderOptions, ResolutionIntent, Selection,
};

/// Framework-independent view of an incoming request
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub path: String,
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn get(path: impl Into<String>, query: &[(&str, &str)]) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, query: &[(&str, &str)], body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            body: Some(body.into()),
            ..Self::get(path, query)
        }
    }
}

/// Status, JSON body and extra headers
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: Value,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl GatewayResponse {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            headers: Vec::new(),
        }
    }

    fn ok_json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            headers: vec![(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
        }
    }

    fn error(error: GatewayError) -> Self {
        let status = status_for(error.kind());
        let message = error.to_string();

        if status.is_server_error() {
            warn!("Request failed: {}", message);
        } else {
            info!("Request rejected ({}): {}", status.as_u16(), message);
        }

        let body = match error {
            GatewayError::StreamingOnly { available } => json!({
                "error": message,
                "reason": "streaming_only",
                "available_formats": available,
            }),
            _ => json!({ "error": message }),
        };
        Self::new(status, body)
    }
}

/// Status code for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::StreamingOnly => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NoDirectUrl | ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Query parameters, overridden by JSON body fields on non-GET requests.
/// A body that is not a JSON object is ignored.
fn merge_params(request: &GatewayRequest) -> Map<String, Value> {
    let mut params: Map<String, Value> = request
        .query
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    if request.method != Method::GET {
        if let Some(raw) = request.body.as_deref() {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(fields)) => params.extend(fields),
                _ => info!("Ignoring unparseable request body"),
            }
        }
    }

    params
}

/// Non-empty parameter as text
fn param_str(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `limit` coerced to a non-negative integer. A value that cannot be used
/// is an internal failure of the request, not a missing parameter.
fn parse_limit(params: &Map<String, Value>) -> Result<usize, GatewayError> {
    let Some(raw) = param_str(params, "limit") else {
        return Ok(DEFAULT_PLAYLIST_LIMIT);
    };
    let raw = raw.trim();

    let limit = raw
        .parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        })
        .ok_or_else(|| GatewayError::InvalidParameter(format!("Invalid 'limit' parameter: {}", raw)))?;

    usize::try_from(limit).map_err(|_| {
        GatewayError::InvalidParameter(format!("'limit' must not be negative: {}", raw))
    })
}

pub struct Dispatcher {
    provider: Arc<dyn MediaProvider>,
    config: Arc<GatewayConfig>,
    orchestrator: DownloadOrchestrator,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn MediaProvider>, config: Arc<GatewayConfig>) -> Self {
        let orchestrator = DownloadOrchestrator::new(provider.clone(), config.clone());
        Self {
            provider,
            config,
            orchestrator,
        }
    }

    pub async fn dispatch(&self, request: GatewayRequest) -> GatewayResponse {
        let params = merge_params(&request);
        let path = request.path.as_str();

        let Some(url) = param_str(&params, "url") else {
            return GatewayResponse::error(GatewayError::missing_url());
        };
        let format = param_str(&params, "format");

        info!(path, method = %request.method, url = %url, "Dispatching");

        let result = match path {
            "/download" => self.download(&url, format.as_deref()).await,
            "/download-url" => self.direct_url(&url, format.as_deref()).await,
            "/info" => self.info(&url).await,
            "/playlist" => match parse_limit(&params) {
                Ok(limit) => self.playlist(&url, limit).await,
                Err(e) => Err(e),
            },
            _ => {
                return GatewayResponse::new(
                    StatusCode::NOT_FOUND,
                    json!({ "error": "Not found", "path": path }),
                )
            }
        };

        result.unwrap_or_else(GatewayResponse::error)
    }

    fn options(&self) -> ProviderOptions {
        ProviderOptions::from_config(&self.config)
    }

    async fn resolve_metadata(
        &self,
        url: &str,
        options: &ProviderOptions,
    ) -> Result<MediaMetadata, GatewayError> {
        let raw = self.provider.resolve(url, options).await?;
        Ok(MediaMetadata::from_value(&raw)?)
    }

    async fn download(&self, url: &str, format: Option<&str>) -> Result<GatewayResponse, GatewayError> {
        let stored = self.orchestrator.download_to_storage(url, format).await?;
        Ok(GatewayResponse::new(StatusCode::OK, serde_json::to_value(stored)?))
    }

    async fn direct_url(&self, url: &str, format: Option<&str>) -> Result<GatewayResponse, GatewayError> {
        let metadata = self
            .resolve_metadata(url, &self.options().for_resolve())
            .await?;

        let chosen = match FormatSelector::select(&metadata, format, ResolutionIntent::DirectUrl)? {
            Selection::Direct(chosen) => chosen,
            Selection::FallbackChain(chain) => return Err(GatewayError::NoDirectUrl(chain)),
        };
        let link_url = chosen
            .direct_url()
            .ok_or_else(|| GatewayError::NoDirectUrl(chosen.format_id.clone()))?;

        let link = DirectLink::new(&metadata, chosen, link_url);
        info!(
            format_id = %link.format_id,
            expires_in_hours = link.expires_in_hours,
            "Returning direct URL"
        );
        Ok(GatewayResponse::ok_json(serde_json::to_value(link)?))
    }

    async fn info(&self, url: &str) -> Result<GatewayResponse, GatewayError> {
        let raw = self
            .provider
            .resolve(url, &self.options().for_resolve())
            .await?;

        info!("Returning full video info...");
        Ok(GatewayResponse::ok_json(raw))
    }

    async fn playlist(&self, url: &str, limit: usize) -> Result<GatewayResponse, GatewayError> {
        let options = self
            .options()
            .for_playlist(limit, self.config.playlist_scan_limit);
        let metadata = self.resolve_metadata(url, &options).await?;

        let videos = PlaylistCurator::curate(&metadata, limit);
        info!("Returning {} playlist entries", videos.len());

        Ok(GatewayResponse::ok_json(json!({
            "playlist_id": metadata.id,
            "title": metadata.title,
            "entries_returned": videos.len(),
            "videos": videos,
        })))
    }
}
