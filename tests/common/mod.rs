//! Shared test fixtures: an in-memory provider and dispatcher builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use media_gateway::config::GatewayConfig;
use media_gateway::dispatcher::Dispatcher;
use media_gateway::gateway::{GatewayError, MediaProvider, ProviderOptions};
use serde_json::{json, Value};

/// What the mock provider answers
pub enum Reply {
    Metadata(Value),
    Fail(fn() -> GatewayError),
}

/// Provider returning canned metadata and recording every call
pub struct MockProvider {
    resolve_reply: Reply,
    download_reply: Option<fn() -> GatewayError>,
    pub resolves: Mutex<Vec<(String, ProviderOptions)>>,
    pub downloads: Mutex<Vec<(String, ProviderOptions)>>,
}

impl MockProvider {
    pub fn with_metadata(metadata: Value) -> Self {
        Self {
            resolve_reply: Reply::Metadata(metadata),
            download_reply: None,
            resolves: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> GatewayError) -> Self {
        Self {
            resolve_reply: Reply::Fail(error),
            download_reply: Some(error),
            ..Self::with_metadata(Value::Null)
        }
    }

    pub fn resolve_count(&self) -> usize {
        self.resolves.lock().unwrap().len()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn resolve(&self, url: &str, options: &ProviderOptions) -> Result<Value, GatewayError> {
        self.resolves
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));
        match &self.resolve_reply {
            Reply::Metadata(v) => Ok(v.clone()),
            Reply::Fail(make) => Err(make()),
        }
    }

    async fn download(&self, url: &str, options: &ProviderOptions) -> Result<(), GatewayError> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));
        match self.download_reply {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_bucket_name("test-bucket")
        .with_storage_path("/tmp/media-gateway-test")
        .with_cookies_path("/nonexistent/cookies.txt")
}

pub fn dispatcher(provider: Arc<MockProvider>) -> Dispatcher {
    Dispatcher::new(provider, Arc::new(test_config()))
}

/// Single video with one progressive and one HLS format
pub fn video_metadata() -> Value {
    json!({
        "id": "dQw4w9WgXcQ",
        "title": "Sample video",
        "duration": 212,
        "uploader": "Uploader",
        "upload_date": "20091025",
        "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "formats": [
            {
                "format_id": "sb0", "ext": "mhtml", "protocol": "mhtml",
                "vcodec": "none", "acodec": "none", "format_note": "storyboard",
                "url": "https://i.ytimg.com/sb/0.jpg"
            },
            {
                "format_id": "18", "ext": "mp4", "protocol": "https",
                "vcodec": "avc1.42001E", "acodec": "mp4a.40.2",
                "width": 640, "height": 360, "fps": 25, "tbr": 500.5,
                "filesize": 15_000_000, "format_note": "360p",
                "url": "https://rr1.googlevideo.com/videoplayback?expire=4102444800&itag=18"
            },
            {
                "format_id": "22", "ext": "mp4", "protocol": "https",
                "vcodec": "avc1.64001F", "acodec": "none",
                "width": 1280, "height": 720, "fps": 25,
                "url": "https://rr1.googlevideo.com/videoplayback?itag=22"
            },
            {
                "format_id": "hls-1080", "ext": "mp4", "protocol": "m3u8_native",
                "vcodec": "avc1.640028", "acodec": "mp4a.40.2",
                "width": 1920, "height": 1080, "fps": 30,
                "url": "https://manifest.googlevideo.com/api/manifest/hls_playlist/index.m3u8"
            }
        ]
    })
}

/// Video available only as HLS variants
pub fn streaming_only_metadata(variants: usize) -> Value {
    let formats: Vec<Value> = (0..variants)
        .map(|i| {
            json!({
                "format_id": format!("hls-{}", i),
                "ext": "mp4",
                "protocol": "m3u8_native",
                "vcodec": "avc1",
                "acodec": "mp4a",
                "url": format!("https://live.example.com/{}.m3u8", i)
            })
        })
        .collect();
    json!({ "id": "live", "title": "Live stream", "formats": formats })
}

pub fn playlist_metadata() -> Value {
    json!({
        "id": "PL123",
        "title": "Channel uploads",
        "entries": [
            {"id": "a", "title": "A", "upload_date": "20230101", "webpage_url": "https://v/a", "uploader": "U", "duration": 10},
            {"id": "b", "title": "B", "upload_date": "20240505", "webpage_url": "https://v/b", "uploader": "U", "duration": 20},
            {"id": "c", "title": "C", "upload_date": "20220101", "webpage_url": "https://v/c", "uploader": "U", "duration": 30},
            {"id": "d", "title": "D", "upload_date": null},
            null,
            {"id": "e", "title": "E", "upload_date": "20240505", "webpage_url": "https://v/e", "uploader": "U", "duration": 50}
        ]
    })
}
