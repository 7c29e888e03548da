#[macro_use]
extern crate smart_default;

mod context;
mod error;

pub use context::{build_http, ContextConfig, ExtractionContext, Fetcher, HttpFetcher};
pub use error::{BoxError, ExtractionError, Required, Result};

pub mod manifest;
pub mod scrape;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use async_trait::async_trait;
pub use reqwest;
pub use url;

use serde::Serialize;
use url::Url;

pub trait NewExtractor {
    fn new() -> Self;
}

pub trait URLMatcher {
    fn match_extractor(&self, url: &Url) -> bool;
}

/// Names an extractor for listings and logs.
pub trait ExtractorInfo {
    /// Short identifier, like `rte:radio`.
    fn ie_name(&self) -> &'static str;
    fn ie_description(&self) -> &'static str;
}

#[async_trait]
pub trait RecordingExtractor: URLMatcher + ExtractorInfo + Sync + Send {
    async fn extract_recording(&self, ctx: &ExtractionContext, url: &Url) -> Result<Extraction>;
}

#[derive(Serialize, Default, PartialEq, Clone, Debug)]
pub struct Extraction {
    pub metadata: MediaMetadata,
    pub formats: Vec<MediaFormat>,
}

#[derive(Serialize, Default, PartialEq, Clone, Debug)]
pub struct MediaMetadata {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// In seconds.
    pub duration: Option<f64>,
}

#[derive(Serialize, SmartDefault, PartialEq, Clone, Debug)]
pub struct MediaFormat {
    pub id: Option<String>,
    pub url: String,
    pub protocol: FormatProtocol,
    /// The manifest this format was expanded from, if any
    pub manifest_url: Option<String>,
    pub ext: Option<String>,
    /// Total bitrate, kbit/s
    pub bitrate: Option<f64>,
    pub breed: FormatBreed,
    pub video_details: Option<VideoDetails>,
    pub audio_details: Option<AudioDetails>,
}

impl MediaFormat {
    /// A format that is nothing more than a URL to fetch.
    pub fn from_url<S: Into<String>>(url: S) -> Self {
        MediaFormat {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, SmartDefault, PartialEq, Eq, Clone, Copy, Debug)]
pub enum FormatProtocol {
    #[default]
    Http,
    /// HTTP Live Streaming (m3u8)
    Hls,
    /// Adobe HTTP Dynamic Streaming (f4m)
    Hds,
}

/// Format type
#[derive(Serialize, SmartDefault, PartialEq, Clone, Debug)]
pub enum FormatBreed {
    #[default]
    AudioVideo,
    Video,
    Audio,
}

#[derive(Serialize, SmartDefault, PartialEq, Clone, Debug)]
pub struct VideoDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
}

#[derive(Serialize, SmartDefault, PartialEq, Clone, Debug)]
pub struct AudioDetails {
    pub codec: Option<String>,
}

pub enum AnyExtractor {
    Recording(Box<dyn RecordingExtractor>),
}

impl AnyExtractor {
    pub async fn extract_info(&self, ctx: &ExtractionContext, url: &Url) -> Result<Extraction> {
        match self {
            AnyExtractor::Recording(re) => re.extract_recording(ctx, url).await,
        }
    }

    pub fn match_extractor(&self, url: &Url) -> bool {
        match self {
            AnyExtractor::Recording(re) => re.match_extractor(url),
        }
    }

    pub fn ie_name(&self) -> &'static str {
        match self {
            AnyExtractor::Recording(re) => re.ie_name(),
        }
    }

    pub fn ie_description(&self) -> &'static str {
        match self {
            AnyExtractor::Recording(re) => re.ie_description(),
        }
    }
}

/// Parses a millisecond count, as the RTÉ pages and feeds carry them, into seconds.
/// Anything that isn't a number gives `None`.
pub fn millis_to_seconds(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(|ms| ms / 1000.0),
        serde_json::Value::String(s) => millis_str_to_seconds(s),
        _ => None,
    }
}

pub fn millis_str_to_seconds(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite())
        .map(|ms| ms / 1000.0)
}
