use once_cell::sync::Lazy;
use regex::Regex;
use rtex_extractor_api::manifest::{extract_f4m_formats, extract_m3u8_formats};
use rtex_extractor_api::scrape::unescape_html;
use rtex_extractor_api::url::Url;
use rtex_extractor_api::{
    async_trait, millis_to_seconds, Extraction, ExtractionContext, ExtractorInfo, MediaFormat,
    MediaMetadata, NewExtractor, RecordingExtractor, Required, Result, URLMatcher,
};
use tracing::{debug, warn};

use crate::common::{join_server, match_id};
use crate::types::Feed;

// Radioplayer URLs have the specifier #!rii=<channel_id>:<id>:<playable_item_id>:<date>:
// where the IDs are int/empty, the date is DD-MM-YYYY, and the specifier may be truncated.
// Only <id> matters, it alone identifies a recording.
static VALID_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?rte\.ie/radio/utils/radioplayer/rteradioweb\.html#!rii=(?:[0-9]*)(?:%3A|:)(?P<id>[0-9]+)").unwrap()
});

const FEED_ENDPOINT: &str = "http://www.rte.ie/rteavgen/getplaylist/";

/// RTÉ Radio player recordings.
pub struct RteRadioRE {}

impl NewExtractor for RteRadioRE {
    fn new() -> Self {
        RteRadioRE {}
    }
}

impl ExtractorInfo for RteRadioRE {
    fn ie_name(&self) -> &'static str {
        "rte:radio"
    }

    fn ie_description(&self) -> &'static str {
        "Raidió Teilifís Éireann radio"
    }
}

impl URLMatcher for RteRadioRE {
    fn match_extractor(&self, url: &Url) -> bool {
        VALID_URL.is_match(url.as_str())
    }
}

fn feed_url(item_id: &str) -> String {
    format!("{FEED_ENDPOINT}?type=web&format=json&id={item_id}")
}

#[async_trait]
impl RecordingExtractor for RteRadioRE {
    async fn extract_recording(&self, ctx: &ExtractionContext, url: &Url) -> Result<Extraction> {
        let item_id = match_id(&VALID_URL, url)?;
        debug!(ie = self.ie_name(), id = %item_id, "extracting");

        let feed: Feed = ctx.get_json("feed", &feed_url(&item_id)).await?;
        let show = feed.shows.first().required("show")?;

        let metadata = MediaMetadata {
            title: unescape_html(show.title.as_deref()).required("title")?,
            description: unescape_html(show.description.as_deref()),
            thumbnail: show.thumbnail.clone(),
            duration: millis_to_seconds(&show.duration),
            id: item_id,
        };

        let mg = show.media_group.first().required("media group")?;

        let mut formats = vec![];

        // rtmpe is not something we can hand out as a plain URL
        if let Some(direct) = mg.url.as_deref().filter(|u| !u.is_empty()) {
            if !direct.starts_with("rtmpe:") {
                formats.push(MediaFormat::from_url(direct));
            }
        }

        if let Some((server, path)) = mg.hls_location() {
            let hls_url = join_server(server, path);
            match extract_m3u8_formats(ctx, &hls_url, &metadata.id, "mp4", Some("hls")).await {
                Ok(hls_formats) => formats.extend(hls_formats),
                Err(e) => warn!(id = %metadata.id, error = %e, "skipping HLS formats"),
            }
        }

        // HDS here is flaky, it must not take the other formats down with it
        if let Some((server, path)) = mg.hds_location() {
            let f4m_url = join_server(server, path);
            match extract_f4m_formats(ctx, &f4m_url, &metadata.id, Some("hds")).await {
                Ok(f4m_formats) => formats.extend(f4m_formats),
                Err(e) => warn!(id = %metadata.id, error = %e, "skipping HDS formats"),
            }
        }

        Ok(Extraction { metadata, formats })
    }
}
