use nipper::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use rtex_extractor_api::manifest::extract_f4m_formats;
use rtex_extractor_api::scrape::{html_search_meta, og_search_title, search_regex};
use rtex_extractor_api::url::Url;
use rtex_extractor_api::{
    async_trait, millis_str_to_seconds, Extraction, ExtractionContext, ExtractorInfo,
    MediaMetadata, NewExtractor, RecordingExtractor, Required, Result, URLMatcher,
};
use tracing::debug;

use crate::common::{join_server, match_id};
use crate::types::Feed;

static VALID_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?rte\.ie/player/[^/]{2,3}/show/[^/]+/(?P<id>[0-9]+)").unwrap()
});

static THUMBNAIL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta name="thumbnail" content="uri:irus:(.*?)" />"#).unwrap());

const THUMBNAIL_BASE: &str = "http://img.rasset.ie/";

/// RTÉ Player shows.
pub struct RteRE {}

impl NewExtractor for RteRE {
    fn new() -> Self {
        RteRE {}
    }
}

impl ExtractorInfo for RteRE {
    fn ie_name(&self) -> &'static str {
        "rte"
    }

    fn ie_description(&self) -> &'static str {
        "Raidió Teilifís Éireann TV"
    }
}

impl URLMatcher for RteRE {
    fn match_extractor(&self, url: &Url) -> bool {
        VALID_URL.is_match(url.as_str())
    }
}

struct PlayerPage {
    title: String,
    description: Option<String>,
    duration: Option<f64>,
    thumbnail_id: String,
    feeds_prefix: String,
}

// must be a separate non-async function for nipper reasons
fn scrape_player_page(webpage: &str) -> Result<PlayerPage> {
    let document = Document::from(webpage);
    Ok(PlayerPage {
        title: og_search_title(&document).required("title")?,
        description: html_search_meta(&document, "description").filter(|d| !d.is_empty()),
        duration: html_search_meta(&document, "duration")
            .as_deref()
            .and_then(millis_str_to_seconds),
        thumbnail_id: search_regex(&THUMBNAIL_ID, webpage).required("thumbnail")?,
        feeds_prefix: html_search_meta(&document, "feeds-prefix").required("feeds url")?,
    })
}

#[async_trait]
impl RecordingExtractor for RteRE {
    async fn extract_recording(&self, ctx: &ExtractionContext, url: &Url) -> Result<Extraction> {
        let video_id = match_id(&VALID_URL, url)?;
        debug!(ie = self.ie_name(), id = %video_id, "extracting");

        let webpage = ctx.get_body("webpage", url.as_str()).await?;
        let page = scrape_player_page(&webpage)?;

        let feed: Feed = ctx
            .get_json("feed", &format!("{}{}", page.feeds_prefix, video_id))
            .await?;
        let media = feed
            .shows
            .first()
            .required("show")?
            .media_group
            .first()
            .required("media group")?;
        let f4m_url = join_server(
            media.rte_server.as_deref().required("rte:server")?,
            media.url.as_deref().required("media url")?,
        );
        let formats = extract_f4m_formats(ctx, &f4m_url, &video_id, None).await?;

        Ok(Extraction {
            metadata: MediaMetadata {
                id: video_id,
                title: page.title,
                description: page.description,
                thumbnail: Some(format!("{THUMBNAIL_BASE}{}.jpg", page.thumbnail_id)),
                duration: page.duration,
            },
            formats,
        })
    }
}
