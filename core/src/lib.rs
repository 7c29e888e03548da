use anyhow::Result;
use once_cell::sync::Lazy;
use rtex_extractor_api::url::Url;
pub use rtex_extractor_api::*;
use tracing::debug;

pub static DEFAULT_EXTRACTOR_LIST: Lazy<Vec<&AnyExtractor>> = Lazy::new(|| {
    let l = Vec::<&AnyExtractor>::new().into_iter();

    #[cfg(feature = "rte")]
    let l = l.chain(rtex_extractor_rte::EXTRACTORS.iter());

    l.collect()
});

pub struct CoreClient<'a> {
    extractors: Vec<&'a AnyExtractor>,
    context: ExtractionContext,
}

impl CoreClient<'_> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_context(ExtractionContext::new()?))
    }

    pub fn with_context(context: ExtractionContext) -> Self {
        CoreClient {
            extractors: DEFAULT_EXTRACTOR_LIST.to_vec(),
            context,
        }
    }

    /// (IE name, description) of every extractor, in matching order.
    pub fn list_extractors(&self) -> Vec<(&'static str, &'static str)> {
        self.extractors
            .iter()
            .map(|e| (e.ie_name(), e.ie_description()))
            .collect()
    }

    /// `None` if no extractor wants the URL.
    pub async fn extract_url(&self, url: &Url) -> Result<Option<Extraction>> {
        for extractor in &self.extractors {
            if extractor.match_extractor(url) {
                debug!(ie = extractor.ie_name(), %url, "matched");
                return extractor
                    .extract_info(&self.context, url)
                    .await
                    .map(Option::Some)
                    .map_err(anyhow::Error::from);
            }
        }
        Ok(None)
    }
}
