use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The URL does not have the shape any extractor recognizes, or the id can't be found in it.
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// A mandatory scrape or lookup came back empty.
    #[error("unable to extract {0}")]
    MissingField(&'static str),

    #[error("unable to download {resource}: {source}")]
    Network {
        resource: String,
        #[source]
        source: BoxError,
    },

    #[error("unable to parse {resource} as JSON: {source}")]
    Json {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad {kind} manifest at {url}: {reason}")]
    Manifest {
        kind: &'static str,
        url: String,
        reason: String,
    },

    #[error("could not build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T, E = ExtractionError> = std::result::Result<T, E>;

/// Turns a lookup that came back empty into [`ExtractionError::MissingField`].
///
/// Optional lookups just stay `Option`, only the mandatory ones go through this.
pub trait Required<T> {
    fn required(self, field: &'static str) -> Result<T>;
}

impl<T> Required<T> for Option<T> {
    fn required(self, field: &'static str) -> Result<T> {
        self.ok_or(ExtractionError::MissingField(field))
    }
}
