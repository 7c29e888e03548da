use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use sys_locale::get_locale;
use tracing::debug;

use crate::error::{ExtractionError, Result};

/// Whatever gets the documents off the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `resource_name` is only used for logs and errors ("webpage", "feed", ...).
    async fn fetch_text(&self, resource_name: &str, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    pub client: reqwest::Client,
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, resource_name: &str, url: &str) -> Result<String> {
        let network = |e: reqwest::Error| ExtractionError::Network {
            resource: resource_name.to_string(),
            source: Box::new(e),
        };
        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(network)?
            .text()
            .await
            .map_err(network)
    }
}

#[derive(Deserialize, SmartDefault, Clone, Debug)]
#[serde(default)]
pub struct ContextConfig {
    /// Sent with every request, the CLI can replace it.
    #[default = "okhttp/4.9.3"]
    pub user_agent: String,
    /// Most wanted first. Empty means the system locale.
    pub locales: Vec<String>,
    pub proxy: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ContextConfig {
    pub fn from_env() -> Self {
        ContextConfig {
            proxy: env::var("http_proxy")
                .or_else(|_| env::var("HTTP_PROXY"))
                .ok()
                .filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct ExtractionContext {
    pub http: Arc<dyn Fetcher>,
    pub locales: Vec<String>,
}

impl ExtractionContext {
    pub fn new() -> Result<ExtractionContext> {
        Self::from_config(&ContextConfig::from_env())
    }

    pub fn new_with_locale(locales: Vec<String>) -> Result<ExtractionContext> {
        Self::from_config(&ContextConfig {
            locales,
            ..ContextConfig::from_env()
        })
    }

    pub fn from_config(config: &ContextConfig) -> Result<ExtractionContext> {
        let locales = if config.locales.is_empty() {
            system_locales()
        } else {
            config.locales.clone()
        };
        Ok(ExtractionContext {
            http: Arc::new(HttpFetcher {
                client: build_http(config, &locales)?,
            }),
            locales,
        })
    }

    pub fn with_fetcher(http: Arc<dyn Fetcher>, locales: Vec<String>) -> ExtractionContext {
        ExtractionContext { http, locales }
    }

    pub async fn get_body(&self, resource_name: &str, url: &str) -> Result<String> {
        debug!(resource = resource_name, url, "downloading");
        self.http.fetch_text(resource_name, url).await
    }

    pub async fn get_json<A>(&self, resource_name: &str, url: &str) -> Result<A>
    where
        A: for<'a> Deserialize<'a>,
    {
        let body = self.get_body(resource_name, url).await?;
        serde_json::from_str(&body).map_err(|source| ExtractionError::Json {
            resource: resource_name.to_string(),
            source,
        })
    }
}

fn system_locales() -> Vec<String> {
    let locale = get_locale()
        .filter(|l| l != "c" && l != "C")
        .unwrap_or_else(|| "en-US".to_string());

    if locale.len() > 2 {
        vec![locale.clone(), locale[0..2].to_string()]
    } else {
        vec![locale]
    }
}

pub(crate) fn accept_language(locales: &[String]) -> String {
    locales
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i != 0 {
                format!("{l};q={}", 1.0 - (i as f32 / 10.0))
            } else {
                l.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn build_http(config: &ContextConfig, locales: &[String]) -> Result<reqwest::Client> {
    let mut headers = header::HeaderMap::new();
    if let Ok(value) = accept_language(locales).parse() {
        headers.append(header::ACCEPT_LANGUAGE, value);
    }

    let mut builder = reqwest::ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers);
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
    }
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::{accept_language, ContextConfig, ExtractionContext};
    use crate::testing::StaticFetcher;
    use crate::ExtractionError;

    #[test]
    fn accept_language_weights() {
        assert_eq!(
            accept_language(&["ga-IE".to_string(), "ga".to_string(), "en".to_string()]),
            "ga-IE,ga;q=0.9,en;q=0.8"
        );
        assert_eq!(accept_language(&["en".to_string()]), "en");
    }

    #[test]
    fn config_defaults_and_partial_json() {
        let config = ContextConfig::default();
        assert_eq!(config.user_agent, "okhttp/4.9.3");
        assert!(config.locales.is_empty());
        assert_eq!(config.proxy, None);

        let config: ContextConfig =
            serde_json::from_str(r#"{"locales": ["ga-IE"], "timeout_secs": 30}"#).unwrap();
        assert_eq!(config.user_agent, "okhttp/4.9.3");
        assert_eq!(config.locales, vec!["ga-IE"]);
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn build_from_config() {
        let ctx = ExtractionContext::from_config(&ContextConfig {
            locales: vec!["en-IE".to_string()],
            timeout_secs: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ctx.locales, vec!["en-IE"]);
    }

    #[test]
    fn bad_proxy_is_a_client_error() {
        let res = ExtractionContext::from_config(&ContextConfig {
            locales: vec!["en".to_string()],
            proxy: Some("not a proxy url".to_string()),
            ..Default::default()
        });
        assert!(matches!(res, Err(ExtractionError::Client(_))));
    }

    #[derive(Deserialize, Debug)]
    struct Thing {
        a: u32,
    }

    #[tokio::test]
    async fn get_json_parses_and_reports_resource() {
        let fetcher = StaticFetcher::new()
            .with("http://x/good", r#"{"a": 1}"#)
            .with("http://x/bad", "<html>");
        let ctx = ExtractionContext::with_fetcher(Arc::new(fetcher), vec!["en".to_string()]);

        let thing: Thing = ctx.get_json("thing", "http://x/good").await.unwrap();
        assert_eq!(thing.a, 1);

        let err = ctx.get_json::<Thing>("thing", "http://x/bad").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Json { ref resource, .. } if resource == "thing"));

        let err = ctx.get_json::<Thing>("thing", "http://x/none").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Network { .. }));
    }
}
