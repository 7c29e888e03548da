//! Offline stand-ins for the network, for extractor tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::context::Fetcher;
use crate::error::{ExtractionError, Result};

/// Serves canned bodies by exact URL, anything else fails like a 404 would.
/// Keeps a log of what was asked for.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<U: Into<String>, B: Into<String>>(mut self, url: U, body: B) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_text(&self, resource_name: &str, url: &str) -> Result<String> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractionError::Network {
                resource: resource_name.to_string(),
                source: format!("no canned body for {url}").into(),
            })
    }
}
