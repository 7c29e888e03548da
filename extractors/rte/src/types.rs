//! The JSON playlist feeds, shared by the player and the radio player.
//! String values in them are stored XML-escaped.

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Feed {
    #[serde(default)]
    pub shows: Vec<Show>,
}

#[derive(Deserialize, Debug)]
pub struct Show {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// milliseconds, either as a number or a string
    #[serde(default)]
    pub duration: serde_json::Value,
    #[serde(rename = "media:group", default)]
    pub media_group: Vec<MediaGroup>,
}

#[derive(Deserialize, Default, Debug)]
pub struct MediaGroup {
    /// Direct file, or an RTMP stream
    pub url: Option<String>,
    #[serde(rename = "rte:server")]
    pub rte_server: Option<String>,
    pub hls_server: Option<String>,
    pub hls_url: Option<String>,
    pub hds_server: Option<String>,
    pub hds_url: Option<String>,
}

impl MediaGroup {
    /// (server, path) of the HLS playlist, if the feed has both halves.
    pub fn hls_location(&self) -> Option<(&str, &str)> {
        both(&self.hls_server, &self.hls_url)
    }

    /// (server, path) of the HDS manifest, if the feed has both halves.
    pub fn hds_location(&self) -> Option<(&str, &str)> {
        both(&self.hds_server, &self.hds_url)
    }
}

fn both<'a>(server: &'a Option<String>, path: &'a Option<String>) -> Option<(&'a str, &'a str)> {
    match (server.as_deref(), path.as_deref()) {
        (Some(s), Some(p)) if !s.is_empty() && !p.is_empty() => Some((s, p)),
        _ => None,
    }
}
