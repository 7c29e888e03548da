use futures::future::BoxFuture;
use futures::FutureExt;
use nipper::Document;
use tracing::debug;

use super::hls::extract_m3u8_formats;
use super::{format_id, join_manifest_url};
use crate::error::{ExtractionError, Result};
use crate::{ExtractionContext, FormatProtocol, MediaFormat, VideoDetails};

// set-level manifests pointing at further manifests are followed this deep
const MAX_NESTING: u8 = 2;

#[derive(Debug, PartialEq)]
struct F4mMedia {
    /// only meaningful in 2.0 manifests
    href: Option<String>,
    url: Option<String>,
    bitrate: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, PartialEq)]
struct F4mManifest {
    version_2: bool,
    /// Stream-level manifests carry bootstrap info, set-level ones only point
    /// at other manifests or streams.
    has_bootstrap: bool,
    base_url: Option<String>,
    media: Vec<F4mMedia>,
}

fn non_empty_attr(node: &nipper::Selection, name: &str) -> Option<String> {
    node.attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// nipper is fine with the XML as long as everything is looked up by lowercase name
fn parse_f4m(manifest: &str) -> Result<F4mManifest, String> {
    let document = Document::from(manifest);
    let root = document.select("manifest");
    if !root.exists() {
        return Err("no <manifest> element".to_string());
    }
    let version_2 = root
        .attr("xmlns")
        .map(|ns| ns.trim_end_matches('/').ends_with("2.0"))
        .unwrap_or(false);
    let base_url = Some(document.select("baseurl").text().trim().to_string())
        .filter(|b| !b.is_empty());

    let media = document
        .select("media")
        .iter()
        // DRM protected media can't be played anyway
        .filter(|m| {
            m.attr("drmadditionalheaderid").is_none()
                && m.attr("drmadditionalheadersetid").is_none()
        })
        .map(|m| F4mMedia {
            href: non_empty_attr(&m, "href"),
            url: non_empty_attr(&m, "url"),
            bitrate: m.attr("bitrate").and_then(|b| b.trim().parse().ok()),
            width: m.attr("width").and_then(|w| w.trim().parse().ok()),
            height: m.attr("height").and_then(|h| h.trim().parse().ok()),
        })
        .collect();

    Ok(F4mManifest {
        version_2,
        has_bootstrap: document.select("bootstrapinfo").exists(),
        base_url,
        media,
    })
}

/// Extension of the last path segment, query and fragment ignored.
fn url_ext(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext)
}

fn video_details(width: Option<u32>, height: Option<u32>) -> Option<VideoDetails> {
    if width.is_none() && height.is_none() {
        return None;
    }
    Some(VideoDetails {
        width,
        height,
        ..Default::default()
    })
}

/// Fetches an f4m (HDS) manifest and lists its renditions.
///
/// Renditions of a stream-level manifest point at the manifest itself, as HDS
/// is downloaded through it. Set-level manifests are resolved: references to
/// further f4m manifests are expanded in turn, m3u8 references go through the
/// HLS expander. `f4m_id` prefixes the format ids.
pub async fn extract_f4m_formats(
    ctx: &ExtractionContext,
    manifest_url: &str,
    video_id: &str,
    f4m_id: Option<&str>,
) -> Result<Vec<MediaFormat>> {
    extract_f4m_nested(ctx, manifest_url.to_string(), video_id, f4m_id, 0).await
}

fn extract_f4m_nested<'a>(
    ctx: &'a ExtractionContext,
    manifest_url: String,
    video_id: &'a str,
    f4m_id: Option<&'a str>,
    depth: u8,
) -> BoxFuture<'a, Result<Vec<MediaFormat>>> {
    async move {
        let body = ctx
            .get_body(&format!("f4m manifest for {video_id}"), &manifest_url)
            .await?;
        let manifest = parse_f4m(&body).map_err(|reason| ExtractionError::Manifest {
            kind: "f4m",
            url: manifest_url.clone(),
            reason,
        })?;

        let base = manifest.base_url.clone().unwrap_or_else(|| {
            manifest_url
                .rsplit_once('/')
                .map(|(dir, _)| dir.to_string())
                .unwrap_or_else(|| manifest_url.clone())
        });

        let mut formats = vec![];
        for (i, media) in manifest.media.into_iter().enumerate() {
            let bitrate = media.bitrate.map(|b| b.round());
            let id = match bitrate {
                Some(b) => format_id(f4m_id, b as u64),
                None => format_id(f4m_id, i),
            };

            let mut format_url = manifest_url.clone();
            if !manifest.has_bootstrap {
                let reference = if manifest.version_2 {
                    media.href.as_ref().or(media.url.as_ref())
                } else {
                    media.url.as_ref()
                };
                let Some(reference) = reference else {
                    continue;
                };
                format_url = join_manifest_url(&base, reference);

                let ext = url_ext(&format_url).map(str::to_string);
                match ext.as_deref() {
                    Some("f4m") => {
                        if depth + 1 >= MAX_NESTING {
                            debug!(url = %format_url, "f4m nesting too deep, skipping");
                            continue;
                        }
                        debug!(url = %format_url, "following nested f4m manifest");
                        let mut nested =
                            extract_f4m_nested(ctx, format_url, video_id, f4m_id, depth + 1)
                                .await?;
                        // a lone rendition often has no quality info of its own
                        if let [only] = nested.as_mut_slice() {
                            if bitrate.is_some() {
                                only.id = Some(id);
                            }
                            only.bitrate = only.bitrate.or(bitrate);
                            let (width, height) = match &only.video_details {
                                Some(v) => (v.width.or(media.width), v.height.or(media.height)),
                                None => (media.width, media.height),
                            };
                            if let Some(details) = video_details(width, height) {
                                let codec = only.video_details.take().and_then(|v| v.codec);
                                only.video_details = Some(VideoDetails { codec, ..details });
                            }
                        }
                        formats.extend(nested);
                        continue;
                    }
                    Some("m3u8") => {
                        let hls =
                            extract_m3u8_formats(ctx, &format_url, video_id, "mp4", None).await?;
                        formats.extend(hls);
                        continue;
                    }
                    _ => {}
                }
            }

            formats.push(MediaFormat {
                id: Some(id),
                url: format_url,
                protocol: FormatProtocol::Hds,
                manifest_url: Some(manifest_url.clone()),
                ext: manifest.has_bootstrap.then(|| "flv".to_string()),
                bitrate,
                video_details: video_details(media.width, media.height),
                ..Default::default()
            });
        }
        Ok(formats)
    }
    .boxed()
}
