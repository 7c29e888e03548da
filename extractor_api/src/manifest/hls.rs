use m3u8_rs::{AlternativeMedia, AlternativeMediaType, MasterPlaylist, Playlist, VariantStream};
use url::Url;

use super::format_id;
use crate::error::{ExtractionError, Result};
use crate::{
    AudioDetails, ExtractionContext, FormatBreed, FormatProtocol, MediaFormat, VideoDetails,
};

const VIDEO_CODECS: [&str; 8] = [
    "avc1", "avc3", "hev1", "hvc1", "vp8", "vp9", "av01", "mp4v",
];
const AUDIO_CODECS: [&str; 8] = [
    "mp4a", "ac-3", "ec-3", "opus", "vorbis", "mp3", "flac", "alac",
];

/// Splits an HLS `CODECS` attribute into (video, audio).
fn split_codecs(codecs: &str) -> (Option<String>, Option<String>) {
    let mut video = None;
    let mut audio = None;
    for codec in codecs.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let family = codec.split('.').next().unwrap_or(codec);
        if video.is_none() && VIDEO_CODECS.contains(&family) {
            video = Some(codec.to_string());
        } else if audio.is_none() && AUDIO_CODECS.contains(&family) {
            audio = Some(codec.to_string());
        }
    }
    (video, audio)
}

fn variant_format(
    variant: VariantStream,
    index: usize,
    base: &Url,
    manifest_url: &str,
    ext: &str,
    m3u8_id: Option<&str>,
) -> MediaFormat {
    let bandwidth = variant.average_bandwidth.unwrap_or(variant.bandwidth);
    let bitrate = Some(bandwidth as f64 / 1000.0).filter(|b| *b > 0.0);
    let (video_codec, audio_codec) = variant
        .codecs
        .as_deref()
        .map(split_codecs)
        .unwrap_or_default();
    let audio_only =
        variant.codecs.is_some() && video_codec.is_none() && variant.resolution.is_none();

    MediaFormat {
        id: Some(match bitrate {
            Some(b) => format_id(m3u8_id, b.round() as u64),
            None => format_id(m3u8_id, index),
        }),
        url: base
            .join(&variant.uri)
            .map(String::from)
            .unwrap_or(variant.uri),
        protocol: FormatProtocol::Hls,
        manifest_url: Some(manifest_url.to_string()),
        ext: Some(ext.to_string()),
        bitrate,
        breed: if audio_only {
            FormatBreed::Audio
        } else {
            FormatBreed::AudioVideo
        },
        video_details: if audio_only {
            None
        } else {
            Some(VideoDetails {
                width: variant.resolution.as_ref().map(|r| r.width as u32),
                height: variant.resolution.as_ref().map(|r| r.height as u32),
                codec: video_codec,
            })
        },
        audio_details: audio_codec.map(|codec| AudioDetails { codec: Some(codec) }),
    }
}

/// An `EXT-X-MEDIA` rendition with its own playlist. Subtitles and
/// captions are not formats.
fn alternative_format(
    media: AlternativeMedia,
    base: &Url,
    manifest_url: &str,
    ext: &str,
    m3u8_id: Option<&str>,
) -> Option<MediaFormat> {
    let breed = match media.media_type {
        AlternativeMediaType::Audio => FormatBreed::Audio,
        AlternativeMediaType::Video => FormatBreed::Video,
        _ => return None,
    };
    let uri = media.uri?;
    let id = [m3u8_id, Some(media.group_id.as_str()), Some(media.name.as_str())]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    Some(MediaFormat {
        id: Some(id).filter(|id| !id.is_empty()),
        url: base.join(&uri).map(String::from).unwrap_or(uri),
        protocol: FormatProtocol::Hls,
        manifest_url: Some(manifest_url.to_string()),
        ext: Some(ext.to_string()),
        breed,
        ..Default::default()
    })
}

fn master_formats(
    playlist: MasterPlaylist,
    base: &Url,
    manifest_url: &str,
    ext: &str,
    m3u8_id: Option<&str>,
) -> Vec<MediaFormat> {
    let renditions = playlist
        .alternatives
        .into_iter()
        .filter_map(|media| alternative_format(media, base, manifest_url, ext, m3u8_id));
    let variants = playlist
        .variants
        .into_iter()
        .filter(|v| !v.is_i_frame)
        .enumerate()
        .map(|(i, v)| variant_format(v, i, base, manifest_url, ext, m3u8_id));
    renditions.chain(variants).collect()
}

/// Fetches an m3u8 (HLS) playlist and lists its variants.
///
/// A media playlist is a single format of its own. `ext` is the container
/// the variants are expected to be remuxed into, `m3u8_id` prefixes the format ids.
pub async fn extract_m3u8_formats(
    ctx: &ExtractionContext,
    m3u8_url: &str,
    video_id: &str,
    ext: &str,
    m3u8_id: Option<&str>,
) -> Result<Vec<MediaFormat>> {
    let manifest_error = |reason: String| ExtractionError::Manifest {
        kind: "m3u8",
        url: m3u8_url.to_string(),
        reason,
    };

    let base = Url::parse(m3u8_url).map_err(|e| manifest_error(e.to_string()))?;
    let body = ctx
        .get_body(&format!("m3u8 playlist for {video_id}"), m3u8_url)
        .await?;
    let playlist =
        m3u8_rs::parse_playlist_res(body.as_bytes()).map_err(|e| manifest_error(format!("{e:?}")))?;

    Ok(match playlist {
        Playlist::MasterPlaylist(pl) => master_formats(pl, &base, m3u8_url, ext, m3u8_id),
        Playlist::MediaPlaylist(_) => vec![MediaFormat {
            id: m3u8_id.map(str::to_string),
            url: m3u8_url.to_string(),
            protocol: FormatProtocol::Hls,
            manifest_url: Some(m3u8_url.to_string()),
            ext: Some(ext.to_string()),
            ..Default::default()
        }],
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{extract_m3u8_formats, split_codecs};
    use crate::testing::StaticFetcher;
    use crate::{ExtractionContext, ExtractionError, FormatBreed, FormatProtocol};

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=1280000,RESOLUTION=640x360,CODECS=\"avc1.4d401e,mp4a.40.2\"
360p/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2560000,AVERAGE-BANDWIDTH=2400000,RESOLUTION=1280x720,CODECS=\"avc1.4d401f,mp4a.40.2\"
http://other.rasset.ie/720p/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=64000,CODECS=\"mp4a.40.5\"
audio/index.m3u8
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=86000,URI=\"iframe.m3u8\"
";

    const MEDIA: &str = "#EXTM3U
#EXT-X-TARGETDURATION:10
#EXT-X-VERSION:3
#EXTINF:9.009,
segment0.ts
#EXTINF:9.009,
segment1.ts
#EXT-X-ENDLIST
";

    fn ctx(fetcher: StaticFetcher) -> ExtractionContext {
        ExtractionContext::with_fetcher(Arc::new(fetcher), vec!["en".to_string()])
    }

    #[test]
    fn codecs() {
        assert_eq!(
            split_codecs("avc1.4d401e, mp4a.40.2"),
            (Some("avc1.4d401e".to_string()), Some("mp4a.40.2".to_string()))
        );
        assert_eq!(split_codecs("mp4a.40.5"), (None, Some("mp4a.40.5".to_string())));
        assert_eq!(split_codecs("wat"), (None, None));
    }

    #[tokio::test]
    async fn master_playlist_variants() {
        let url = "http://h.rasset.ie/hls/m.m3u8";
        let formats = extract_m3u8_formats(
            &ctx(StaticFetcher::new().with(url, MASTER)),
            url,
            "10507902",
            "mp4",
            Some("hls"),
        )
        .await
        .unwrap();
        assert_eq!(formats.len(), 3);

        assert_eq!(formats[0].id.as_deref(), Some("hls-1280"));
        assert_eq!(formats[0].url, "http://h.rasset.ie/hls/360p/index.m3u8");
        assert_eq!(formats[0].protocol, FormatProtocol::Hls);
        assert_eq!(formats[0].manifest_url.as_deref(), Some(url));
        assert_eq!(formats[0].ext.as_deref(), Some("mp4"));
        let video = formats[0].video_details.as_ref().unwrap();
        assert_eq!((video.width, video.height), (Some(640), Some(360)));
        assert_eq!(video.codec.as_deref(), Some("avc1.4d401e"));

        assert_eq!(formats[1].id.as_deref(), Some("hls-2400"));
        assert_eq!(formats[1].url, "http://other.rasset.ie/720p/index.m3u8");
        assert_eq!(formats[1].bitrate, Some(2400.0));

        assert_eq!(formats[2].id.as_deref(), Some("hls-64"));
        assert_eq!(formats[2].breed, FormatBreed::Audio);
        assert_eq!(formats[2].video_details, None);
        assert_eq!(
            formats[2].audio_details.as_ref().unwrap().codec.as_deref(),
            Some("mp4a.40.5")
        );
    }

    #[tokio::test]
    async fn alternative_audio_renditions() {
        let url = "http://h.rasset.ie/radio/master.m3u8";
        let master = "#EXTM3U
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\",NAME=\"English\",LANGUAGE=\"en\",DEFAULT=YES,URI=\"audio/en.m3u8\"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\",NAME=\"Main\",DEFAULT=NO
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"subs\",NAME=\"English\",URI=\"subs/en.m3u8\"
#EXT-X-STREAM-INF:BANDWIDTH=1280000,RESOLUTION=640x360,CODECS=\"avc1.4d401e,mp4a.40.2\",AUDIO=\"aac\"
360p/index.m3u8
";
        let formats = extract_m3u8_formats(
            &ctx(StaticFetcher::new().with(url, master)),
            url,
            "1",
            "mp4",
            Some("hls"),
        )
        .await
        .unwrap();
        assert_eq!(formats.len(), 2);

        assert_eq!(formats[0].id.as_deref(), Some("hls-aac-English"));
        assert_eq!(formats[0].url, "http://h.rasset.ie/radio/audio/en.m3u8");
        assert_eq!(formats[0].breed, FormatBreed::Audio);
        assert_eq!(formats[0].protocol, FormatProtocol::Hls);
        assert_eq!(formats[0].manifest_url.as_deref(), Some(url));

        assert_eq!(formats[1].id.as_deref(), Some("hls-1280"));
        assert_eq!(formats[1].breed, FormatBreed::AudioVideo);
    }

    #[tokio::test]
    async fn media_playlist_is_one_format() {
        let url = "http://h.rasset.ie/hls/single.m3u8";
        let formats = extract_m3u8_formats(
            &ctx(StaticFetcher::new().with(url, MEDIA)),
            url,
            "1",
            "mp4",
            Some("hls"),
        )
        .await
        .unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].id.as_deref(), Some("hls"));
        assert_eq!(formats[0].url, url);
        assert_eq!(formats[0].protocol, FormatProtocol::Hls);
    }

    #[tokio::test]
    async fn garbage_is_an_error() {
        let url = "http://h.rasset.ie/hls/404.m3u8";
        let err = extract_m3u8_formats(
            &ctx(StaticFetcher::new().with(url, "<html>not found</html>")),
            url,
            "1",
            "mp4",
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Manifest { kind: "m3u8", .. }));
    }
}
