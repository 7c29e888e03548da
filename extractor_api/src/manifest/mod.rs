//! Expanding adaptive streaming manifests into lists of [`crate::MediaFormat`]s.
//!
//! The expanders always return errors, whether a failure is fatal is up to the
//! extractor calling them.

mod f4m;
mod hls;

pub use f4m::extract_f4m_formats;
pub use hls::extract_m3u8_formats;

/// `<tag>-<n>`, or just `<n>` when there's no tag.
fn format_id(tag: Option<&str>, n: impl ToString) -> String {
    match tag {
        Some(tag) => format!("{tag}-{}", n.to_string()),
        None => n.to_string(),
    }
}

/// Resolves a possibly relative manifest reference against `base`,
/// which is a directory-like prefix, not a document URL.
fn join_manifest_url(base: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), reference)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_id, join_manifest_url};

    #[test]
    fn ids() {
        assert_eq!(format_id(Some("hds"), 800), "hds-800");
        assert_eq!(format_id(None, 3), "3");
    }

    #[test]
    fn joins() {
        assert_eq!(
            join_manifest_url("http://a/b", "c.f4m"),
            "http://a/b/c.f4m"
        );
        assert_eq!(
            join_manifest_url("http://a/b/", "c.f4m"),
            "http://a/b/c.f4m"
        );
        assert_eq!(
            join_manifest_url("http://a/b", "https://x/y.f4m"),
            "https://x/y.f4m"
        );
    }
}
