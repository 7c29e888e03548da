//! Lookups over fetched HTML. None of these fail, an absent value is `None`;
//! pair them with [`crate::Required`] where the value is mandatory.
//!
//! `nipper::Document` is not `Send`, so callers should scrape in a plain
//! function and only carry the owned results across `.await`s.

use nipper::Document;
use regex::Regex;

/// `content` of the first `<meta>` whose `name`, `property` or `itemprop` is `name`.
/// An empty `content` is still a value.
pub fn html_search_meta(document: &Document, name: &str) -> Option<String> {
    ["name", "property", "itemprop"]
        .iter()
        .find_map(|attr| {
            document
                .select(&format!(r#"meta[{attr}="{name}"]"#))
                .attr("content")
        })
        .map(|content| content.trim().to_string())
}

pub fn og_search_title(document: &Document) -> Option<String> {
    html_search_meta(document, "og:title")
}

/// First capture group of `re` in `text`.
pub fn search_regex(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decodes HTML/XML entities. Absence passes through as absence.
pub fn unescape_html(text: Option<&str>) -> Option<String> {
    text.map(|t| html_escape::decode_html_entities(t).into_owned())
}

#[cfg(test)]
mod tests {
    use nipper::Document;
    use once_cell::sync::Lazy;
    use regex::Regex;

    use super::{html_search_meta, og_search_title, search_regex, unescape_html};

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<meta property="og:title" content="Watch iWitness  online" />
<meta name="description" content="iWitness : The spirit of Ireland, one voice &amp; one minute at a time." />
<meta name="duration" content="60046" />
<meta itemprop="genre" content="  factual " />
<meta name="empty" content="" />
</head><body></body></html>"#;

    static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=([0-9]+)").unwrap());

    #[test]
    fn meta_by_name_property_itemprop() {
        let document = Document::from(PAGE);
        assert_eq!(
            og_search_title(&document).as_deref(),
            Some("Watch iWitness  online")
        );
        assert_eq!(
            html_search_meta(&document, "description").as_deref(),
            Some("iWitness : The spirit of Ireland, one voice & one minute at a time.")
        );
        assert_eq!(
            html_search_meta(&document, "duration").as_deref(),
            Some("60046")
        );
        assert_eq!(
            html_search_meta(&document, "genre").as_deref(),
            Some("factual")
        );
    }

    #[test]
    fn meta_absent_or_empty() {
        let document = Document::from(PAGE);
        assert_eq!(html_search_meta(&document, "feeds-prefix"), None);
        assert_eq!(html_search_meta(&document, "empty").as_deref(), Some(""));
        assert_eq!(og_search_title(&Document::from("<p>hi</p>")), None);
    }

    #[test]
    fn regex_first_group() {
        assert_eq!(
            search_regex(&NUMBER, "a?id=10478715&b").as_deref(),
            Some("10478715")
        );
        assert_eq!(search_regex(&NUMBER, "nothing here"), None);
    }

    #[test]
    fn unescape() {
        assert_eq!(
            unescape_html(Some("Tom &amp; Jerry &#39;live&#39;")).as_deref(),
            Some("Tom & Jerry 'live'")
        );
        assert_eq!(unescape_html(Some("")).as_deref(), Some(""));
        assert_eq!(unescape_html(None), None);
    }
}
