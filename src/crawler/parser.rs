//! HTML parser for replaying a page's image requests
//!
//! A browser rendering an item page requests its images roughly in document
//! order. This module recovers that order from the markup so the HTTP
//! renderer can emit the same requests for interception.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose attributes make the browser fetch an image
const IMAGE_SOURCES: &str = "img[src], img[srcset], source[srcset], \
    link[rel~='preload'][as='image'][href], \
    meta[property='og:image'][content], meta[name='twitter:image'][content]";

/// Extracts the image request URLs a page would issue, in document order
///
/// # Extraction Rules
///
/// - `<img src>` followed by each `<img srcset>` candidate
/// - `<source srcset>` candidates (inside `<picture>`)
/// - `<link rel="preload" as="image" href>`
/// - `og:image` and `twitter:image` meta tags
///
/// Relative URLs are resolved against `base_url`; `data:` URIs and non-HTTP(S)
/// targets are skipped, and each URL is reported once.
///
/// # Example
///
/// ```
/// use shutter_sweep::crawler::extract_image_requests;
/// use url::Url;
///
/// let html = r#"<html><body><img src="/img/101_s.jpg"></body></html>"#;
/// let base = Url::parse("https://www.flickr.com/photos/alice/101").unwrap();
/// assert_eq!(
///     extract_image_requests(html, &base),
///     vec!["https://www.flickr.com/img/101_s.jpg".to_string()]
/// );
/// ```
pub fn extract_image_requests(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(IMAGE_SOURCES) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut requests = Vec::new();

    for element in document.select(&selector) {
        for raw in element_sources(&element) {
            if let Some(url) = resolve_source(raw, base_url) {
                if seen.insert(url.clone()) {
                    requests.push(url);
                }
            }
        }
    }

    requests
}

/// Raw source attribute values of one element, in fetch priority
fn element_sources<'a>(element: &ElementRef<'a>) -> Vec<&'a str> {
    let value = element.value();
    let mut sources = Vec::new();

    match value.name() {
        "img" => {
            sources.extend(value.attr("src"));
            sources.extend(value.attr("srcset").into_iter().flat_map(srcset_urls));
        }
        "source" => {
            sources.extend(value.attr("srcset").into_iter().flat_map(srcset_urls));
        }
        "link" => sources.extend(value.attr("href")),
        "meta" => sources.extend(value.attr("content")),
        _ => {}
    }

    sources
}

/// Splits a `srcset` value into its candidate URLs
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

/// Resolves a source to an absolute HTTP(S) URL
fn resolve_source(raw: &str, base_url: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }

    let url = base_url.join(raw).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}
