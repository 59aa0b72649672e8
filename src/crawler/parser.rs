//! HTML reference extraction
//!
//! This module pulls raw references out of fetched documents:
//! - `href` references from `<a>`, `<area>` and `<link>`
//! - `src` references from embedded resources (`<img>`, `<script>`, ...)
//! - the document's `<base href>`, which overrides the resolution base
//!
//! References are returned raw; resolving them is the normalizer's job.

use scraper::{Html, Selector};

/// Attribute a reference was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Href,
    Src,
}

/// A raw reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub raw: String,
    pub kind: ReferenceKind,
}

/// Which reference kinds the crawl follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchKinds {
    pub href: bool,
    pub src: bool,
}

impl WatchKinds {
    /// Returns true if extraction is needed at all
    pub fn any(&self) -> bool {
        self.href || self.src
    }

    pub fn includes(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Href => self.href,
            ReferenceKind::Src => self.src,
        }
    }
}

/// Everything extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Raw value of the first `<base href>`, if present
    pub base_href: Option<String>,

    /// References of the requested kinds, in document order per kind
    pub references: Vec<Reference>,
}

/// Reference extraction capability
pub trait ReferenceExtractor: Send + Sync {
    /// Extracts references of the requested kinds from a document body
    fn extract(&self, body: &str, content_type: Option<&str>, kinds: WatchKinds) -> Extracted;
}

const HREF_SELECTORS: &[&str] = &["a[href]", "area[href]", "link[href]"];

const SRC_SELECTORS: &[&str] = &[
    "img[src]",
    "script[src]",
    "iframe[src]",
    "frame[src]",
    "embed[src]",
    "source[src]",
    "audio[src]",
    "video[src]",
    "track[src]",
    "input[src]",
];

/// `scraper`-backed extractor for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceExtractor for HtmlExtractor {
    /// Parses HTML content and extracts references
    ///
    /// # Extraction Rules
    ///
    /// **Skipped:**
    /// - Empty values
    /// - Fragment-only values (`#section`)
    /// - `javascript:`, `mailto:`, `tel:` and `data:` references
    ///
    /// The content type is not inspected; the fetcher only hands over
    /// bodies of HTML responses.
    fn extract(&self, body: &str, _content_type: Option<&str>, kinds: WatchKinds) -> Extracted {
        if !kinds.any() {
            return Extracted::default();
        }

        let document = Html::parse_document(body);
        let mut references = Vec::new();

        if kinds.href {
            collect(&document, HREF_SELECTORS, "href", ReferenceKind::Href, &mut references);
        }
        if kinds.src {
            collect(&document, SRC_SELECTORS, "src", ReferenceKind::Src, &mut references);
        }

        Extracted {
            base_href: extract_base_href(&document),
            references,
        }
    }
}

fn collect(
    document: &Html,
    selectors: &[&str],
    attribute: &str,
    kind: ReferenceKind,
    out: &mut Vec<Reference>,
) {
    for raw_selector in selectors {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                if is_followable(value) {
                    out.push(Reference {
                        raw: value.trim().to_string(),
                        kind,
                    });
                }
            }
        }
    }
}

fn extract_base_href(document: &Html) -> Option<String> {
    let selector = Selector::parse("base[href]").ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Returns false for references that never name a fetchable resource
fn is_followable(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') {
        return false;
    }

    let lower = value.to_ascii_lowercase();
    !["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
