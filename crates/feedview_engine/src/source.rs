/// Lazy-load attributes consulted when no other source is declared, highest priority first.
pub const LAZY_SOURCE_ATTRIBUTES: [&str; 5] = [
    "data-src",
    "data-original",
    "data-lazy-src",
    "data-url",
    "data-hi-res-src",
];

/// Score given to candidates whose descriptor is missing or unparsable.
const DEFAULT_SCORE: f64 = 1.0;
/// Density descriptors are scaled into the width range for comparison.
const DENSITY_SCALE: f64 = 1000.0;

/// One offered variant of a grouped image, e.g. a `<source>` inside `<picture>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceVariant {
    pub srcset: String,
    pub media_type: Option<String>,
}

impl SourceVariant {
    pub fn is_vector(&self) -> bool {
        self.media_type.as_deref().is_some_and(is_vector_type) || {
            let entries = parse_srcset(&self.srcset);
            !entries.is_empty() && entries.iter().all(|e| is_vector_url(&e.url))
        }
    }
}

/// An image reference found in markup, before a single source is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageCandidate {
    pub srcset: Option<String>,
    pub group: Vec<SourceVariant>,
    pub src: Option<String>,
    /// `(attribute name, value)` pairs for lazy-load attributes present on the element.
    pub lazy: Vec<(String, String)>,
    pub declared_width: Option<u32>,
    pub declared_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SrcsetEntry {
    pub url: String,
    pub score: f64,
}

/// Picks the effective source URL; empty when the candidate has none.
pub fn select_source(candidate: &ImageCandidate) -> String {
    if let Some(best) = candidate
        .srcset
        .as_deref()
        .and_then(|srcset| best_entry(&parse_srcset(srcset)))
    {
        return best.url;
    }

    // Later variants in a group are conventionally the preferred ones.
    let grouped = candidate
        .group
        .iter()
        .filter(|variant| !variant.is_vector())
        .filter_map(|variant| best_entry(&parse_srcset(&variant.srcset)))
        .last();
    if let Some(best) = grouped {
        return best.url;
    }

    if let Some(src) = candidate
        .src
        .as_deref()
        .map(str::trim)
        .filter(|src| !src.is_empty())
    {
        return src.to_string();
    }

    LAZY_SOURCE_ATTRIBUTES
        .iter()
        .find_map(|name| {
            candidate
                .lazy
                .iter()
                .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}

fn best_entry(entries: &[SrcsetEntry]) -> Option<SrcsetEntry> {
    let mut best: Option<&SrcsetEntry> = None;
    for entry in entries {
        // Strictly greater keeps the first entry on ties.
        if best.is_none_or(|current| entry.score > current.score) {
            best = Some(entry);
        }
    }
    best.cloned()
}

/// Parses a `srcset` list. URLs may contain commas (data URLs), so entries are
/// split on whitespace after the URL rather than on every comma.
pub fn parse_srcset(srcset: &str) -> Vec<SrcsetEntry> {
    let mut entries = Vec::new();
    let mut rest = srcset;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_url = &rest[..url_end];
        rest = &rest[url_end..];

        let url = raw_url.trim_end_matches(',');
        let descriptor = if url.len() != raw_url.len() {
            ""
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            let descriptor = rest[..end].trim();
            rest = &rest[end..];
            descriptor
        };

        if !url.is_empty() {
            entries.push(SrcsetEntry {
                url: url.to_string(),
                score: descriptor_score(descriptor),
            });
        }
    }
    entries
}

fn descriptor_score(descriptor: &str) -> f64 {
    let token = descriptor
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if let Some(width) = token.strip_suffix('w') {
        if let Ok(width) = width.parse::<u32>() {
            return f64::from(width);
        }
    } else if let Some(density) = token.strip_suffix('x') {
        if let Ok(density) = density.parse::<f64>() {
            if density.is_finite() && density > 0.0 {
                return density * DENSITY_SCALE;
            }
        }
    }
    DEFAULT_SCORE
}

pub(crate) fn is_vector_type(media_type: &str) -> bool {
    media_type.to_ascii_lowercase().contains("svg")
}

pub(crate) fn is_vector_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("data:image/svg") {
        return true;
    }
    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path.ends_with(".svg") || path.ends_with(".svgz")
}
