use serde::{Deserialize, Serialize};

pub type ArticleId = String;

/// Appended to every alternate-extraction failure notice.
pub const FEED_CONTENT_SUFFIX: &str = "Showing feed content instead.";
/// Reason used when an alternate-extraction failure carries no usable text.
pub const ALTERNATE_UNAVAILABLE: &str = "Unable to resolve that URL.";
/// Reason used when a summary failure carries no usable text.
pub const SUMMARY_UNAVAILABLE: &str = "AI summary unavailable.";
/// Shown when a summary arrives without any points.
pub const SUMMARY_EMPTY: &str = "No summary points available.";

/// A feed article as delivered by the feed service. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    /// Inline markup body as supplied by the feed.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "enclosures")]
    pub attachments: Vec<MediaAttachment>,
}

impl Article {
    /// Link usable as an alternate-extraction key, if any.
    pub fn fetchable_link(&self) -> Option<&str> {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

/// Media declared out-of-band from the markup, e.g. a feed enclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub length: Option<u64>,
}

/// Cleaned rendition of an article's source page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub byline: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published_time: Option<String>,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    #[default]
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryResult {
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub source: SummarySource,
    #[serde(default)]
    pub reason: Option<String>,
}

impl SummaryResult {
    pub fn has_points(&self) -> bool {
        self.points.iter().any(|point| !point.trim().is_empty())
    }
}

/// A failed collaborator call, carrying whatever text the failure exposed.
///
/// `error` is an explicit structured error field, `message` a generic one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchFailure {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl FetchFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: Some(message.into()),
        }
    }

    /// User-visible reason: `error`, then `message`, then `fallback`.
    pub fn reason_or(&self, fallback: &str) -> String {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Formats the inline notice shown when feed content replaces the extraction.
pub fn fallback_notice(reason: &str) -> String {
    let reason = reason.trim().trim_end_matches('.');
    format!("{reason}. {FEED_CONTENT_SUFFIX}")
}
