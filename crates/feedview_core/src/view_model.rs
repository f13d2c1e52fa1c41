use crate::{ArticleId, ExtractionResult, MediaAttachment, SummaryResult, SummarySource, Tab, VariantState};

/// Markup stream selected for the normalization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub markup: String,
    pub base_url: Option<String>,
    /// Vector images are dropped as well; set for alternate extractions only.
    pub strict: bool,
    pub attachments: Vec<MediaAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMeta {
    pub title: String,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
    pub published_time: Option<String>,
    pub word_count: u32,
}

impl From<&ExtractionResult> for ExtractionMeta {
    fn from(result: &ExtractionResult) -> Self {
        Self {
            title: result.title.clone(),
            byline: result.byline.clone(),
            site_name: result.site_name.clone(),
            excerpt: result.excerpt.clone(),
            published_time: result.published_time.clone(),
            word_count: result.word_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub points: Vec<String>,
    pub source: SummarySource,
    pub reason: Option<String>,
}

impl From<&SummaryResult> for SummaryView {
    fn from(result: &SummaryResult) -> Self {
        Self {
            points: result
                .points
                .iter()
                .map(|point| point.trim())
                .filter(|point| !point.is_empty())
                .map(str::to_string)
                .collect(),
            source: result.source,
            reason: result.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailViewModel {
    pub article_id: Option<ArticleId>,
    pub tab: Tab,
    pub state: VariantState,
    pub document: Option<DocumentRequest>,
    pub extraction: Option<ExtractionMeta>,
    /// Dismissible notice shown above fallback content.
    pub notice: Option<String>,
    pub summary: Option<SummaryView>,
    /// Summary tab message for empty or failed summaries.
    pub message: Option<String>,
    pub dirty: bool,
}
