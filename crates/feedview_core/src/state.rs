use std::collections::{BTreeMap, VecDeque};

use crate::view_model::{DetailViewModel, DocumentRequest, ExtractionMeta, SummaryView};
use crate::{
    Article, ArticleId, ExtractionResult, FetchTicket, SummaryResult, SUMMARY_EMPTY,
};

pub type SessionId = u64;

pub const DEFAULT_CACHE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Original,
    Alternate,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantState {
    #[default]
    Original,
    AlternateLoading,
    AlternateReady,
    AlternateFallback,
    SummaryLoading,
    SummaryReady,
    SummaryEmpty,
    SummaryError,
}

/// Settled alternate-extraction result for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternateOutcome {
    Ready(ExtractionResult),
    /// Feed content is shown instead; `notice` is already formatted for display.
    Fallback { notice: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Ready(SummaryResult),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot<T> {
    Idle,
    Pending,
    Settled(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CachedVariants {
    pub(crate) alternate: Slot<AlternateOutcome>,
    pub(crate) summary: Slot<SummaryOutcome>,
}

/// Per-session cache keyed by article, evicting the oldest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VariantCache {
    entries: BTreeMap<ArticleId, CachedVariants>,
    order: VecDeque<ArticleId>,
    capacity: usize,
}

impl VariantCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn ensure(&mut self, id: &str) -> &mut CachedVariants {
        if !self.entries.contains_key(id) {
            while self.order.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.order.push_back(id.to_string());
        }
        self.entries.entry(id.to_string()).or_default()
    }

    pub(crate) fn get(&self, id: &str) -> Option<&CachedVariants> {
        self.entries.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut CachedVariants> {
        self.entries.get_mut(id)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// State of one article detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    session: SessionId,
    article: Option<Article>,
    tab: Tab,
    notice_dismissed: bool,
    pub(crate) cache: VariantCache,
    dirty: bool,
}

impl Default for DetailState {
    fn default() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl DetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            session: 1,
            article: None,
            tab: Tab::Original,
            notice_dismissed: false,
            cache: VariantCache::new(capacity),
            dirty: false,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn cached_articles(&self) -> usize {
        self.cache.len()
    }

    /// Returns and clears the "needs re-render" flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn ticket_for(&self, article_id: &str) -> FetchTicket {
        FetchTicket {
            session: self.session,
            article_id: article_id.to_string(),
        }
    }

    pub(crate) fn accepts(&self, ticket: &FetchTicket) -> bool {
        ticket.session == self.session && self.cache.get(&ticket.article_id).is_some()
    }

    pub(crate) fn is_current(&self, article_id: &str) -> bool {
        self.article.as_ref().is_some_and(|a| a.id == article_id)
    }

    pub(crate) fn open_article(&mut self, article: Article) {
        self.cache.ensure(&article.id);
        self.article = Some(article);
        self.tab = Tab::Original;
        self.notice_dismissed = false;
        self.mark_dirty();
    }

    pub(crate) fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if !self.notice_dismissed {
            self.notice_dismissed = true;
            self.mark_dirty();
        }
    }

    pub(crate) fn close(&mut self) {
        self.session += 1;
        self.article = None;
        self.tab = Tab::Original;
        self.notice_dismissed = false;
        self.cache.clear();
        self.mark_dirty();
    }

    fn current_variants(&self) -> Option<&CachedVariants> {
        self.article.as_ref().and_then(|a| self.cache.get(&a.id))
    }

    pub fn variant_state(&self) -> VariantState {
        let variants = self.current_variants();
        match self.tab {
            Tab::Original => VariantState::Original,
            Tab::Alternate => match variants.map(|v| &v.alternate) {
                Some(Slot::Settled(AlternateOutcome::Ready(_))) => VariantState::AlternateReady,
                Some(Slot::Settled(AlternateOutcome::Fallback { .. })) => {
                    VariantState::AlternateFallback
                }
                _ => VariantState::AlternateLoading,
            },
            Tab::Summary => match variants.map(|v| &v.summary) {
                Some(Slot::Settled(SummaryOutcome::Ready(_))) => VariantState::SummaryReady,
                Some(Slot::Settled(SummaryOutcome::Empty)) => VariantState::SummaryEmpty,
                Some(Slot::Settled(SummaryOutcome::Failed(_))) => VariantState::SummaryError,
                _ => VariantState::SummaryLoading,
            },
        }
    }

    /// The single human-readable reason for a fallback or error state.
    pub fn reason(&self) -> Option<&str> {
        let variants = self.current_variants()?;
        match (self.variant_state(), &variants.alternate, &variants.summary) {
            (
                VariantState::AlternateFallback,
                Slot::Settled(AlternateOutcome::Fallback { notice }),
                _,
            ) => notice.as_deref(),
            (VariantState::SummaryError, _, Slot::Settled(SummaryOutcome::Failed(reason))) => {
                Some(reason.as_str())
            }
            _ => None,
        }
    }

    pub fn view(&self) -> DetailViewModel {
        let state = self.variant_state();
        let Some(article) = self.article.as_ref() else {
            return DetailViewModel {
                dirty: self.dirty,
                ..DetailViewModel::default()
            };
        };
        let variants = self.current_variants();

        let original = || DocumentRequest {
            markup: article.content.clone(),
            base_url: article.fetchable_link().map(str::to_string),
            strict: false,
            attachments: article.attachments.clone(),
        };

        let (document, extraction) = match (state, variants.map(|v| &v.alternate)) {
            (VariantState::Original | VariantState::AlternateFallback, _) => {
                (Some(original()), None)
            }
            (
                VariantState::AlternateReady,
                Some(Slot::Settled(AlternateOutcome::Ready(result))),
            ) => {
                let base_url = result
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .or(article.fetchable_link())
                    .map(str::to_string);
                let document = DocumentRequest {
                    markup: result.content.clone(),
                    base_url,
                    strict: true,
                    attachments: article.attachments.clone(),
                };
                (Some(document), Some(ExtractionMeta::from(result)))
            }
            _ => (None, None),
        };

        let notice = match state {
            VariantState::AlternateFallback if !self.notice_dismissed => {
                self.reason().map(str::to_string)
            }
            _ => None,
        };

        let (summary, message) = match (state, variants.map(|v| &v.summary)) {
            (VariantState::SummaryReady, Some(Slot::Settled(SummaryOutcome::Ready(result)))) => {
                (Some(SummaryView::from(result)), None)
            }
            (VariantState::SummaryEmpty, _) => (None, Some(SUMMARY_EMPTY.to_string())),
            (VariantState::SummaryError, _) => (None, self.reason().map(str::to_string)),
            _ => (None, None),
        };

        DetailViewModel {
            article_id: Some(article.id.clone()),
            tab: self.tab,
            state,
            document,
            extraction,
            notice,
            summary,
            message,
            dirty: self.dirty,
        }
    }
}
