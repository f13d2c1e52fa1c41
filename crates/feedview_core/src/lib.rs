//! Feedview core: article data model and the content variant state machine.
mod effect;
mod model;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, FetchTicket};
pub use model::{
    fallback_notice, Article, ArticleId, ExtractionResult, FetchFailure, MediaAttachment,
    SummaryResult, SummarySource, ALTERNATE_UNAVAILABLE, FEED_CONTENT_SUFFIX, SUMMARY_EMPTY,
    SUMMARY_UNAVAILABLE,
};
pub use msg::Msg;
pub use state::{
    AlternateOutcome, DetailState, SessionId, SummaryOutcome, Tab, VariantState,
    DEFAULT_CACHE_CAPACITY,
};
pub use update::update;
pub use view_model::{DetailViewModel, DocumentRequest, ExtractionMeta, SummaryView};
