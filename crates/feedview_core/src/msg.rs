use crate::{Article, ExtractionResult, FetchFailure, FetchTicket, SummaryResult, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The detail view now shows this article.
    ArticleOpened(Article),
    /// User picked one of the content tabs.
    TabSelected(Tab),
    /// Alternate-extraction fetch finished.
    AlternateFetched {
        ticket: FetchTicket,
        result: Result<ExtractionResult, FetchFailure>,
    },
    /// Summary fetch finished.
    SummaryFetched {
        ticket: FetchTicket,
        result: Result<SummaryResult, FetchFailure>,
    },
    /// User dismissed the fallback notice.
    NoticeDismissed,
    /// Detail view closed; in-flight results are ignored from here on.
    ViewClosed,
    /// Fallback for placeholder wiring.
    NoOp,
}
