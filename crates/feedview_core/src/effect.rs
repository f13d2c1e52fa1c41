use crate::{ArticleId, SessionId};

/// Identifies which view session and article a fetch belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub session: SessionId,
    pub article_id: ArticleId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchAlternate { ticket: FetchTicket, link: String },
    FetchSummary { ticket: FetchTicket },
}

impl Effect {
    pub fn ticket(&self) -> &FetchTicket {
        match self {
            Effect::FetchAlternate { ticket, .. } | Effect::FetchSummary { ticket } => ticket,
        }
    }
}
