use feedview_logging::{feed_debug, feed_info, feed_warn};

use crate::state::Slot;
use crate::{
    fallback_notice, AlternateOutcome, DetailState, Effect, Msg, SummaryOutcome, Tab,
    ALTERNATE_UNAVAILABLE, SUMMARY_UNAVAILABLE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: DetailState, msg: Msg) -> (DetailState, Vec<Effect>) {
    let effects = match msg {
        Msg::ArticleOpened(article) => {
            feed_debug!("article opened id={} session={}", article.id, state.session());
            state.open_article(article);
            Vec::new()
        }
        Msg::TabSelected(tab) => select_tab(&mut state, tab),
        Msg::AlternateFetched { ticket, result } => {
            if !state.accepts(&ticket) {
                feed_debug!(
                    "ignoring stale alternate result article={} session={}",
                    ticket.article_id,
                    ticket.session
                );
                return (state, Vec::new());
            }
            let outcome = match result {
                Ok(extraction) if !extraction.fallback => AlternateOutcome::Ready(extraction),
                Ok(extraction) => {
                    feed_info!(
                        "alternate extraction fell back article={} error={:?}",
                        ticket.article_id,
                        extraction.error
                    );
                    let notice = extraction
                        .error
                        .as_deref()
                        .map(str::trim)
                        .filter(|error| !error.is_empty())
                        .map(fallback_notice);
                    AlternateOutcome::Fallback { notice }
                }
                Err(failure) => {
                    feed_warn!(
                        "alternate extraction failed article={} failure={:?}",
                        ticket.article_id,
                        failure
                    );
                    AlternateOutcome::Fallback {
                        notice: Some(fallback_notice(&failure.reason_or(ALTERNATE_UNAVAILABLE))),
                    }
                }
            };
            if let Some(variants) = state.cache.get_mut(&ticket.article_id) {
                variants.alternate = Slot::Settled(outcome);
            }
            if state.is_current(&ticket.article_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SummaryFetched { ticket, result } => {
            if !state.accepts(&ticket) {
                feed_debug!(
                    "ignoring stale summary result article={} session={}",
                    ticket.article_id,
                    ticket.session
                );
                return (state, Vec::new());
            }
            let outcome = match result {
                Ok(summary) if summary.has_points() => SummaryOutcome::Ready(summary),
                Ok(_) => SummaryOutcome::Empty,
                Err(failure) => {
                    feed_warn!(
                        "summary failed article={} failure={:?}",
                        ticket.article_id,
                        failure
                    );
                    SummaryOutcome::Failed(failure.reason_or(SUMMARY_UNAVAILABLE))
                }
            };
            if let Some(variants) = state.cache.get_mut(&ticket.article_id) {
                variants.summary = Slot::Settled(outcome);
            }
            if state.is_current(&ticket.article_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::ViewClosed => {
            feed_debug!("view closed session={}", state.session());
            state.close();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn select_tab(state: &mut DetailState, tab: Tab) -> Vec<Effect> {
    let Some(article) = state.article().cloned() else {
        return Vec::new();
    };
    state.select_tab(tab);
    let ticket = state.ticket_for(&article.id);
    let link = article.fetchable_link().map(str::to_string);
    let variants = state.cache.ensure(&article.id);

    match tab {
        Tab::Original => Vec::new(),
        Tab::Alternate => {
            if !matches!(variants.alternate, Slot::Idle) {
                return Vec::new();
            }
            match link {
                Some(link) => {
                    variants.alternate = Slot::Pending;
                    vec![Effect::FetchAlternate { ticket, link }]
                }
                None => {
                    feed_debug!("article {} has no link; alternate skipped", article.id);
                    variants.alternate =
                        Slot::Settled(AlternateOutcome::Fallback { notice: None });
                    Vec::new()
                }
            }
        }
        Tab::Summary => match variants.summary {
            Slot::Idle => {
                variants.summary = Slot::Pending;
                vec![Effect::FetchSummary { ticket }]
            }
            _ => Vec::new(),
        },
    }
}
