use std::sync::Once;

use feedview_core::{
    update, Article, DetailState, Effect, ExtractionResult, FetchFailure, FetchTicket,
    MediaAttachment, Msg, SummaryResult, SummarySource, Tab, VariantState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feedview_logging::initialize_for_tests);
}

fn article(id: &str, link: Option<&str>) -> Article {
    Article {
        id: id.to_string(),
        content: format!("<p>feed body {id}</p>"),
        summary: None,
        link: link.map(str::to_string),
        author: Some("Reporter".to_string()),
        attachments: vec![MediaAttachment {
            mime_type: "image/jpeg".to_string(),
            url: "https://site.com/photo.jpg".to_string(),
            length: None,
        }],
    }
}

fn opened(article: Article) -> DetailState {
    let (state, effects) = update(DetailState::new(), Msg::ArticleOpened(article));
    assert!(effects.is_empty());
    state
}

fn select(state: DetailState, tab: Tab) -> (DetailState, Vec<Effect>) {
    update(state, Msg::TabSelected(tab))
}

fn only_ticket(effects: &[Effect]) -> FetchTicket {
    assert_eq!(effects.len(), 1, "expected exactly one effect: {effects:?}");
    effects[0].ticket().clone()
}

#[test]
fn opening_an_article_shows_original_content() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let view = state.view();

    assert_eq!(view.state, VariantState::Original);
    let document = view.document.expect("original document");
    assert_eq!(document.markup, "<p>feed body a1</p>");
    assert_eq!(document.base_url.as_deref(), Some("https://site.com/story"));
    assert!(!document.strict);
    assert_eq!(document.attachments.len(), 1);
}

#[test]
fn alternate_tab_fetches_by_link_and_renders_strict() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Alternate);

    assert_eq!(
        effects,
        vec![Effect::FetchAlternate {
            ticket: FetchTicket {
                session: state.session(),
                article_id: "a1".to_string(),
            },
            link: "https://site.com/story".to_string(),
        }]
    );
    assert_eq!(state.view().state, VariantState::AlternateLoading);
    assert_eq!(state.view().document, None);

    let ticket = only_ticket(&effects);
    let (state, effects) = update(
        state,
        Msg::AlternateFetched {
            ticket,
            result: Ok(ExtractionResult {
                title: "Story".to_string(),
                content: "<article>clean</article>".to_string(),
                word_count: 812,
                ..ExtractionResult::default()
            }),
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.state, VariantState::AlternateReady);
    let document = view.document.expect("alternate document");
    assert_eq!(document.markup, "<article>clean</article>");
    assert!(document.strict);
    assert_eq!(document.base_url.as_deref(), Some("https://site.com/story"));
    assert_eq!(view.extraction.expect("meta").word_count, 812);
    assert_eq!(view.notice, None);
}

#[test]
fn fallback_result_shows_feed_content_with_notice() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Alternate);
    let ticket = only_ticket(&effects);

    let (state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket,
            result: Ok(ExtractionResult {
                content: "<p>teaser</p>".to_string(),
                fallback: true,
                error: Some("paywall detected".to_string()),
                ..ExtractionResult::default()
            }),
        },
    );

    let view = state.view();
    assert_eq!(view.state, VariantState::AlternateFallback);
    assert_eq!(
        view.notice.as_deref(),
        Some("paywall detected. Showing feed content instead.")
    );
    assert_eq!(view.document.expect("fallback body").markup, "<p>feed body a1</p>");
    assert_eq!(
        state.reason(),
        Some("paywall detected. Showing feed content instead.")
    );
}

#[test]
fn fetch_error_and_fallback_flag_render_the_same_body() {
    init_logging();
    let failures = vec![
        Err(FetchFailure::from_message("connection reset")),
        Err(FetchFailure::default()),
        Ok(ExtractionResult {
            fallback: true,
            ..ExtractionResult::default()
        }),
    ];

    for result in failures {
        let state = opened(article("a1", Some("https://site.com/story")));
        let original = state.view().document;
        let (state, effects) = select(state, Tab::Alternate);
        let ticket = only_ticket(&effects);
        let (state, _) = update(state, Msg::AlternateFetched { ticket, result });

        let view = state.view();
        assert_eq!(view.state, VariantState::AlternateFallback);
        assert_eq!(view.document, original);
    }
}

#[test]
fn fetch_error_without_text_uses_fixed_reason() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Alternate);
    let (state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket: only_ticket(&effects),
            result: Err(FetchFailure::default()),
        },
    );

    assert_eq!(
        state.view().notice.as_deref(),
        Some("Unable to resolve that URL. Showing feed content instead.")
    );
}

#[test]
fn article_without_link_skips_fetch_and_falls_back_silently() {
    init_logging();
    let state = opened(article("a1", None));
    let (state, effects) = select(state, Tab::Alternate);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.state, VariantState::AlternateFallback);
    assert_eq!(view.notice, None);
    assert_eq!(state.reason(), None);
}

#[test]
fn notice_can_be_dismissed() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Alternate);
    let (state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket: only_ticket(&effects),
            result: Err(FetchFailure::from_message("timeout")),
        },
    );
    assert!(state.view().notice.is_some());

    let (state, _) = update(state, Msg::NoticeDismissed);
    assert_eq!(state.view().notice, None);
    assert_eq!(state.view().state, VariantState::AlternateFallback);
}

#[test]
fn summary_states_follow_fetch_outcome() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Summary);
    assert_eq!(
        effects,
        vec![Effect::FetchSummary {
            ticket: FetchTicket {
                session: state.session(),
                article_id: "a1".to_string(),
            },
        }]
    );
    assert_eq!(state.view().state, VariantState::SummaryLoading);

    let (state, _) = update(
        state,
        Msg::SummaryFetched {
            ticket: only_ticket(&effects),
            result: Ok(SummaryResult {
                points: vec!["First".to_string(), "Second".to_string()],
                source: SummarySource::Ai,
                reason: None,
            }),
        },
    );
    let view = state.view();
    assert_eq!(view.state, VariantState::SummaryReady);
    assert_eq!(view.summary.expect("points").points, vec!["First", "Second"]);
    assert_eq!(view.document, None);
}

#[test]
fn empty_summary_is_not_an_error() {
    init_logging();
    let state = opened(article("a1", None));
    let (state, effects) = select(state, Tab::Summary);
    let (state, _) = update(
        state,
        Msg::SummaryFetched {
            ticket: only_ticket(&effects),
            result: Ok(SummaryResult::default()),
        },
    );

    let view = state.view();
    assert_eq!(view.state, VariantState::SummaryEmpty);
    assert_eq!(view.message.as_deref(), Some("No summary points available."));
    assert_eq!(state.reason(), None);
}

#[test]
fn summary_error_prefers_structured_error_text() {
    init_logging();
    let state = opened(article("a1", None));
    let (state, effects) = select(state, Tab::Summary);
    let (state, _) = update(
        state,
        Msg::SummaryFetched {
            ticket: only_ticket(&effects),
            result: Err(FetchFailure {
                error: Some("Model overloaded".to_string()),
                message: Some("Service Unavailable".to_string()),
            }),
        },
    );

    let view = state.view();
    assert_eq!(view.state, VariantState::SummaryError);
    assert_eq!(view.message.as_deref(), Some("Model overloaded"));

    let (state, _) = update(state, Msg::TabSelected(Tab::Original));
    assert_eq!(state.view().state, VariantState::Original);
    assert!(state.view().document.is_some());
}

#[test]
fn summary_error_without_text_uses_fixed_message() {
    init_logging();
    let state = opened(article("a1", None));
    let (state, effects) = select(state, Tab::Summary);
    let (state, _) = update(
        state,
        Msg::SummaryFetched {
            ticket: only_ticket(&effects),
            result: Err(FetchFailure::default()),
        },
    );

    assert_eq!(state.reason(), Some("AI summary unavailable."));
}

#[test]
fn switching_tabs_never_refetches_within_a_session() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, alt_effects) = select(state, Tab::Alternate);
    let (state, sum_effects) = select(state, Tab::Summary);
    assert_eq!(alt_effects.len(), 1);
    assert_eq!(sum_effects.len(), 1);

    // Still pending: reselecting must not start a second fetch.
    let (state, effects) = select(state, Tab::Alternate);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket: only_ticket(&alt_effects),
            result: Ok(ExtractionResult::default()),
        },
    );
    let (state, _) = update(
        state,
        Msg::SummaryFetched {
            ticket: only_ticket(&sum_effects),
            result: Ok(SummaryResult::default()),
        },
    );

    let (state, effects) = select(state, Tab::Original);
    assert!(effects.is_empty());
    let (state, effects) = select(state, Tab::Summary);
    assert!(effects.is_empty());
    assert_eq!(state.view().state, VariantState::SummaryEmpty);
    let (state, effects) = select(state, Tab::Alternate);
    assert!(effects.is_empty());
    assert_eq!(state.view().state, VariantState::AlternateReady);
}

#[test]
fn results_after_close_are_ignored() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/story")));
    let (state, effects) = select(state, Tab::Alternate);
    let ticket = only_ticket(&effects);

    let (state, _) = update(state, Msg::ViewClosed);
    assert_eq!(state.cached_articles(), 0);
    let (state, _) = update(state, Msg::ArticleOpened(article("a1", Some("https://site.com/story"))));
    let (mut state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket,
            result: Ok(ExtractionResult::default()),
        },
    );
    assert!(state.consume_dirty());

    // The stale result must not have populated the reopened session's cache.
    let (state, effects) = select(state, Tab::Alternate);
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().state, VariantState::AlternateLoading);
}

#[test]
fn switching_article_keeps_results_scoped_to_their_article() {
    init_logging();
    let state = opened(article("a1", Some("https://site.com/one")));
    let (state, effects) = select(state, Tab::Alternate);
    let first_ticket = only_ticket(&effects);

    let (state, _) = update(state, Msg::ArticleOpened(article("a2", Some("https://site.com/two"))));
    let (mut state, _) = update(state, Msg::TabSelected(Tab::Alternate));
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::AlternateFetched {
            ticket: first_ticket,
            result: Ok(ExtractionResult {
                content: "<p>one</p>".to_string(),
                ..ExtractionResult::default()
            }),
        },
    );
    assert!(!state.consume_dirty());
    assert_eq!(state.view().state, VariantState::AlternateLoading);

    // Going back to the first article reuses its cached extraction.
    let (state, _) = update(state, Msg::ArticleOpened(article("a1", Some("https://site.com/one"))));
    let (state, effects) = select(state, Tab::Alternate);
    assert!(effects.is_empty());
    assert_eq!(state.view().document.expect("cached").markup, "<p>one</p>");
}

#[test]
fn cache_evicts_oldest_article_past_capacity() {
    init_logging();
    let mut state = DetailState::with_cache_capacity(2);
    for id in ["a1", "a2", "a3"] {
        let (next, _) = update(state, Msg::ArticleOpened(article(id, None)));
        state = next;
    }
    assert_eq!(state.cached_articles(), 2);
}

#[test]
fn tab_selection_without_article_is_ignored() {
    init_logging();
    let (state, effects) = select(DetailState::new(), Tab::Summary);
    assert!(effects.is_empty());
    assert_eq!(state.view().state, VariantState::Original);
    assert_eq!(state.view().document, None);
}
