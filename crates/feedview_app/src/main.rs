mod config;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use feedview_core::{update, Article, DetailState, DetailViewModel, MediaAttachment, Msg, Tab};
use feedview_engine::{normalize, normalize_request, EngineHandle, HttpContentService};
use feedview_logging::{feed_info, feed_warn};

use crate::config::{AppConfig, DEFAULT_CONFIG_FILENAME};

/// Extra wait beyond the request timeout before giving up on a fetch.
const EVENT_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize feed articles and render their content variants")]
struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the normalization pipeline over an article's own content.
    Normalize {
        /// Article JSON file.
        #[arg(long)]
        article: PathBuf,
        /// Also drop vector images and inline svg.
        #[arg(long)]
        strict: bool,
    },
    /// Open an article in the detail view and render one tab.
    View {
        #[arg(long)]
        article: PathBuf,
        #[arg(long, value_enum, default_value_t = TabArg::Original)]
        tab: TabArg,
        /// Hide the fallback notice before rendering.
        #[arg(long)]
        dismiss_notice: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabArg {
    Original,
    Alternate,
    Summary,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Original => Tab::Original,
            TabArg::Alternate => Tab::Alternate,
            TabArg::Summary => Tab::Summary,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    logging::initialize(config.log_destination, cli.verbose);

    match cli.command {
        Command::Normalize { article, strict } => {
            let article = read_article(&article)?;
            let document = normalize(
                &article.content,
                article.fetchable_link(),
                &article.attachments,
                strict,
            );
            let (html, attachments) = document.into_parts();
            println!("{html}");
            print_attachments(&attachments);
        }
        Command::View {
            article,
            tab,
            dismiss_notice,
        } => {
            let article = read_article(&article)?;
            let view = run_view(&config, article, tab.into(), dismiss_notice)?;
            print_view(&view);
        }
    }
    Ok(())
}

fn read_article(path: &Path) -> Result<Article> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing article JSON in {path:?}"))
}

/// Drives the controller until every fetch it requested has completed.
fn run_view(
    config: &AppConfig,
    article: Article,
    tab: Tab,
    dismiss_notice: bool,
) -> Result<DetailViewModel> {
    let settings = config.service_settings();
    let wait = settings.request_timeout + EVENT_GRACE;
    let service = HttpContentService::new(settings)?;
    let engine = EngineHandle::new(Arc::new(service)).context("starting fetch runtime")?;

    let mut state = DetailState::with_cache_capacity(config.cache_capacity);
    let mut pending = 0usize;
    let mut messages = vec![Msg::ArticleOpened(article), Msg::TabSelected(tab)];
    if dismiss_notice {
        messages.push(Msg::NoticeDismissed);
    }

    for msg in messages {
        let (next, effects) = update(state, msg);
        state = next;
        pending += effects.len();
        engine.execute(effects);
        while pending > 0 {
            let Some(event) = engine.recv_timeout(wait) else {
                feed_warn!("gave up waiting for {pending} fetch(es)");
                pending = 0;
                break;
            };
            pending -= 1;
            let (next, effects) = update(state, event.into_msg());
            state = next;
            pending += effects.len();
            engine.execute(effects);
        }
    }

    if state.consume_dirty() {
        feed_info!("rendering {:?} in state {:?}", state.tab(), state.variant_state());
    }
    Ok(state.view())
}

fn print_view(view: &DetailViewModel) {
    println!("state: {:?}", view.state);
    if let Some(notice) = &view.notice {
        println!("notice: {notice}");
    }
    if let Some(meta) = &view.extraction {
        println!("title: {}", meta.title);
        if let Some(byline) = &meta.byline {
            println!("byline: {byline}");
        }
        if let Some(site_name) = &meta.site_name {
            println!("site: {site_name}");
        }
        println!("words: {}", meta.word_count);
    }
    if let Some(request) = &view.document {
        let (html, attachments) = normalize_request(request).into_parts();
        println!("{html}");
        print_attachments(&attachments);
    }
    if let Some(summary) = &view.summary {
        println!("summary ({:?}):", summary.source);
        for point in &summary.points {
            println!("  - {point}");
        }
        if let Some(reason) = &summary.reason {
            println!("note: {reason}");
        }
    }
    if let Some(message) = &view.message {
        println!("{message}");
    }
}

fn print_attachments(attachments: &[MediaAttachment]) {
    for attachment in attachments {
        match attachment.length {
            Some(length) => println!(
                "attachment: {} ({}, {length} bytes)",
                attachment.url, attachment.mime_type
            ),
            None => println!("attachment: {} ({})", attachment.url, attachment.mime_type),
        }
    }
}
