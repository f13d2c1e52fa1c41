use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use feedview_core::{Effect, ExtractionResult, FetchFailure, FetchTicket, Msg, SummaryResult};
use feedview_logging::{feed_debug, feed_warn};

use crate::service::ContentService;

/// Completion of a fetch started by an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AlternateFetched {
        ticket: FetchTicket,
        result: Result<ExtractionResult, FetchFailure>,
    },
    SummaryFetched {
        ticket: FetchTicket,
        result: Result<SummaryResult, FetchFailure>,
    },
}

impl EngineEvent {
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::AlternateFetched { ticket, result } => {
                Msg::AlternateFetched { ticket, result }
            }
            EngineEvent::SummaryFetched { ticket, result } => Msg::SummaryFetched { ticket, result },
        }
    }
}

/// Runs fetch effects on a background runtime and hands back completions.
///
/// Fetches are never cancelled; the controller ignores results that arrive
/// for a closed view.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<Effect>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(service: Arc<dyn ContentService>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<Effect>();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(effect) = cmd_rx.recv() {
                let service = service.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = run_effect(service.as_ref(), effect).await;
                    let _ = event_tx.send(event);
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            feed_debug!("executing {effect:?}");
            if self.cmd_tx.send(effect).is_err() {
                feed_warn!("engine worker is gone; effect dropped");
            }
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run_effect(service: &dyn ContentService, effect: Effect) -> EngineEvent {
    match effect {
        Effect::FetchAlternate { ticket, link } => {
            let result = service
                .fetch_alternate(&link)
                .await
                .map_err(|err| err.into_failure());
            EngineEvent::AlternateFetched { ticket, result }
        }
        Effect::FetchSummary { ticket } => {
            let result = service
                .fetch_summary(&ticket.article_id)
                .await
                .map_err(|err| err.into_failure());
            EngineEvent::SummaryFetched { ticket, result }
        }
    }
}
