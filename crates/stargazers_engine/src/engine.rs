use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_warn};
use stargazers_core::{PageRequest, RequestId};
use tokio_util::sync::CancellationToken;

use crate::fetch::PageFetcher;
use crate::EngineEvent;

enum EngineCommand {
    Fetch(PageRequest),
    Cancel(RequestId),
}

/// Sending half of the engine; cheap to clone and share between threads.
#[derive(Clone)]
pub struct EngineCommands {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineCommands {
    pub fn fetch(&self, request: PageRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch(request));
    }

    pub fn cancel(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel(request_id));
    }
}

/// Runs page fetches on a background tokio runtime.
///
/// Results come back as [`EngineEvent`]s to whoever owns the handle; hand out
/// [`EngineHandle::commands`] to issue work from elsewhere.
pub struct EngineHandle {
    commands: EngineCommands,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("stargazers-engine".to_string())
            .spawn(move || {
                // Paging is sequential, so one in-flight request at a time.
                let mut in_flight: Option<(RequestId, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Fetch(request) => {
                            let token = CancellationToken::new();
                            in_flight = Some((request.request_id, token.clone()));
                            let fetcher = fetcher.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                handle_fetch(fetcher.as_ref(), request, token, event_tx).await;
                            });
                        }
                        EngineCommand::Cancel(request_id) => match &in_flight {
                            Some((current, token)) if *current == request_id => {
                                engine_debug!("cancelling request_id={}", request_id);
                                token.cancel();
                                in_flight = None;
                            }
                            _ => {}
                        },
                    }
                }
            })?;

        Ok(Self {
            commands: EngineCommands { cmd_tx },
            event_rx,
        })
    }

    pub fn commands(&self) -> EngineCommands {
        self.commands.clone()
    }

    pub fn fetch(&self, request: PageRequest) {
        self.commands.fetch(request);
    }

    pub fn cancel(&self, request_id: RequestId) {
        self.commands.cancel(request_id);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_fetch(
    fetcher: &dyn PageFetcher,
    request: PageRequest,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let request_id = request.request_id;
    let Some(result) = token.run_until_cancelled(fetcher.fetch_page(&request)).await else {
        engine_debug!("request_id={} cancelled before completion", request_id);
        return;
    };
    if let Err(err) = &result {
        engine_warn!(
            "request_id={} for {} failed: {}",
            request_id,
            request.target,
            err
        );
    }
    let _ = event_tx.send(EngineEvent::PageFetched {
        request_id,
        target: request.target,
        result,
    });
}
