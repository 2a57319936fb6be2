use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use engine_logging::{engine_debug, engine_info};
use stargazers_core::{Effect, FetchFailure, Msg};
use stargazers_engine::{EngineCommands, EngineEvent, EngineHandle, PageFetcher};

use crate::app::AppEvent;

/// Hands core effects to the engine and feeds engine results back as messages.
pub struct EffectRunner {
    engine: EngineCommands,
}

impl EffectRunner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(fetcher).context("failed to start fetch engine")?;
        let commands = engine.commands();
        spawn_event_loop(engine, event_tx)?;
        Ok(Self { engine: commands })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => {
                    engine_info!(
                        "FetchPage request_id={} target={} cursor={:?}",
                        request.request_id,
                        request.target,
                        request.cursor
                    );
                    self.engine.fetch(request);
                }
                Effect::CancelFetch { request_id } => {
                    engine_debug!("CancelFetch request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }
}

/// The event loop owns the engine's receiving half.
fn spawn_event_loop(
    engine: EngineHandle,
    event_tx: mpsc::Sender<AppEvent>,
) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("stargazers-events".to_string())
        .spawn(move || {
            while let Some(event) = engine.recv() {
                let msg = match event {
                    EngineEvent::PageFetched {
                        request_id,
                        target,
                        result,
                    } => Msg::PageFetched {
                        request_id,
                        target,
                        result: result.map_err(FetchFailure::from),
                    },
                };
                if event_tx.send(AppEvent::Core(msg)).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn engine event loop")?;
    Ok(())
}
