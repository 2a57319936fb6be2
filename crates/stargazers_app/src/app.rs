use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use engine_logging::engine_info;
use stargazers_core::{update, AppState, AppViewModel, Msg, Phase, RepoTarget};
use stargazers_engine::GithubGraphqlFetcher;

use crate::cli::{Cli, OutputFormat};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render;

const TICK_INTERVAL: Duration = Duration::from_millis(75);
/// Typed on stdin, resumes a stopped aggregation from its last cursor.
const RETRY_COMMAND: &str = ":retry";

pub enum AppEvent {
    Core(Msg),
    /// No further target edits will arrive.
    InputClosed,
}

/// Runs until input is closed and the last target has stopped.
///
/// Returns whether the final aggregation completed.
pub fn run_app(cli: &Cli, config: &AppConfig) -> anyhow::Result<bool> {
    let fetcher = GithubGraphqlFetcher::new(config.fetch_settings(cli.token.clone()))
        .context("invalid fetch settings")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(Arc::new(fetcher), event_tx.clone())?;

    let mut state = AppState::with_quiescence(config.quiescence());
    state = update(state, Msg::RankingChanged(cli.ranking())).0;

    match &cli.target {
        Some(target) => {
            // A command-line target is already settled.
            let at = Instant::now()
                .checked_sub(config.quiescence())
                .unwrap_or_else(Instant::now);
            let _ = event_tx.send(AppEvent::Core(Msg::InputChanged {
                text: target.clone(),
                at,
            }));
            let _ = event_tx.send(AppEvent::InputClosed);
        }
        None => spawn_stdin_reader(event_tx.clone())?,
    }
    spawn_ticker(event_tx)?;

    let mut input_open = true;
    let mut last_status: Option<String> = None;
    let mut last_reported: Option<(Option<RepoTarget>, Phase, usize)> = None;

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::InputClosed => input_open = false,
            AppEvent::Core(msg) => {
                let (next, effects) = update(std::mem::take(&mut state), msg);
                state = next;
                runner.run(effects);

                if state.consume_dirty() {
                    let view = state.view();
                    if let Some(line) = render::status_line(&view) {
                        if last_status.as_ref() != Some(&line) {
                            eprintln!("{line}");
                            last_status = Some(line);
                        }
                    }
                    if matches!(view.phase, Phase::Complete | Phase::Error) {
                        let key = (view.target.clone(), view.phase, view.pages_merged);
                        if last_reported.as_ref() != Some(&key) {
                            report(&view, cli)?;
                            last_reported = Some(key);
                        }
                    }
                }
            }
        }

        if !input_open && is_settled(&state) {
            break;
        }
    }

    let view = state.view();
    engine_info!("finished in phase {:?}", view.phase);
    Ok(view.phase == Phase::Complete && view.validation_error.is_none())
}

fn is_settled(state: &AppState) -> bool {
    !state.selector().is_settling() && !state.controller().is_pending()
}

fn report(view: &AppViewModel, cli: &Cli) -> anyhow::Result<()> {
    let output = match cli.format {
        OutputFormat::Table => render::table(view, cli.top),
        OutputFormat::Json => {
            let mut json = render::json(view, cli.top).context("failed to serialize result")?;
            json.push('\n');
            json
        }
    };
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write result")
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("stargazers-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(text) = line else { break };
                let msg = input_msg(text, Instant::now());
                if event_tx.send(AppEvent::Core(msg)).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })
        .context("failed to spawn input reader")?;
    Ok(())
}

fn input_msg(line: String, at: Instant) -> Msg {
    if line.trim() == RETRY_COMMAND {
        Msg::RetryRequested
    } else {
        Msg::InputChanged { text: line, at }
    }
}

/// Clock ticks settle pending target edits.
fn spawn_ticker(event_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("stargazers-tick".to_string())
        .spawn(move || {
            while event_tx
                .send(AppEvent::Core(Msg::Tick {
                    now: Instant::now(),
                }))
                .is_ok()
            {
                thread::sleep(TICK_INTERVAL);
            }
        })
        .context("failed to spawn ticker")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_line_requests_a_retry() {
        let at = Instant::now();
        assert_eq!(input_msg(" :retry ".to_string(), at), Msg::RetryRequested);
    }

    #[test]
    fn other_lines_are_target_edits() {
        let at = Instant::now();
        assert_eq!(
            input_msg("acme/widgets".to_string(), at),
            Msg::InputChanged {
                text: "acme/widgets".to_string(),
                at,
            }
        );
        assert_eq!(
            input_msg("retry".to_string(), at),
            Msg::InputChanged {
                text: "retry".to_string(),
                at,
            }
        );
    }
}
