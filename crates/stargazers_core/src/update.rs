use std::time::Instant;

use engine_logging::{engine_debug, engine_info};

use crate::{Acceptance, AppState, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged { text, at } => {
            state.selector.edit(text, at);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick { now } => settle_target(&mut state, now),
        Msg::PageFetched {
            request_id,
            target,
            result,
        } => match state.controller.accept(request_id, &target, result) {
            Acceptance::Stale => Vec::new(),
            Acceptance::Accepted => {
                state.mark_dirty();
                state
                    .controller
                    .advance()
                    .map(Effect::FetchPage)
                    .into_iter()
                    .collect()
            }
        },
        Msg::RankingChanged(ranking) => {
            if state.ranking != ranking {
                state.ranking = ranking;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RetryRequested => match state.controller.retry() {
            Some(request) => {
                engine_info!("retrying {} from cursor {:?}", request.target, request.cursor);
                state.mark_dirty();
                vec![Effect::FetchPage(request)]
            }
            None => Vec::new(),
        },
    };

    (state, effects)
}

fn settle_target(state: &mut AppState, now: Instant) -> Vec<Effect> {
    let Some(settled) = state.selector.poll(now) else {
        return Vec::new();
    };
    state.mark_dirty();

    let target = match settled {
        Ok(target) => target,
        Err(err) => {
            engine_info!("ignoring target input: {}", err);
            state.validation_error = Some(err);
            return Vec::new();
        }
    };
    state.validation_error = None;

    // Re-entering the active target only restarts a stopped aggregation.
    if state.controller.target() == Some(&target) && state.controller.phase() != Phase::Error {
        engine_debug!("target {} unchanged", target);
        return Vec::new();
    }

    engine_info!("aggregating stargazers of {}", target);
    let (request, superseded) = state.controller.start(target);
    let mut effects = Vec::with_capacity(2);
    if let Some(request_id) = superseded {
        effects.push(Effect::CancelFetch { request_id });
    }
    effects.push(Effect::FetchPage(request));
    effects
}
