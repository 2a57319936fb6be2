use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use stargazers_core::{PageRequest, RawPage, RepoTarget, RequestId};
use stargazers_engine::{EngineEvent, EngineHandle, FailureKind, FetchError, PageFetcher};

type Scripted = (Duration, Result<RawPage, FetchError>);

/// Canned results per request id, each delivered after its delay; requests
/// without one never resolve.
struct ScriptedFetcher {
    script: Mutex<HashMap<RequestId, Scripted>>,
}

impl ScriptedFetcher {
    fn new(script: Vec<(RequestId, Scripted)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        let next = self.script.lock().unwrap().remove(&request.request_id);
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => std::future::pending::<Result<RawPage, FetchError>>().await,
        }
    }
}

fn request(id: u64, target: &str) -> PageRequest {
    PageRequest {
        request_id: id,
        target: RepoTarget::parse(target).unwrap(),
        cursor: None,
    }
}

fn last_page() -> RawPage {
    serde_json::from_value(json!({
        "pageInfo": { "endCursor": null, "hasNextPage": false },
        "edges": []
    }))
    .unwrap()
}

fn recv_within(engine: &EngineHandle, timeout: Duration) -> Option<EngineEvent> {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if let Some(event) = engine.try_recv() {
            return Some(event);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn engine_reports_results_with_request_identity() {
    let fetcher = ScriptedFetcher::new(vec![(3, (Duration::ZERO, Ok(last_page())))]);
    let engine = EngineHandle::new(fetcher).unwrap();

    engine.fetch(request(3, "acme/widgets"));
    let event = engine.recv().expect("event");

    assert_eq!(
        event,
        EngineEvent::PageFetched {
            request_id: 3,
            target: RepoTarget::parse("acme/widgets").unwrap(),
            result: Ok(last_page()),
        }
    );
}

#[test]
fn cancelled_request_reports_nothing() {
    let failure = FetchError {
        kind: FailureKind::Network,
        message: "connection reset".to_string(),
    };
    let fetcher = ScriptedFetcher::new(vec![
        (1, (Duration::from_millis(150), Ok(last_page()))),
        (2, (Duration::ZERO, Err(failure.clone()))),
    ]);
    let engine = EngineHandle::new(fetcher).unwrap();

    engine.fetch(request(1, "acme/widgets"));
    engine.cancel(1);
    engine.fetch(request(2, "acme/gadgets"));

    let event = recv_within(&engine, Duration::from_secs(2)).expect("second request reports");
    assert_eq!(
        event,
        EngineEvent::PageFetched {
            request_id: 2,
            target: RepoTarget::parse("acme/gadgets").unwrap(),
            result: Err(failure),
        }
    );
    // Well past the first request's delay.
    assert_eq!(recv_within(&engine, Duration::from_millis(500)), None);
}

#[test]
fn uncancelled_slow_request_still_reports() {
    let fetcher =
        ScriptedFetcher::new(vec![(1, (Duration::from_millis(150), Ok(last_page())))]);
    let engine = EngineHandle::new(fetcher).unwrap();

    engine.fetch(request(1, "acme/widgets"));
    engine.cancel(7);

    let event = recv_within(&engine, Duration::from_secs(2)).expect("slow request reports");
    assert!(matches!(
        event,
        EngineEvent::PageFetched { request_id: 1, result: Ok(_), .. }
    ));
}

#[test]
fn commands_issued_from_another_thread_report_to_the_handle() {
    let fetcher = ScriptedFetcher::new(vec![(4, (Duration::ZERO, Ok(last_page())))]);
    let engine = EngineHandle::new(fetcher).unwrap();
    let commands = engine.commands();

    std::thread::spawn(move || commands.fetch(request(4, "acme/widgets")))
        .join()
        .unwrap();

    let event = recv_within(&engine, Duration::from_secs(2)).expect("event");
    assert!(matches!(event, EngineEvent::PageFetched { request_id: 4, .. }));
}
