use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use stargazers_core::{PageRequest, RepoTarget};
use stargazers_engine::{
    decode_response, FailureKind, FetchSettings, GithubGraphqlFetcher, OwnershipPolicy,
    PageFetcher,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> FetchSettings {
    FetchSettings {
        endpoint: format!("{}/graphql", server.uri()),
        token: Some("test-token".to_string()),
        ..FetchSettings::default()
    }
}

fn request(cursor: Option<&str>) -> PageRequest {
    PageRequest {
        request_id: 1,
        target: RepoTarget::parse("acme/widgets").unwrap(),
        cursor: cursor.map(ToOwned::to_owned),
    }
}

fn stargazers_body() -> serde_json::Value {
    json!({
        "data": {
            "repository": {
                "stargazers": {
                    "pageInfo": {
                        "endCursor": "Y3Vyc29yOjI=",
                        "startCursor": "Y3Vyc29yOjE=",
                        "hasNextPage": true,
                        "hasPreviousPage": false
                    },
                    "edges": [{
                        "node": {
                            "id": "U_1",
                            "login": "octocat",
                            "avatarUrl": "https://avatars.example.com/u/1",
                            "url": "https://github.com/octocat",
                            "followers": { "totalCount": 10 },
                            "repositories": { "edges": [{ "node": {
                                "name": "hello-world",
                                "languages": { "edges": [{ "node": { "name": "Go" } }] },
                                "stargazers": { "totalCount": 80 },
                                "watchers": { "totalCount": 8 },
                                "forks": { "totalCount": 3 }
                            }}]}
                        }
                    }]
                }
            }
        }
    })
}

#[tokio::test]
async fn fetcher_posts_variables_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "bearer test-token"))
        .and(body_partial_json(json!({
            "variables": { "owner": "acme", "repoName": "widgets", "endCursor": "abc" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stargazers_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(settings(&server)).unwrap();
    let page = fetcher.fetch_page(&request(Some("abc"))).await.expect("page");

    let info = page.page_info.expect("page info");
    assert_eq!(info.end_cursor.as_deref(), Some("Y3Vyc29yOjI="));
    assert_eq!(info.has_next_page, Some(true));
    assert_eq!(page.edges.len(), 1);
    let user = page.edges[0].node.as_ref().unwrap();
    assert_eq!(user.login.as_deref(), Some("octocat"));
}

#[tokio::test]
async fn first_page_sends_null_cursor_and_configured_policy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": { "owner": "acme", "repoName": "widgets", "endCursor": null }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stargazers_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(FetchSettings {
        ownership: OwnershipPolicy::Affiliated,
        ..settings(&server)
    })
    .unwrap();
    fetcher.fetch_page(&request(None)).await.expect("page");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("ownerAffiliations: [OWNER, COLLABORATOR, ORGANIZATION_MEMBER]"));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
}

#[tokio::test]
async fn graphql_not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": null },
            "errors": [{
                "type": "NOT_FOUND",
                "message": "Could not resolve to a Repository with the name 'acme/widgets'."
            }]
        })))
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert!(err.message.contains("Could not resolve"));
}

#[test]
fn null_repository_without_errors_is_not_found() {
    let body = br#"{"data":{"repository":null}}"#;
    let err = decode_response(body).unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}

#[test]
fn repository_without_stargazers_is_a_decode_failure() {
    let body = br#"{"data":{"repository":{}}}"#;
    let err = decode_response(body).unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[test]
fn decode_response_unwraps_the_stargazers_connection() {
    let body = serde_json::to_vec(&stargazers_body()).unwrap();
    let page = decode_response(&body).unwrap();
    assert_eq!(page.edges.len(), 1);
    assert_eq!(
        page.page_info.and_then(|info| info.end_cursor).as_deref(),
        Some("Y3Vyc29yOjI=")
    );
}

#[tokio::test]
async fn other_graphql_errors_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [
                { "type": "RATE_LIMITED", "message": "API rate limit exceeded" },
                { "message": "second" }
            ]
        })))
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::GraphQl);
    assert_eq!(err.message, "API rate limit exceeded; second");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(stargazers_body()),
        )
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..settings(&server)
    })
    .unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stargazers_body()))
        .mount(&server)
        .await;

    let fetcher = GithubGraphqlFetcher::new(FetchSettings {
        max_bytes: 16,
        ..settings(&server)
    })
    .unwrap();
    let err = fetcher.fetch_page(&request(None)).await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 16, .. }
    ));
}

#[test]
fn invalid_endpoint_is_rejected_up_front() {
    let err = GithubGraphqlFetcher::new(FetchSettings {
        endpoint: "not a url".to_string(),
        ..FetchSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
