use std::time::{Duration, Instant};

use book_search::{BookClient, Fetcher, PageController, SearchState};
use reqwest::Url;
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn docs(prefix: &str, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            serde_json::json!({
                "key": format!("/works/{prefix}{i}W"),
                "title": format!("{prefix} {i}"),
                "author_name": ["Frank Herbert"],
                "first_publish_year": 1965
            })
        })
        .collect()
}

fn fetcher_for(server: &MockServer) -> Fetcher {
    let endpoint = Url::parse(&format!("{}/search.json", server.uri())).expect("url");
    Fetcher::new(BookClient::new(endpoint).expect("client"), Handle::current())
}

#[tokio::test(flavor = "multi_thread")]
async fn debounced_query_fetches_once_and_renders_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "dune"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "numFound": 42,
            "docs": docs("OL", 10)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fetcher_for(&server);
    let mut controller = PageController::new(SearchState::default(), Duration::from_millis(300));

    let start = Instant::now();
    controller.on_query_change("d", start);
    controller.on_query_change("du", start + Duration::from_millis(100));
    controller.on_query_change("dune", start + Duration::from_millis(200));

    assert!(controller
        .poll_debounce(start + Duration::from_millis(300))
        .is_none());
    let request = controller
        .poll_debounce(start + Duration::from_millis(500))
        .expect("debounced request");
    fetcher.dispatch(request);

    let outcome = fetcher.next().await.expect("outcome");
    assert!(controller.on_fetch_complete(outcome));

    assert_eq!(controller.total_count(), 42);
    assert_eq!(controller.rows().len(), 10);
    assert!(!controller.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_older_response_cannot_overwrite_newer_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "numFound": 30,
                    "docs": docs("SLOW", 10)
                }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "numFound": 30,
            "docs": docs("FAST", 10)
        })))
        .mount(&server)
        .await;

    let mut fetcher = fetcher_for(&server);
    let mut controller = PageController::new(SearchState::new("dune", 10), Duration::ZERO);

    let slow = controller.fetch().expect("first page");
    fetcher.dispatch(slow);
    let fast = controller.on_page_change(2, 10).expect("second page");
    fetcher.dispatch(fast);

    let mut applied = 0;
    for _ in 0..2 {
        let outcome = fetcher.next().await.expect("outcome");
        if controller.on_fetch_complete(outcome) {
            applied += 1;
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(controller.rows()[0].id, "/works/FAST0W");
    assert_eq!(controller.state().page, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_fetch_keeps_previous_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "dune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "numFound": 3,
            "docs": docs("OL", 3)
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "dune messiah"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let mut fetcher = fetcher_for(&server);
    let mut controller = PageController::new(SearchState::new("dune", 10), Duration::ZERO);

    fetcher.dispatch(controller.fetch().expect("first"));
    controller.on_fetch_complete(fetcher.next().await.expect("first outcome"));
    assert_eq!(controller.rows().len(), 3);

    controller.on_query_change("dune messiah", Instant::now());
    fetcher.dispatch(controller.flush_query().expect("second"));
    let outcome = fetcher.next().await.expect("second outcome");
    assert!(outcome.result.is_err());
    assert!(controller.on_fetch_complete(outcome));

    assert!(!controller.is_loading());
    assert_eq!(controller.rows().len(), 3);
    assert_eq!(controller.total_count(), 3);
}
