mod common;

use common::{init_tracing, test_config};
use nest_tracker::{
    ApiSubmitter, BrowseRequest, ItemFilter, ItemObservation, NestApiClient, ObservationSink, TrackerError,
    TransformedState,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, NestApiClient) {
    init_tracing();
    let server = MockServer::start().await;
    let client = NestApiClient::new(test_config(&server.uri())).expect("client builds");
    (server, client)
}

fn page_body() -> serde_json::Value {
    json!([
        { "itemId": 5070, "transformedState": "yes" },
        { "itemId": 1511, "transformedState": "unknown" },
    ])
}

#[tokio::test]
async fn filtered_listing_sends_paging_and_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "2"))
        .and(query_param("size", "28"))
        .and(query_param("transformedState", "no"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "61")
                .set_body_json(page_body()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .load_items_with_filter(ItemFilter::NotTransformed, 2, 28)
        .await
        .unwrap();

    assert_eq!(page.total, 61);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].item_id, 5070);
    assert_eq!(page.items[0].transformed_state, TransformedState::Yes);
    assert_eq!(page.items[1].item_name, None);
}

#[tokio::test]
async fn all_filter_omits_state_parameter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "0"))
        .and(query_param_is_missing("transformedState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .load(&BrowseRequest::Filtered {
            filter: ItemFilter::All,
            page: 0,
            size: 28,
        })
        .await
        .unwrap();

    // No header: total defaults to zero.
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn lookup_by_id_and_random_sample() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("itemId", "5070"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "itemId": 5070, "transformedState": "yes" }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .and(query_param("count", "28"))
        .and(query_param("transformedState", "unknown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let by_id = client.load(&BrowseRequest::ById(5070)).await.unwrap();
    assert_eq!(by_id.items.len(), 1);

    let random = client.load_random_unknown_items(28).await.unwrap();
    assert_eq!(random.items.len(), 2);
}

#[tokio::test]
async fn unfiltered_listing_hits_base_url() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "not-a-number")
                .set_body_json(page_body()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client.load(&BrowseRequest::Everything).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .mount(&server)
        .await;

    let page = client.load_items().await.unwrap();
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.load_items_by_id(1).await.unwrap_err();
    assert!(matches!(err, TrackerError::Status { status: 404, .. }));
}

#[tokio::test]
async fn malformed_body_is_a_serialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.load_items().await.unwrap_err();
    assert!(matches!(err, TrackerError::Serialization(_)));
}

#[tokio::test]
async fn submit_posts_observation_once() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({ "itemId": 995, "transformed": true })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client.submit(&ItemObservation::new(995, true)).await.unwrap();
}

#[tokio::test]
async fn failed_submit_is_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.submit(&ItemObservation::new(995, false)).await.unwrap_err();
    assert!(matches!(err, TrackerError::Status { status: 500, .. }));
}

#[tokio::test]
async fn submitter_reports_outcome_without_propagating_errors() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "itemId": 1513, "transformed": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_json(json!({ "itemId": 666, "transformed": false })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = ApiSubmitter::current(Arc::new(client));
    assert!(submitter.spawn_submit(ItemObservation::new(1513, false)).await.unwrap());
    assert!(!submitter.spawn_submit(ItemObservation::new(666, false)).await.unwrap());
}

#[tokio::test]
async fn fire_and_forget_submissions_can_be_flushed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let submitter = ApiSubmitter::current(Arc::new(client));
    submitter.submit(ItemObservation::new(995, true));
    submitter.submit(ItemObservation::new(1511, false));
    submitter.flush().await;

    assert_eq!(submitter.in_flight(), 0);
}
