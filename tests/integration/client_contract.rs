//! HTTP contract tests: what goes on the wire and how replies are classified.

use serde_json::json;

use medq::display::{ResponseView, FALLBACK_REJECTED, FALLBACK_STATUS, FALLBACK_UNEXPECTED};
use medq::query::{QueryFailure, QueryRequest};

use crate::fixtures::{kawasaki_reply, Reply, StubBackend};

#[tokio::test]
async fn test_posts_trimmed_query_as_json() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let request = QueryRequest::new("  What is Kawasaki disease?\n\n").unwrap();

    stub.client().submit(&request).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1, "exactly one POST per submission");
    assert!(requests[0]
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json")));
    assert_eq!(
        stub.bodies()[0],
        json!({ "query": "What is Kawasaki disease?" })
    );
}

#[tokio::test]
async fn test_kawasaki_reply_renders_route_label_and_steps() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let request = QueryRequest::new("kawasaki").unwrap();

    let resp = stub.client().submit(&request).await.unwrap();
    let view = ResponseView::from_response(&resp);

    assert_eq!(view.route, "Medical Q&A Database");
    assert_eq!(view.source, "medical_qa_db");
    assert_eq!(view.relevance, "yes");
    assert_eq!(
        view.steps,
        vec!["router", "retrieve_qna", "grade_documents"]
    );
}

#[tokio::test]
async fn test_success_with_null_fields_uses_placeholders() {
    // Shape the reference backend sends when the graph produced nothing
    let stub = StubBackend::start(Reply::json(
        200,
        json!({
            "success": true,
            "route": null,
            "source": null,
            "is_relevant": null,
            "response": null,
            "workflow_steps": null,
        }),
    ))
    .await;

    let resp = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap();
    let text = ResponseView::from_response(&resp).to_plain_text();

    assert!(text.contains("Route:     -"));
    assert!(text.contains("No response generated"));
    assert!(text.contains("No workflow steps recorded"));
}

#[tokio::test]
async fn test_server_error_prefers_server_text() {
    let stub = StubBackend::start(Reply::json(
        500,
        json!({ "success": false, "error": "Graph execution failed" }),
    ))
    .await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert_eq!(
        failure,
        QueryFailure::Status {
            status: 500,
            error: Some("Graph execution failed".to_string())
        }
    );
    assert_eq!(failure.user_message(), "Graph execution failed");
}

#[tokio::test]
async fn test_bad_request_without_error_uses_status_fallback() {
    let stub = StubBackend::start(Reply::json(400, json!({}))).await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(failure, QueryFailure::Status { status: 400, .. }));
    assert_eq!(failure.user_message(), FALLBACK_STATUS);
}

#[tokio::test]
async fn test_gateway_error_page_is_unexpected() {
    let stub = StubBackend::start(Reply::raw(502, "<html>Bad Gateway</html>")).await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(failure, QueryFailure::Decode(_)));
    assert_eq!(failure.user_message(), FALLBACK_UNEXPECTED);
}

#[tokio::test]
async fn test_non_2xx_wins_over_success_flag() {
    let stub = StubBackend::start(Reply::json(503, json!({ "success": true }))).await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert_eq!(failure.user_message(), FALLBACK_STATUS);
}

#[tokio::test]
async fn test_success_false_is_rejected() {
    let stub = StubBackend::start(Reply::json(200, json!({ "success": false }))).await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert_eq!(failure, QueryFailure::Rejected { error: None });
    assert_eq!(failure.user_message(), FALLBACK_REJECTED);
}

#[tokio::test]
async fn test_success_false_with_message() {
    let stub = StubBackend::start(Reply::json(
        200,
        json!({ "success": false, "error": "Query not relevant" }),
    ))
    .await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert_eq!(failure.user_message(), "Query not relevant");
}

#[tokio::test]
async fn test_non_json_body_is_unexpected() {
    let stub = StubBackend::start(Reply::raw(200, "<html>gateway</html>")).await;

    let failure = stub
        .client()
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(failure, QueryFailure::Decode(_)));
    assert_eq!(failure.user_message(), FALLBACK_UNEXPECTED);
}

#[tokio::test]
async fn test_trailing_slash_endpoint() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let client = medq::query::QueryClient::new(&format!("{}/", stub.base_url), None).unwrap();

    assert_eq!(client.url(), format!("{}/query", stub.base_url));
    client
        .submit(&QueryRequest::new("x").unwrap())
        .await
        .unwrap();
    assert_eq!(stub.requests().len(), 1);
}
