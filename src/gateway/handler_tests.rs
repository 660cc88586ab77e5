use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::cache::{CacheConfig, CorpusCache};
use crate::corpus::{CorpusEntry, MockCorpusStore};
use crate::embedding::LookupEmbedder;
use crate::freshness::{FreshnessSignal, MockFreshnessStore};
use crate::matching::{MatchResult, MatchTier, SimilarityMatcher};
use crate::service::{MatchError, MatchService};

const QUERY_ID: &str = "123e4567-e89b-12d3-a456-426655440000";
const RUMOUR: &str = "夏威夷大火後，夏威夷獨立運動女領袖演講稱：我們不是美國人";

fn hawaii_entry() -> CorpusEntry {
    CorpusEntry {
        content: format!("{}，我們將以夏威夷人的身份去死！", RUMOUR),
        title: "【錯誤】夏威夷大火後鬧獨立？挪用多年前舊影片".to_string(),
        tag: "錯誤".to_string(),
        link: "https://www.mygopen.com/2023/08/trask.html".to_string(),
        summary: "傳言中的演說發生於 1993 年，並非近期。".to_string(),
        source: "MyGoPen".to_string(),
    }
}

struct TestApp {
    corpus: MockCorpusStore,
    embedder: LookupEmbedder,
    router: Router,
}

fn app() -> TestApp {
    let entry = hawaii_entry();
    let embedder = LookupEmbedder::new(2)
        .with(&entry.embedding_text(), vec![0.8372641, 0.5467])
        .with(RUMOUR, vec![1.0, 0.0]);
    let corpus = MockCorpusStore::with_rows(vec![entry]);
    let freshness = MockFreshnessStore::new();

    let cache = Arc::new(CorpusCache::new(
        Arc::new(corpus.clone()),
        FreshnessSignal::new(Arc::new(freshness), Duration::from_millis(100)),
        Arc::new(embedder.clone()),
        CacheConfig::default(),
    ));
    let service = Arc::new(MatchService::new(
        cache,
        SimilarityMatcher::default(),
        0,
        Duration::from_millis(500),
    ));

    TestApp {
        corpus,
        embedder,
        router: create_router_with_state(HandlerState::new(service)),
    }
}

fn request_json(body: &str) -> serde_json::Value {
    serde_json::json!({
        "QueryId": QUERY_ID,
        "QueryType": "sms_fraud",
        "QueryBody": body,
        "QueryDateTime": "2023-05-22T13:20:41.612Z",
        "Sentry": {
            "TraceId": "14b2e443e97e4e399e7d2b2c6a0eee2d",
            "SpanId": "aef45e9119e3a592",
            "Op": "task",
            "Description": "line bot task"
        }
    })
}

fn post(json: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/fasttext")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn status_header(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(FACTMATCH_STATUS_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = app
        .router
        .oneshot(Request::get("/health-check").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_HEALTHY);
    assert_eq!(body_json(response).await, serde_json::json!("Alive"));
}

#[tokio::test]
async fn test_ready_before_load() {
    let app = app();
    let response = app
        .router
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_NOT_READY);

    let body: ReadyResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.components.corpus_entries, 0);
    assert_eq!(body.components.embedder_mode, "lookup");
}

#[tokio::test]
async fn test_ready_after_match_loads_corpus() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(post(&request_json(RUMOUR)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ReadyResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.status, FACTMATCH_STATUS_READY);
    assert_eq!(body.components.corpus_entries, 1);
    assert_eq!(body.components.generation, 1);
}

#[tokio::test]
async fn test_fasttext_match_response_shape() {
    let app = app();
    let response = app.router.oneshot(post(&request_json(RUMOUR))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "match");

    let body = body_json(response).await;
    assert_eq!(body["QueryId"], QUERY_ID);
    assert_eq!(body["ResponseMessage"], "Success");
    assert!(uuid::Uuid::parse_str(body["ResponseId"].as_str().unwrap()).is_ok());
    assert!(body["ResponseDateTime"].is_string());

    let inner = &body["ResponseBody"];
    let expected = hawaii_entry();
    assert_eq!(inner["Text"], expected.content.as_str());
    assert_eq!(inner["Title"], expected.title.as_str());
    assert_eq!(inner["Tag"], "錯誤");
    assert_eq!(inner["Link"], expected.link.as_str());
    assert_eq!(inner["Summery"], expected.summary.as_str());
    assert_eq!(inner["Sourse"], "MyGoPen");
    let similarity = inner["Similarity"].as_f64().unwrap();
    assert!((similarity - 0.8372641).abs() < 1e-3, "got {similarity}");
}

#[tokio::test]
async fn test_fasttext_no_match_has_null_body() {
    let app = app();
    app.embedder.insert("包裹無法投遞請點連結", vec![0.0, 1.0]);

    let response = app
        .router
        .oneshot(post(&request_json("包裹無法投遞請點連結")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "no_match");

    let body = body_json(response).await;
    assert_eq!(body["ResponseMessage"], "Success");
    for field in ["Text", "Title", "Tag", "Link", "Summery", "Sourse", "Similarity"] {
        assert!(body["ResponseBody"][field].is_null(), "{field} should be null");
    }
}

#[tokio::test]
async fn test_fasttext_without_sentry_context() {
    let app = app();
    let json = serde_json::json!({
        "QueryId": QUERY_ID,
        "QueryType": "sms_fraud",
        "QueryBody": RUMOUR,
        "QueryDateTime": "2023-05-22T13:20:41.612Z"
    });

    let response = app.router.oneshot(post(&json)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fasttext_blank_body_is_bad_request() {
    let app = app();
    let response = app.router.oneshot(post(&request_json("   "))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["code"], 400);
    assert_eq!(app.corpus.fetch_count(), 0);
}

#[tokio::test]
async fn test_fasttext_schema_error_is_bad_request() {
    let app = app();
    let json = serde_json::json!({ "QueryId": "not-a-uuid", "QueryBody": "x" });

    let response = app.router.oneshot(post(&json)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn test_fasttext_embedding_failure_is_generic_500() {
    let app = app();
    app.embedder.set_strict(true);

    let response = app
        .router
        .oneshot(post(&request_json("an unseen message")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(body["code"], 500);
    assert!(!body.to_string().contains("unseen"));
}

#[tokio::test]
async fn test_fasttext_corpus_outage_is_no_match() {
    let app = app();
    app.corpus.set_unavailable(true);

    let response = app.router.oneshot(post(&request_json(RUMOUR))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "no_match");
}

#[test]
fn test_response_body_from_result() {
    let result = MatchResult::Matched {
        entry: hawaii_entry(),
        similarity: 0.9,
        tier: MatchTier::Lexical,
    };
    let body = ResponseBody::from(&result);
    assert_eq!(body.sourse.as_deref(), Some("MyGoPen"));
    assert_eq!(body.similarity, Some(0.9));

    assert_eq!(ResponseBody::from(&MatchResult::NoMatch), ResponseBody::default());
}

#[test]
fn test_request_deserializes_wire_names() {
    let request: FactCheckRequest = serde_json::from_value(request_json("hi")).unwrap();
    assert_eq!(request.query_body, "hi");
    assert_eq!(request.query_type.as_deref(), Some("sms_fraud"));
    assert_eq!(
        request.sentry.unwrap().span_id.as_deref(),
        Some("aef45e9119e3a592")
    );
}

#[test]
fn test_assemble_sets_fresh_ids() {
    let query_id = uuid::Uuid::parse_str(QUERY_ID).unwrap();
    let a = FactCheckResponse::assemble(query_id, &MatchResult::NoMatch);
    let b = FactCheckResponse::assemble(query_id, &MatchResult::NoMatch);

    assert_eq!(a.query_id, query_id);
    assert_eq!(a.response_message, "Success");
    assert_ne!(a.response_id, b.response_id);
}

#[tokio::test]
async fn test_gateway_error_responses() {
    use axum::response::IntoResponse;

    let response = GatewayError::InvalidRequest("detail".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = GatewayError::MatchFailed(MatchError::TaskFailed {
        reason: "secret detail".to_string(),
    })
    .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_unreadable_body_gets_generic_error() {
    let app = app();

    let not_json = Request::builder()
        .method("POST")
        .uri("/fasttext")
        .header("content-type", "application/json")
        .body(Body::from("{\"QueryBody\": "))
        .unwrap();
    let response = app.router.clone().oneshot(not_json).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["code"], 400);

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/fasttext")
        .body(Body::from(request_json(RUMOUR).to_string()))
        .unwrap();
    let response = app.router.oneshot(no_content_type).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), FACTMATCH_STATUS_ERROR);
    assert_eq!(body_json(response).await["error"], "Bad Request");
}
