//! End-to-end tests against an in-process search server.

use std::collections::HashMap;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use iplens::{
    CatalogSearchRequest, Client, Error, QueryImage, SearchBackend, SearchSession, SessionState,
    UrlResolver,
};
use serde_json::{Value, json};

async fn search_vector(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "expected multipart"})));
    }

    let body = String::from_utf8_lossy(&body).to_lowercase();
    if !body.contains(r#"name="file""#) || !body.contains("content-type: image/png") {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Invalid file type."})));
    }

    let n = params.get("n_results").cloned().unwrap_or_else(|| "5".into());
    (
        StatusCode::OK,
        Json(json!({
            "query_filename": "q.png",
            "results": [
                {"id": "c3", "distance": 1.8, "metadata": {}},
                {"id": "a1", "distance": 0.2, "metadata": {"filename": "dragon.png"}},
                {"id": "b2", "distance": 0.5, "metadata": null}
            ],
            "status": format!("n={n}")
        })),
    )
}

async fn failing_search() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "index unavailable"})),
    )
}

async fn unavailable_search() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn root() -> Json<Value> {
    Json(json!({"message": "IP Lens API is running and ready to process images."}))
}

async fn catalog_search(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad key"})));
    }
    (StatusCode::OK, Json(json!({"data": [body], "hasNextPage": false})))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn png() -> QueryImage {
    QueryImage::from_bytes("q.png", vec![0x89, b'P', b'N', b'G'], "image/png")
}

#[tokio::test]
async fn test_search_keeps_server_order() {
    let base = serve(
        Router::new()
            .route("/", get(root))
            .route("/search-vector", post(search_vector)),
    )
    .await;
    let client = Client::builder().base_url(&base).build().unwrap();

    let mut session = SearchSession::new();
    session.select_image(png());
    let results = session.submit(&client.search()).await.unwrap();

    let ids: Vec<_> = results.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c3", "a1", "b2"]);
    assert_eq!(session.state(), SessionState::Ready);

    let sel = session.select_candidate("a1", client.assets()).unwrap();
    assert_eq!(sel.display_url, format!("{base}/assets/dragon.png"));
    assert_eq!(sel.score.to_string(), "90.00%");
    assert_eq!(sel.rank, 2);

    let health = client.search().health().await.unwrap();
    assert!(health.message.contains("running"));
}

#[tokio::test]
async fn test_n_results_is_forwarded() {
    let base = serve(Router::new().route("/search-vector", post(search_vector))).await;
    let client = Client::builder().base_url(&base).n_results(3).build().unwrap();

    let resp = client.search().search_raw(&png()).await.unwrap();
    assert_eq!(resp.status, "n=3");
    assert_eq!(resp.query_filename, "q.png");
}

#[tokio::test]
async fn test_server_error_detail_is_verbatim() {
    let base = serve(Router::new().route("/search-vector", post(failing_search))).await;
    let client = Client::builder().base_url(&base).build().unwrap();

    let mut session = SearchSession::new();
    session.select_image(png());
    let err = session.submit(&client.search()).await.unwrap_err();

    assert_eq!(err, Error::server(500, "index unavailable"));
    assert_eq!(err.to_string(), "iplens: server error (500): index unavailable");
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn test_server_error_without_body_uses_status_text() {
    let base = serve(Router::new().route("/search-vector", post(unavailable_search))).await;
    let client = Client::builder().base_url(&base).build().unwrap();

    let err = client.search().search(&png()).await.unwrap_err();
    assert_eq!(err, Error::server(503, "Service Unavailable"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();

    let mut session = SearchSession::new();
    session.select_image(png());
    let err = session.submit(&client.search()).await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err:?}");
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_non_image_never_reaches_server() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();
    let doc = QueryImage::from_bytes("notes.txt", b"hello".to_vec(), "text/plain");

    let err = client.search().search(&doc).await.unwrap_err();
    assert!(matches!(err, Error::InvalidMediaType { .. }));
}

#[tokio::test]
async fn test_catalog_search() {
    let base = serve(Router::new().route("/api/v4/search", post(catalog_search))).await;
    let client = Client::builder()
        .catalog_base_url(&base)
        .catalog_api_key("test-key")
        .build()
        .unwrap();

    let resp = client
        .catalog()
        .search(&CatalogSearchRequest::new("dragon NFT"))
        .await
        .unwrap();
    assert_eq!(
        resp.data[0],
        json!({"mediaType": "image", "pagination": {"limit": 20, "offset": 0}, "query": "dragon NFT"})
    );
    assert_eq!(resp.extra.get("hasNextPage"), Some(&json!(false)));

    let wrong = Client::builder()
        .catalog_base_url(&base)
        .catalog_api_key("nope")
        .build()
        .unwrap();
    let err = wrong
        .catalog()
        .search(&CatalogSearchRequest::new("dragon NFT"))
        .await
        .unwrap_err();
    assert_eq!(err, Error::server(401, "bad key"));
}

#[test]
fn test_assets_resolver_is_exposed() {
    let client = Client::new().unwrap();
    assert!(client.assets().resolve("x.png").ends_with("/assets/x.png"));
}
