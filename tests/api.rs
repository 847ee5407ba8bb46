//! End-to-end tests of the HTTP surface: router → pipeline → RegistryClient
//! against wiremock, with reports written to a temporary directory.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use overdue_report::registry::RegistryClient;
use overdue_report::report::{ReportStore, XLSX_CONTENT_TYPE};
use overdue_report::{AppState, Config, routes};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_app(mock_server: &MockServer, reports_dir: &Path, public_dir: &Path) -> Router {
    let config = Config {
        port: 0,
        environment: "test".to_string(),
        registry_api_key: "test-key".to_string(),
        registry_base_url: mock_server.uri().parse().unwrap(),
        reports_dir: reports_dir.to_path_buf(),
        public_dir: public_dir.to_path_buf(),
        otel_service_name: "overdue-report-test".to_string(),
        otel_exporter_endpoint: "http://localhost:4317".to_string(),
    };

    let registry =
        RegistryClient::new(config.registry_base_url.clone(), &config.registry_api_key).unwrap();

    routes::router(AppState {
        registry: Arc::new(registry),
        reports: ReportStore::new(&config.reports_dir),
        config,
    })
}

fn search_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/search-companies")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

async fn mount_profile(mock_server: &MockServer, number: &str, confirmation_overdue: bool) {
    Mock::given(method("GET"))
        .and(path(format!("/company/{number}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "company_name": format!("COMPANY {number} LTD"),
            "company_number": number,
            "type": "ltd",
            "registered_office_address": {
                "address_line_1": "1 Station Road",
                "locality": "York",
                "country": "England",
                "postal_code": "YO1 1AA"
            },
            "confirmation_statement": {
                "overdue": confirmation_overdue,
                "next_due": "2024-02-01",
                "next_made_up_to": "2024-01-18"
            },
            "accounts": {
                "next_accounts": {"overdue": false},
                "next_due": "2024-10-31",
                "next_made_up_to": "2024-01-31"
            }
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn search_then_download_report() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/advanced-search/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"company_number": "00000001"},
                {"company_number": "00000002"},
                {"company_number": "00000003"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_profile(&mock_server, "00000001", true).await;
    mount_profile(&mock_server, "00000002", false).await;
    Mock::given(method("GET"))
        .and(path("/company/00000003"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/company/00000001/officers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server, reports.path(), public.path());

    let resp = app
        .clone()
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-01-01",
            "incorporatedTo": "2023-06-30",
            "volume": "3"
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["overdueCount"], 1);
    assert_eq!(body["companiesChecked"], 3);
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("OverDueReport_"));
    assert!(filename.ends_with(".xlsx"));

    let resp = app
        .oneshot(get(&format!("/download-report/{filename}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        XLSX_CONTENT_TYPE
    );
    assert!(
        resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains(&filename)
    );

    let on_disk = std::fs::read(reports.path().join(&filename)).unwrap();
    assert_eq!(
        resp.headers()[header::CONTENT_LENGTH].to_str().unwrap(),
        on_disk.len().to_string()
    );

    let bytes = body_bytes(resp).await;
    // xlsx is a zip archive
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(bytes, on_disk);
}

#[tokio::test]
async fn negative_volume_is_rejected_without_upstream_calls() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-01-01",
            "incorporatedTo": "2023-06-30",
            "volume": -1
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Volume cannot be negative.");
}

#[tokio::test]
async fn inverted_dates_are_rejected() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-06-01",
            "incorporatedTo": "2023-01-01",
            "volume": 10
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["message"],
        "\"Incorporated To\" date cannot be less than \"Incorporated From\" date."
    );
}

#[tokio::test]
async fn fractional_negative_volume_is_rejected_as_negative() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-01-01",
            "incorporatedTo": "2023-06-30",
            "volume": -1.5
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Volume cannot be negative.");
}

#[tokio::test]
async fn fractional_volume_is_rejected() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-01-01",
            "incorporatedTo": "2023-06-30",
            "volume": 10.5
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Volume must be a whole number.");
}

#[tokio::test]
async fn undecodable_bodies_get_error_envelope() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    let app = test_app(&mock_server, reports.path(), public.path());

    let wrong_type = search_request(json!({
        "incorporatedFrom": 20230101,
        "incorporatedTo": "2023-06-30",
        "volume": 10
    }));
    let not_json = Request::builder()
        .method("POST")
        .uri("/search-companies")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/search-companies")
        .body(Body::from(r#"{"volume": 10}"#))
        .unwrap();

    for request in [wrong_type, not_json, no_content_type] {
        let resp = app.clone().oneshot(request).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body:"),
            "{body}"
        );
    }
}

#[tokio::test]
async fn search_failure_returns_500_with_upstream_message() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/advanced-search/companies"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":"Invalid Authorization"}"#),
        )
        .mount(&mock_server)
        .await;

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(search_request(json!({
            "incorporatedFrom": "2023-01-01",
            "incorporatedTo": "2023-01-31",
            "volume": 5
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Invalid Authorization")
    );
    assert_eq!(std::fs::read_dir(reports.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn download_missing_report_is_plain_text_500() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(get("/download-report/OverDueReport_missing.xlsx"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await, b"File not found.");
}

#[tokio::test]
async fn download_rejects_path_traversal() {
    let mock_server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();
    let reports = root.path().join("reports");
    std::fs::create_dir(&reports).unwrap();
    std::fs::write(root.path().join("secret.txt"), b"secret").unwrap();

    let resp = test_app(&mock_server, &reports, root.path())
        .oneshot(get("/download-report/..%2Fsecret.txt"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_check() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(get("/api/health"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "overdue-report");
}

#[tokio::test]
async fn serves_static_front_end() {
    let mock_server = MockServer::start().await;
    let reports = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    std::fs::write(
        public.path().join("index.html"),
        "<html><body>Overdue report</body></html>",
    )
    .unwrap();

    let resp = test_app(&mock_server, reports.path(), public.path())
        .oneshot(get("/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(body.contains("Overdue report"));
}
