//! Integration tests for the HTTP API
//!
//! A locally bound actix server stands in for the Google Sheets export
//! endpoint, serving an in-memory xlsx fixture, so the full
//! fetch -> normalize -> cache -> envelope path is exercised without touching
//! the network.

use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse, HttpServer};
use chrono::Duration;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sheetserve::api;
use sheetserve::data::SheetFetcher;
use sheetserve::service::DataService;

/// Builds an in-memory xlsx workbook from string rows (empty strings become
/// truly empty cells).
fn sheet_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet
                    .write_string(r as u32, c as u16, *cell)
                    .expect("write cell");
            }
        }
    }
    workbook.save_to_buffer().expect("save workbook")
}

/// The worked example from the pipeline design: a blank interior row and a
/// missing trailing cell.
fn primary_fixture() -> Vec<u8> {
    sheet_bytes(&[
        &["Name", "Age"],
        &["", "", ""],
        &["Alice", "30"],
        &["Bob", ""],
    ])
}

/// Spawns a stub export server returning `body` with `status` for any
/// `/{id}/export` request, counting hits. Returns its base URL.
fn spawn_export_stub(body: Vec<u8>, status: StatusCode, hits: Arc<AtomicUsize>) -> String {
    let server = HttpServer::new(move || {
        let body = body.clone();
        let hits = hits.clone();
        App::new().route(
            "/{id}/export",
            web::get().to(move |_id: web::Path<String>| {
                let body = body.clone();
                hits.fetch_add(1, Ordering::SeqCst);
                async move { HttpResponse::build(status).body(body) }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind stub server");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

fn sources() -> HashMap<String, String> {
    let mut sources = HashMap::new();
    sources.insert("primary".to_string(), "sheet-primary".to_string());
    sources.insert("ads".to_string(), "sheet-ads".to_string());
    sources
}

fn service_for(base_url: String) -> web::Data<DataService> {
    web::Data::new(DataService::with_fetcher(
        SheetFetcher::with_base_url(base_url),
        Duration::seconds(300),
        sources(),
    ))
}

#[actix_web::test]
async fn test_health_before_any_fetch_reports_empty_cache() {
    let service = service_for("http://127.0.0.1:9".to_string());
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"]["isCached"], false);
    assert!(body["cache"]["lastUpdate"].is_null());
    assert!(body["cache"]["timeToExpiry"].is_null());
}

#[actix_web::test]
async fn test_data_endpoint_serves_normalized_records() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(primary_fixture(), StatusCode::OK, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/data").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total_records"], 2);
    assert_eq!(body["fields"], serde_json::json!(["Name", "Age"]));
    assert_eq!(body["data"][0]["Name"], "Alice");
    assert_eq!(body["data"][0]["Age"], "30");
    assert_eq!(body["data"][1]["Name"], "Bob");
    assert_eq!(body["data"][1]["Age"], "", "missing cell defaults to empty string");
}

#[actix_web::test]
async fn test_second_read_is_served_from_cache() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(primary_fixture(), StatusCode::OK, hits.clone());
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/api/data").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1, "fresh cache must not refetch");
}

#[actix_web::test]
async fn test_refresh_bypasses_the_cache() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(primary_fixture(), StatusCode::OK, hits.clone());
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/data").to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post().uri("/api/refresh").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Cache refreshed successfully");
    assert_eq!(hits.load(Ordering::SeqCst), 2, "refresh must refetch even when fresh");

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let health: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["cache"]["isCached"], true);
}

#[actix_web::test]
async fn test_fields_endpoint_lists_headers_only() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(primary_fixture(), StatusCode::OK, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/fields").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["fields"], serde_json::json!(["Name", "Age"]));
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn test_field_projection_drops_blank_values() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(primary_fixture(), StatusCode::OK, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/data/Age").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["field"], "Age");
    assert_eq!(body["values"], serde_json::json!(["30"]), "Bob's blank Age is filtered");
    assert_eq!(body["total_values"], 1);
}

#[actix_web::test]
async fn test_ads_endpoint_formats_records_with_aliases() {
    let fixture = sheet_bytes(&[
        &["title", "message", "link"],
        &["Hello", "World", "https://example.com"],
    ]);
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(fixture, StatusCode::OK, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/ads").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ads = body.as_array().expect("bare array response");
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0]["title"], "Hello");
    assert_eq!(ads[0]["message"], "World");
    assert_eq!(ads[0]["actionLink"], "https://example.com");
    assert_eq!(
        ads[0]["imageUrl"], "https://placehold.co/600x400?text=Hello",
        "absent image gets a generated placeholder"
    );
}

#[actix_web::test]
async fn test_fetch_failure_maps_to_uniform_500_envelope() {
    let service = service_for("http://127.0.0.1:9".to_string());
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/data").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["timestamp"].is_string());
    assert!(
        !body["error"].as_str().expect("error message").is_empty(),
        "envelope carries the error message"
    );
}

#[actix_web::test]
async fn test_upstream_status_error_is_surfaced() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(Vec::new(), StatusCode::FORBIDDEN, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::post().uri("/api/refresh").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().expect("error message").contains("403"));
}

#[actix_web::test]
async fn test_malformed_export_maps_to_parse_error_envelope() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_export_stub(b"not a workbook".to_vec(), StatusCode::OK, hits);
    let service = service_for(base);
    let app = test::init_service(App::new().app_data(service).configure(api::routes)).await;

    let req = test::TestRequest::get().uri("/api/data").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().expect("error message").contains("workbook"));
}
