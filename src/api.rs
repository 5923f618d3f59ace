//! HTTP boundary
//!
//! Thin actix-web handlers, one per endpoint. Each delegates to the
//! `DataService` operations and wraps the result in its response envelope;
//! every error maps to HTTP 500 with `{success: false, timestamp, error}`.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use tracing::error;

use crate::service::{DataService, ServiceError, PRIMARY_DATASET};

/// Current time as an ISO-8601 UTC string with millisecond precision
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Uniform 500 envelope carrying the error's message string
fn error_envelope(err: &ServiceError) -> HttpResponse {
    error!(error = %err, "request failed");
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "timestamp": now_iso(),
        "error": err.to_string(),
    }))
}

/// `GET /api/data` - the full normalized primary dataset
async fn get_data(service: web::Data<DataService>) -> HttpResponse {
    match service.get_data(PRIMARY_DATASET).await {
        Ok(dataset) => HttpResponse::Ok().json(json!({
            "success": true,
            "timestamp": now_iso(),
            "total_records": dataset.total_records,
            "fields": &dataset.fields,
            "data": &dataset.records,
        })),
        Err(err) => error_envelope(&err),
    }
}

/// `GET /api/fields` - header list only, same cache path
async fn get_fields(service: web::Data<DataService>) -> HttpResponse {
    match service.get_data(PRIMARY_DATASET).await {
        Ok(dataset) => HttpResponse::Ok().json(json!({
            "success": true,
            "timestamp": now_iso(),
            "fields": &dataset.fields,
        })),
        Err(err) => error_envelope(&err),
    }
}

/// `GET /api/data/{field}` - one column, blank values dropped
async fn get_field(service: web::Data<DataService>, field: web::Path<String>) -> HttpResponse {
    match service.get_field(PRIMARY_DATASET, &field).await {
        Ok(values) => HttpResponse::Ok().json(json!({
            "success": true,
            "timestamp": now_iso(),
            "field": field.as_str(),
            "total_values": values.len(),
            "values": values,
        })),
        Err(err) => error_envelope(&err),
    }
}

/// `POST /api/refresh` - bypass the cache and re-fetch
async fn refresh(service: web::Data<DataService>) -> HttpResponse {
    match service.refresh(PRIMARY_DATASET).await {
        Ok(dataset) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cache refreshed successfully",
            "timestamp": iso(dataset.fetched_at),
        })),
        Err(err) => error_envelope(&err),
    }
}

/// `GET /api/health` - cache introspection, never fetches
async fn health(service: web::Data<DataService>) -> HttpResponse {
    let status = service.status(PRIMARY_DATASET).await;
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": now_iso(),
        "cache": {
            "isCached": status.is_cached,
            "lastUpdate": status.last_update.map(iso),
            "timeToExpiry": status.time_to_expiry,
        },
    }))
}

/// `GET /api/ads` - the ads dataset through the alias table
async fn get_ads(service: web::Data<DataService>) -> HttpResponse {
    match service.ads().await {
        Ok(ads) => HttpResponse::Ok().json(ads),
        Err(err) => error_envelope(&err),
    }
}

/// Registers all API routes on an actix `App`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/data", web::get().to(get_data))
        .route("/api/data/{field}", web::get().to(get_field))
        .route("/api/fields", web::get().to(get_fields))
        .route("/api/refresh", web::post().to(refresh))
        .route("/api/health", web::get().to(health))
        .route("/api/ads", web::get().to(get_ads));
}
