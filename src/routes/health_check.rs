use actix_web::{HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};

/// Liveness probe.
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
