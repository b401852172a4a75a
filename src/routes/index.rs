use actix_web::{HttpResponse, Responder};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Welcome to Portfolio API",
        "version": VERSION,
        "documentation": "/api",
    }))
}

pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Portfolio API is running",
        "version": VERSION,
        "endpoints": {
            "contact": "/api/contact",
            "chat": "/api/chat",
            "health": "/api/health",
        },
    }))
}
