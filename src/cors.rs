//! Origin allowlist enforcement.
//!
//! Requests without an `Origin` header (curl, server-to-server) always pass.
//! Browser requests pass only when their origin is allowlisted; everything
//! else is rejected before routing, rate limiting or validation happen.

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, HeaderValue, ORIGIN,
    VARY,
};
use actix_web::middleware::Next;
use actix_web::{HttpResponse, web};

use crate::routes::ApiError;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: impl IntoIterator<Item = String>) -> Self {
        Self(
            origins
                .into_iter()
                .map(|o| o.trim().trim_end_matches('/').to_owned())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

pub async fn enforce_allowed_origins(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let Some(origin) = req.headers().get(ORIGIN).cloned() else {
        return Ok(next.call(req).await?.map_into_left_body::<BoxBody>());
    };

    let allowed = match (origin.to_str(), req.app_data::<web::Data<AllowedOrigins>>()) {
        (Ok(origin), Some(origins)) => origins.allows(origin),
        _ => false,
    };
    if !allowed {
        tracing::warn!(origin = ?origin, "Rejected a request from a disallowed origin");
        return Ok(req
            .error_response(ApiError::OriginNotAllowed)
            .map_into_right_body());
    }

    if req.method() == Method::OPTIONS {
        let mut response = HttpResponse::NoContent().finish();
        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        add_origin_headers(headers, origin);
        return Ok(req.into_response(response).map_into_right_body());
    }

    let mut response = next.call(req).await?;
    add_origin_headers(response.headers_mut(), origin);
    Ok(response.map_into_left_body())
}

fn add_origin_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(VARY, HeaderValue::from_static("Origin"));
}
