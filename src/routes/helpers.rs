use std::error::Error;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, RETRY_AFTER};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};

use crate::configuration::Environment;
use crate::domain::ValidationErrors;
use crate::relay::RelayError;

pub fn error_chain_fmt(e: &impl Error, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}

/// Every failure the HTTP surface can answer with. Each renders as
/// `{"success": false, "error": ...}`.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{}", .0.summary())]
    Validation(ValidationErrors),
    #[error("{message}")]
    RateLimited {
        message: &'static str,
        retry_after: Duration,
    },
    #[error("Not allowed by CORS")]
    OriginNotAllowed,
    #[error("Route not found")]
    NotFound,
    #[error("Request body is too large")]
    PayloadTooLarge,
    #[error("{0}")]
    BadRequest(String),
    #[error("{client_message}")]
    Unexpected {
        client_message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<RelayError> for ApiError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::Validation(errors) => ApiError::Validation(errors),
            RelayError::Delivery {
                client_message,
                source,
            } => ApiError::Unexpected {
                client_message,
                source,
            },
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [String]>,
}

impl ErrorBody<'_> {
    fn new(error: &str) -> ErrorBody<'_> {
        ErrorBody {
            success: false,
            error,
            errors: None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::OriginNotAllowed => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(errors) => response.json(ErrorBody {
                success: false,
                error: errors.summary(),
                errors: Some(errors.messages()),
            }),
            ApiError::RateLimited { retry_after, .. } => response
                .insert_header((RETRY_AFTER, retry_after.as_secs().to_string()))
                .json(ErrorBody::new(&self.to_string())),
            _ => response.json(ErrorBody::new(&self.to_string())),
        }
    }
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let exposes_details = req
        .app_data::<web::Data<Environment>>()
        .is_some_and(|env| env.exposes_error_details());

    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ApiError::PayloadTooLarge.into()
        }
        err if exposes_details => ApiError::BadRequest(err.to_string()).into(),
        _ => ApiError::BadRequest("Invalid request body".into()).into(),
    }
}

/// Rewrites error responses that framework internals produced without a JSON
/// body (wrong method, unparsable path) into the uniform error shape.
pub fn render_json_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>>
where
    B: MessageBody + 'static,
{
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status = res.status();
    let message = match status {
        StatusCode::NOT_FOUND => "Route not found",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        s => s.canonical_reason().unwrap_or("Request failed"),
    };
    let (req, _) = res.into_parts();
    let response = HttpResponse::build(status).json(ErrorBody::new(message));
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
