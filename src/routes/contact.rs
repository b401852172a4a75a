use actix_web::{HttpResponse, Responder, web};

use super::ApiError;
use crate::domain::ContactSubmission;
use crate::email_client::EmailClient;
use crate::relay::ContactRelay;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactResponse<'a> {
    success: bool,
    message_id: &'a str,
}

#[tracing::instrument(name = "Handling a contact form submission", skip(body, relay))]
pub async fn send_contact(
    body: web::Json<ContactSubmission>,
    relay: web::Data<ContactRelay<EmailClient>>,
) -> Result<HttpResponse, ApiError> {
    let message_id = relay.relay(body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ContactResponse {
        success: true,
        message_id: message_id.as_ref(),
    }))
}

pub async fn contact_health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Contact service is running",
    }))
}
