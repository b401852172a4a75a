use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::middleware::{ErrorHandlers, from_fn};
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use crate::chat::{ChatService, GeminiClient, ToolExecutor};
use crate::configuration::{Environment, Settings};
use crate::cors::{AllowedOrigins, enforce_allowed_origins};
use crate::domain::Sanitizer;
use crate::email_client::EmailClient;
use crate::rate_limit::{
    API_LIMIT_MESSAGE, ApiRateLimiter, CONTACT_LIMIT_MESSAGE, CONTACT_MAX_REQUESTS,
    CONTACT_WINDOW, ContactRateLimiter, RateLimiter, api_rate_limit, contact_rate_limit,
};
use crate::relay::ContactRelay;
use crate::routes::{
    api_index, contact_health, health_check, home, json_error_handler, not_found,
    render_json_error, send_chat, send_contact,
};

pub struct Application {
    port: u16,
    server: Server,
}

/// Everything the request handlers share across workers.
pub struct AppState {
    pub environment: Environment,
    pub allowed_origins: AllowedOrigins,
    pub max_body_bytes: usize,
    pub api_limiter: ApiRateLimiter,
    pub contact_limiter: Arc<ContactRateLimiter>,
    pub relay: Arc<ContactRelay<EmailClient>>,
    pub chat: ChatService<GeminiClient, EmailClient>,
}

impl Application {
    /// Fails before binding when a required setting is missing or invalid.
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        config.validate()?;

        let environment = config.application.environment;
        let recipient = config.email_client.recipient()?;
        let chat_client = config.chat.client()?;
        let email_client = config.email_client.client()?;

        let relay = Arc::new(ContactRelay::new(
            email_client,
            recipient,
            Sanitizer::new(config.contact.strip_script_blocks),
            environment,
        ));

        let window = config.rate_limit.window();
        let sweep_threshold = config.rate_limit.sweep_threshold;
        // Shared by the contact route and the chat tools.
        let contact_limiter = Arc::new(ContactRateLimiter(RateLimiter::new(
            CONTACT_MAX_REQUESTS,
            CONTACT_WINDOW,
            sweep_threshold,
            CONTACT_LIMIT_MESSAGE,
        )));
        let chat = ChatService::new(
            chat_client,
            ToolExecutor::new(Arc::clone(&relay), Arc::clone(&contact_limiter)),
            config.chat.system_instruction,
            config.chat.enable_tools,
        );

        let state = AppState {
            environment,
            allowed_origins: AllowedOrigins::new(config.application.allowed_origins),
            max_body_bytes: config.application.max_body_bytes,
            api_limiter: ApiRateLimiter(RateLimiter::new(
                config.rate_limit.max_requests,
                window,
                sweep_threshold,
                API_LIMIT_MESSAGE,
            )),
            contact_limiter,
            relay,
            chat,
        };

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        tracing::info!(
            port,
            environment = environment.as_str(),
            "Portfolio API listening"
        );
        let server = run(listener, state)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, anyhow::Error> {
    let environment = web::Data::new(state.environment);
    let allowed_origins = web::Data::new(state.allowed_origins);
    let api_limiter = web::Data::new(state.api_limiter);
    let contact_limiter = web::Data::from(state.contact_limiter);
    let relay = web::Data::from(state.relay);
    let chat = web::Data::new(state.chat);
    let max_body_bytes = state.max_body_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(ErrorHandlers::new().default_handler(render_json_error))
            .wrap(from_fn(enforce_allowed_origins))
            .wrap(TracingLogger::default())
            .app_data(
                web::JsonConfig::default()
                    .limit(max_body_bytes)
                    .error_handler(json_error_handler),
            )
            .app_data(environment.clone())
            .app_data(allowed_origins.clone())
            .app_data(api_limiter.clone())
            .app_data(contact_limiter.clone())
            .app_data(relay.clone())
            .app_data(chat.clone())
            .route("/", web::get().to(home))
            .route("/api/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .wrap(from_fn(api_rate_limit))
                    .route("", web::get().to(api_index))
                    .route("/chat", web::post().to(send_chat))
                    .service(
                        web::scope("/contact")
                            .route("/health", web::get().to(contact_health))
                            .service(
                                web::resource("")
                                    .wrap(from_fn(contact_rate_limit))
                                    .route(web::post().to(send_contact)),
                            ),
                    ),
            )
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
