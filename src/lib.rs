pub mod chat;
pub mod configuration;
pub mod cors;
pub mod domain;
pub mod email_client;
pub mod rate_limit;
pub mod relay;
pub mod routes;
pub mod startup;
pub mod telemetry;
