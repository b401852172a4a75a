mod chat;
mod contact;
mod health_check;
mod helpers;
mod rate_limit;
