//! Paysim API Library
//!
//! A minimal payment-gateway simulator: merchants create orders, a checkout
//! flow submits payments, and settlement is simulated after a delay.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod settlement;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

/// Shared application state handed to every handler. No ambient singletons:
/// the store handle and services are constructed once at startup and
/// injected here.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

/// The versioned API surface, mounted at `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", handlers::orders::order_routes())
        .nest("/payments", handlers::payments::payment_routes())
        .nest("/stats", handlers::stats::stats_routes())
        .nest("/test", handlers::test_merchant::test_routes())
}
