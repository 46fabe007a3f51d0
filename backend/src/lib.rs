//! # Youth Soccer Match Registration Backend
//!
//! Parents register their children for youth soccer matches. The core is the
//! admission controller, which guarantees a match never holds more confirmed
//! registrations than its capacity, even with many parents competing for the
//! last slots.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (admission controller, services)
//!     ↓
//! Storage Layer (SQLite or in-memory, versioned commits)
//! ```
//!
//! The domain never sees HTTP types and the storage layer never makes
//! decisions; it only applies a commit if the match is still at the version
//! the caller observed.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde_json::json;
use std::sync::Arc;
use shared::FieldInfo;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    AdmissionController, CapacityLedger, ChildService, Clock, ContactService, LogNotifier, MatchService,
    NotificationService, Notifier, ParentService, RegistrationService, SystemClock,
};
use crate::storage::{DbConnection, InMemoryStorage, Storage};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub parent_service: ParentService,
    pub child_service: ChildService,
    pub match_service: MatchService,
    pub admission_controller: AdmissionController,
    pub registration_service: RegistrationService,
    pub capacity_ledger: CapacityLedger,
    pub contact_service: ContactService,
    pub field_info: Arc<FieldInfo>,
}

/// Wire every service to one storage backend, notifier and clock
pub fn build_state(
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    max_retries: u32,
) -> AppState {
    let notifications = NotificationService::new(storage.clone(), notifier);

    AppState {
        parent_service: ParentService::new(storage.clone(), notifications.clone(), clock.clone()),
        child_service: ChildService::new(storage.clone(), notifications.clone(), clock.clone()),
        match_service: MatchService::new(storage.clone(), notifications.clone(), clock.clone())
            .with_max_retries(max_retries),
        admission_controller: AdmissionController::new(storage.clone(), notifications, clock.clone())
            .with_max_retries(max_retries),
        registration_service: RegistrationService::new(storage.clone()),
        capacity_ledger: CapacityLedger::new(storage.clone()),
        contact_service: ContactService::new(storage, clock),
        field_info: Arc::new(FieldInfo::default()),
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let storage: Arc<dyn Storage> = match config.storage {
        StorageBackend::Sqlite => {
            info!("Setting up database at {}", config.database_url);
            Arc::new(
                DbConnection::new(&config.database_url)
                    .await
                    .context("Failed to initialize database")?,
            )
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            Arc::new(InMemoryStorage::new())
        }
    };

    info!("Setting up domain services (max admission retries: {})", config.max_admission_retries);
    Ok(AppState {
        field_info: Arc::new(config.field_info.clone()),
        ..build_state(
            storage,
            Arc::new(LogNotifier),
            Arc::new(SystemClock),
            config.max_admission_retries,
        )
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed_origin: {}", config.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/parents", post(io::create_parent))
        .route("/parents/me", get(io::get_current_parent))
        .route("/children", get(io::list_children).post(io::create_child))
        .route(
            "/children/:id",
            get(io::get_child).put(io::update_child).delete(io::delete_child),
        )
        .route("/matches", get(io::list_matches).post(io::create_match))
        .route("/matches/:id", get(io::get_match))
        .route("/matches/:id/cancel", post(io::cancel_match))
        .route("/matches/:id/capacity", get(io::get_capacity))
        .route("/matches/:id/audit", get(io::audit_capacity))
        .route("/matches/:id/registrations", post(io::create_registration))
        .route("/registrations", get(io::list_registrations))
        .route("/registrations/:id/cancel", post(io::cancel_registration))
        .route("/contact", post(io::submit_contact_message))
        .route("/field-info", get(io::get_field_info));

    Ok(Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
