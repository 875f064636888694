//! cdl-api library interface for testing
//!
//! Exposes the batch pipeline, its collaborators and the HTTP router

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use cdl_common::config::PipelineSettings;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{BatchImporter, BulkDispatcher, CampaignDirectory, MessageGateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Forms, leads and per-table record stores
    pub directory: Arc<dyn CampaignDirectory>,
    /// WhatsApp gateway
    pub gateway: Arc<dyn MessageGateway>,
    pub importer: BatchImporter,
    pub dispatcher: BulkDispatcher,
    pub pipeline: PipelineSettings,
    /// Cancelled on shutdown; batches in flight stop starting new items
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn CampaignDirectory>,
        gateway: Arc<dyn MessageGateway>,
        pipeline: PipelineSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            directory,
            gateway,
            importer: BatchImporter::new(pipeline),
            dispatcher: BulkDispatcher::new(pipeline),
            pipeline,
            shutdown,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::user_routes())
        .merge(api::form_routes())
        .merge(api::lead_routes())
        .merge(api::message_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
