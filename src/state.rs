//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::request_repository::RequestRepository;
use crate::services::geocoding_service::GeocodingService;
use crate::services::notification_service::NotificationService;
use crate::services::realtime_service::RequestFeed;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub http_client: Client,
    pub feed: RequestFeed,
    pub geocoding: Arc<GeocodingService>,
    pub notifications: Arc<NotificationService>,
    pub repository: Arc<RequestRepository>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let feed = RequestFeed::new();
        let geocoding = Arc::new(GeocodingService::new(
            config.mapbox_token.clone(),
            http_client.clone(),
        ));
        let notifications = Arc::new(NotificationService::new(
            config.resend_api_key.clone(),
            config.dispatch_email.clone(),
            config.from_address.clone(),
            http_client.clone(),
        ));
        let repository = Arc::new(RequestRepository::new(pool.clone(), feed.clone()));

        Self {
            pool,
            config,
            http_client,
            feed,
            geocoding,
            notifications,
            repository,
        }
    }
}
