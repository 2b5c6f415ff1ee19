//! Servicios de integración externa y eventos

pub mod geocoding_service;
pub mod notification_service;
pub mod realtime_service;

pub use geocoding_service::{GeocodingRequest, GeocodingResponse, GeocodingService};
pub use notification_service::NotificationService;
pub use realtime_service::{RequestEvent, RequestEventKind, RequestFeed};
