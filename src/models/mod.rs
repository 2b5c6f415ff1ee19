//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del intake: el catálogo de
//! servicios, la política de situación por servicio y la solicitud de
//! rescate (borrador del wizard + fila persistida).

pub mod request;
pub mod service_type;
pub mod situation;

pub use request::{
    short_request_id, Draft, LocationSource, Motorist, PickupLocation, RequestStatus,
    RescueRequest, VehicleInfo,
};
pub use service_type::{ServiceDefinition, ServiceType};
pub use situation::{DrivableAfter, FuelType, Situation, StuckIn};
