//! Modelo de solicitud de rescate
//!
//! Este módulo contiene el borrador que el wizard construye paso a paso
//! (`Draft`) y la fila persistida en PostgreSQL (`RescueRequest`), que
//! mapea a la tabla `rescue_requests` con columnas JSONB para los
//! sub-objetos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::models::service_type::ServiceType;
use crate::models::situation::Situation;
use crate::utils::errors::field_error;
use crate::utils::validation;

/// Origen de la ubicación de recogida
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Gps,
    Manual,
}

/// Ubicación de recogida del motorista
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickupLocation {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub source: LocationSource,
}

impl PickupLocation {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.address.chars().count() < 5 {
            errors.add("address", field_error("min_length", "Please enter a valid address"));
        }
        if let Err(e) = validation::validate_coordinates(self.lat, self.lng) {
            errors.add("coordinates", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Estado del ciclo de vida de una solicitud
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Submitted,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Submitted => "submitted",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "submitted" => Ok(RequestStatus::Submitted),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

/// Información del vehículo del motorista
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    #[serde(default)]
    pub is_awd: bool,
}

impl VehicleInfo {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.make.trim().is_empty() {
            errors.add("make", field_error("required", "Make is required"));
        }
        if self.model.trim().is_empty() {
            errors.add("model", field_error("required", "Model is required"));
        }
        if self.color.trim().is_empty() {
            errors.add("color", field_error("required", "Color is required"));
        }
        if let Err(e) = validation::validate_vehicle_year(self.year) {
            errors.add("year", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// "2018 Toyota Camry (Blue) - AWD"
    pub fn describe(&self) -> String {
        let awd = if self.is_awd { " - AWD" } else { "" };
        format!("{} {} {} ({}){}", self.year, self.make, self.model, self.color, awd)
    }
}

/// Datos de contacto del motorista
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Motorist {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl Motorist {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.add("first_name", field_error("required", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.add("last_name", field_error("required", "Last name is required"));
        }
        match validation::validate_phone(&self.phone) {
            Ok(()) => {}
            Err(e) if e.code == "phone_length" => {
                errors.add(
                    "phone",
                    field_error("phone_length", "Phone number must be at least 10 digits"),
                );
            }
            Err(_) => {
                errors.add(
                    "phone",
                    field_error("phone_charset", "Please enter a valid phone number"),
                );
            }
        }
        if validation::validate_email(&self.email).is_err() {
            errors.add("email", field_error("email", "Please enter a valid email address"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Borrador de solicitud en progreso, propiedad exclusiva de la sesión del
/// wizard hasta que el envío final transfiere una copia a persistencia.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub request_id: Uuid,
    pub service_type: Option<ServiceType>,
    pub pickup_location: Option<PickupLocation>,
    pub situation: Option<Situation>,
    pub vehicle: Option<VehicleInfo>,
    pub motorist: Option<Motorist>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// Borrador nuevo con identificador fresco y estado `pending`
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            request_id: Uuid::new_v4(),
            service_type: None,
            pickup_location: None,
            situation: None,
            vehicle: None,
            motorist: None,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refrescar `updated_at`; se llama en cada escritura de paso
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// ¿Están completos todos los pasos previos al envío?
    pub fn is_complete(&self) -> bool {
        self.service_type.is_some()
            && self.pickup_location.is_some()
            && self.situation.is_some()
            && self.vehicle.is_some()
            && self.motorist.is_some()
    }

    /// Identificador corto para asunto de email y referencia del cliente
    pub fn short_id(&self) -> String {
        short_request_id(&self.request_id)
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

/// Primeros 8 caracteres hex del UUID, en mayúsculas
pub fn short_request_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

/// Fila persistida en la tabla `rescue_requests`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RescueRequest {
    pub request_id: Uuid,
    pub service_type: String,
    pub pickup_location: Json<PickupLocation>,
    pub situation: Option<Json<Value>>,
    pub vehicle: Option<Json<VehicleInfo>>,
    pub motorist: Option<Json<Motorist>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
