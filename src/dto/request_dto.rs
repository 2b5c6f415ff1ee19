use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Motorist, PickupLocation, RequestStatus, ServiceType, VehicleInfo};

// Request para crear un borrador persistido
#[derive(Debug, Deserialize)]
pub struct CreateRescueRequest {
    // El cliente puede traer su propio id (borrador ya iniciado offline)
    pub request_id: Option<Uuid>,
    pub service_type: ServiceType,
    pub pickup_location: PickupLocation,
}

// Request de actualización parcial: solo los campos presentes se tocan
#[derive(Debug, Deserialize, Default)]
pub struct UpdateRescueRequest {
    pub situation: Option<Value>,
    pub vehicle: Option<VehicleInfo>,
    pub motorist: Option<Motorist>,
    pub status: Option<RequestStatus>,
}

// Request del envío final: el payload completo del wizard. Los faltantes
// se reportan con los mensajes del flujo, no con errores de deserialización
#[derive(Debug, Deserialize, Default)]
pub struct SubmitRescueRequest {
    pub service_type: Option<ServiceType>,
    pub pickup_location: Option<PickupLocation>,
    pub situation: Option<Value>,
    pub vehicle: Option<VehicleInfo>,
    pub motorist: Option<Motorist>,
}

// Response del create/update
#[derive(Debug, Serialize)]
pub struct RescueRequestResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub message: String,
}

// Response del envío final: los flags de notificación son informativos,
// el success es true aunque fallen
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub message: String,
    pub operator_notified: bool,
    pub customer_notified: bool,
}

// Query del proxy de geocodificación inversa
#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct ReverseGeocodeResponse {
    pub success: bool,
    pub address: Option<String>,
}
