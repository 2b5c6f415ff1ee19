//! Política de campos de la situación
//!
//! Cada tipo de servicio exige un conjunto distinto de campos sobre la
//! situación del motorista. La política se modela como un sum type con un
//! match exhaustivo por servicio: agregar un servicio nuevo obliga al
//! compilador a señalar cada sitio que falta por cubrir.
//!
//! Contrato de UX: un campo booleano ausente o con tipo incorrecto produce
//! el mensaje "Please select Yes or No" sobre ese campo exacto, nunca un
//! error genérico de campo requerido.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

use crate::models::service_type::ServiceType;
use crate::utils::errors::field_error;

/// Combustible para entregas de emergencia
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Gasoline,
    Diesel,
}

/// Terreno en el que está atascado el vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StuckIn {
    Mud,
    Snow,
    Sand,
    Ditch,
    Other,
}

/// ¿El vehículo podrá conducirse después del rescate?
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrivableAfter {
    Yes,
    No,
    Unknown,
}

/// Detalle de la situación, una variante por tipo de servicio.
///
/// Serializa como el mapa plano que guarda la base de datos; las claves
/// requeridas de cada variante son disjuntas, así que `untagged` es seguro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Situation {
    FlatTire {
        tire_count: u8,
        has_spare: bool,
        safe_location: bool,
    },
    JumpStart {
        battery_accessible: bool,
        safe_location: bool,
    },
    Lockout {
        keys_inside: bool,
        key_fob_inside: bool,
        safe_location: bool,
    },
    FuelDelivery {
        fuel_type: FuelType,
        gallons_needed: u8,
        safe_location: bool,
    },
    BasicTow {
        tow_destination: String,
        keys_with_you: bool,
        can_shift_neutral: bool,
        needs_ride: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        passenger_count: Option<u8>,
    },
    WinchOut {
        stuck_in: StuckIn,
        drivable_after: DrivableAfter,
        safe_location: bool,
    },
}

impl Situation {
    /// Tipo de servicio al que corresponde esta situación
    pub fn service_type(&self) -> ServiceType {
        match self {
            Situation::FlatTire { .. } => ServiceType::FlatTire,
            Situation::JumpStart { .. } => ServiceType::JumpStart,
            Situation::Lockout { .. } => ServiceType::Lockout,
            Situation::FuelDelivery { .. } => ServiceType::FuelDelivery,
            Situation::BasicTow { .. } => ServiceType::BasicTow,
            Situation::WinchOut { .. } => ServiceType::WinchOut,
        }
    }

    /// Pares clave/valor legibles para humanos ("Tire Count: 2", "Has Spare: Yes")
    pub fn detail_lines(&self) -> Vec<(String, String)> {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (format_key(key), format_value(value)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Campos requeridos de la situación para un tipo de servicio
pub fn required_fields(service: ServiceType) -> &'static [&'static str] {
    match service {
        ServiceType::FlatTire => &["tire_count", "has_spare", "safe_location"],
        ServiceType::JumpStart => &["battery_accessible", "safe_location"],
        ServiceType::Lockout => &["keys_inside", "key_fob_inside", "safe_location"],
        ServiceType::FuelDelivery => &["fuel_type", "gallons_needed", "safe_location"],
        ServiceType::BasicTow => &[
            "tow_destination",
            "keys_with_you",
            "can_shift_neutral",
            "needs_ride",
        ],
        ServiceType::WinchOut => &["stuck_in", "drivable_after", "safe_location"],
    }
}

/// Valores por defecto con los que se precarga el sub-formulario
pub fn default_values(service: ServiceType) -> Value {
    match service {
        ServiceType::FlatTire => json!({ "tire_count": 1 }),
        ServiceType::JumpStart => json!({}),
        ServiceType::Lockout => json!({}),
        ServiceType::FuelDelivery => json!({ "gallons_needed": 2 }),
        ServiceType::BasicTow => json!({ "tow_destination": "" }),
        ServiceType::WinchOut => json!({}),
    }
}

/// Validar el JSON crudo de la situación contra la política del servicio.
///
/// Acumula todos los errores de campo antes de devolverlos para que el
/// formulario pueda marcarlos de una sola vez.
pub fn validate_situation(service: ServiceType, raw: &Value) -> Result<Situation, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let map = match raw.as_object() {
        Some(map) => map,
        None => {
            errors.add("situation", field_error("object", "Situation details are required"));
            return Err(errors);
        }
    };

    let situation = match service {
        ServiceType::FlatTire => {
            let tire_count = require_u8_range(
                map,
                "tire_count",
                1,
                4,
                "Please select the number of flat tires",
                "Number of flat tires must be between 1 and 4",
                &mut errors,
            );
            let has_spare = require_bool(map, "has_spare", &mut errors);
            let safe_location = require_bool(map, "safe_location", &mut errors);
            if errors.is_empty() {
                Some(Situation::FlatTire {
                    tire_count: tire_count.unwrap_or_default(),
                    has_spare: has_spare.unwrap_or_default(),
                    safe_location: safe_location.unwrap_or_default(),
                })
            } else {
                None
            }
        }

        ServiceType::JumpStart => {
            let battery_accessible = require_bool(map, "battery_accessible", &mut errors);
            let safe_location = require_bool(map, "safe_location", &mut errors);
            if errors.is_empty() {
                Some(Situation::JumpStart {
                    battery_accessible: battery_accessible.unwrap_or_default(),
                    safe_location: safe_location.unwrap_or_default(),
                })
            } else {
                None
            }
        }

        ServiceType::Lockout => {
            let keys_inside = require_bool(map, "keys_inside", &mut errors);
            let key_fob_inside = require_bool(map, "key_fob_inside", &mut errors);
            let safe_location = require_bool(map, "safe_location", &mut errors);
            if errors.is_empty() {
                Some(Situation::Lockout {
                    keys_inside: keys_inside.unwrap_or_default(),
                    key_fob_inside: key_fob_inside.unwrap_or_default(),
                    safe_location: safe_location.unwrap_or_default(),
                })
            } else {
                None
            }
        }

        ServiceType::FuelDelivery => {
            let fuel_type = require_enum::<FuelType>(
                map,
                "fuel_type",
                "Please select fuel type",
                &mut errors,
            );
            let gallons_needed = require_u8_range(
                map,
                "gallons_needed",
                1,
                5,
                "Please select gallons needed",
                "Gallons needed must be between 1 and 5",
                &mut errors,
            );
            let safe_location = require_bool(map, "safe_location", &mut errors);
            if errors.is_empty() {
                Some(Situation::FuelDelivery {
                    fuel_type: fuel_type.unwrap_or(FuelType::Gasoline),
                    gallons_needed: gallons_needed.unwrap_or_default(),
                    safe_location: safe_location.unwrap_or_default(),
                })
            } else {
                None
            }
        }

        ServiceType::BasicTow => {
            let tow_destination = match map.get("tow_destination") {
                Some(Value::String(s)) if s.chars().count() >= 5 => Some(s.clone()),
                Some(Value::String(_)) => {
                    errors.add(
                        "tow_destination",
                        field_error("min_length", "Please enter a valid destination address"),
                    );
                    None
                }
                _ => {
                    errors.add(
                        "tow_destination",
                        field_error("required", "Please enter a destination"),
                    );
                    None
                }
            };
            let keys_with_you = require_bool(map, "keys_with_you", &mut errors);
            let can_shift_neutral = require_bool(map, "can_shift_neutral", &mut errors);
            let needs_ride = require_bool(map, "needs_ride", &mut errors);

            // passenger_count solo es requerido cuando el motorista necesita transporte
            let passenger_count = match map.get("passenger_count") {
                Some(Value::Number(n)) => match n.as_u64() {
                    Some(count @ 1..=5) => Some(count as u8),
                    _ => {
                        errors.add(
                            "passenger_count",
                            field_error("range", "Passenger count must be between 1 and 5"),
                        );
                        None
                    }
                },
                Some(Value::Null) | None => {
                    if needs_ride == Some(true) {
                        errors.add(
                            "passenger_count",
                            field_error("required", "Please select the number of passengers"),
                        );
                    }
                    None
                }
                Some(_) => {
                    errors.add(
                        "passenger_count",
                        field_error("range", "Passenger count must be between 1 and 5"),
                    );
                    None
                }
            };

            if errors.is_empty() {
                Some(Situation::BasicTow {
                    tow_destination: tow_destination.unwrap_or_default(),
                    keys_with_you: keys_with_you.unwrap_or_default(),
                    can_shift_neutral: can_shift_neutral.unwrap_or_default(),
                    needs_ride: needs_ride.unwrap_or_default(),
                    passenger_count,
                })
            } else {
                None
            }
        }

        ServiceType::WinchOut => {
            let stuck_in = require_enum::<StuckIn>(
                map,
                "stuck_in",
                "Please select what your vehicle is stuck in",
                &mut errors,
            );
            let drivable_after = require_enum::<DrivableAfter>(
                map,
                "drivable_after",
                "Please select if vehicle will be drivable",
                &mut errors,
            );
            let safe_location = require_bool(map, "safe_location", &mut errors);
            if errors.is_empty() {
                Some(Situation::WinchOut {
                    stuck_in: stuck_in.unwrap_or(StuckIn::Other),
                    drivable_after: drivable_after.unwrap_or(DrivableAfter::Unknown),
                    safe_location: safe_location.unwrap_or_default(),
                })
            } else {
                None
            }
        }
    };

    match situation {
        Some(situation) => Ok(situation),
        None => Err(errors),
    }
}

/// Booleano requerido: ausente o no-booleano produce el mensaje Yes/No
fn require_bool(
    map: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match map.get(field) {
        Some(Value::Bool(b)) => Some(*b),
        _ => {
            errors.add(field, field_error("boolean", "Please select Yes or No"));
            None
        }
    }
}

/// Entero requerido en rango [min, max]
fn require_u8_range(
    map: &Map<String, Value>,
    field: &'static str,
    min: u64,
    max: u64,
    missing_message: &'static str,
    range_message: &'static str,
    errors: &mut ValidationErrors,
) -> Option<u8> {
    match map.get(field) {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(value) if (min..=max).contains(&value) => Some(value as u8),
            _ => {
                errors.add(field, field_error("range", range_message));
                None
            }
        },
        _ => {
            errors.add(field, field_error("required", missing_message));
            None
        }
    }
}

/// Enum requerido: el valor debe deserializar a la variante (snake_case)
fn require_enum<T: serde::de::DeserializeOwned>(
    map: &Map<String, Value>,
    field: &'static str,
    message: &'static str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match map.get(field) {
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(field, field_error("enum", message));
                None
            }
        },
        None => {
            errors.add(field, field_error("enum", message));
            None
        }
    }
}

/// "tire_count" -> "Tire Count"
fn format_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Booleanos como Yes/No, el resto tal cual
fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
