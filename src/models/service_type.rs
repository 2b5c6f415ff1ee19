//! Catálogo de servicios
//!
//! Este módulo define los tipos de servicio de asistencia en carretera
//! y su catálogo estático (label, descripción, icono). El catálogo es
//! inmutable durante toda la vida del proceso.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipo de servicio solicitado por el motorista
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    FlatTire,
    JumpStart,
    Lockout,
    FuelDelivery,
    BasicTow,
    WinchOut,
}

/// Definición estática de un servicio del catálogo
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDefinition {
    pub id: ServiceType,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl ServiceType {
    /// Todos los servicios del catálogo, en el orden en que se muestran
    pub const ALL: [ServiceType; 6] = [
        ServiceType::FlatTire,
        ServiceType::JumpStart,
        ServiceType::Lockout,
        ServiceType::FuelDelivery,
        ServiceType::BasicTow,
        ServiceType::WinchOut,
    ];

    /// Definición del catálogo para este servicio
    pub fn definition(&self) -> ServiceDefinition {
        match self {
            ServiceType::FlatTire => ServiceDefinition {
                id: *self,
                label: "Flat Tire",
                description: "Tire change or repair assistance",
                icon: "tire",
            },
            ServiceType::JumpStart => ServiceDefinition {
                id: *self,
                label: "Jump Start",
                description: "Battery boost to get you going",
                icon: "battery",
            },
            ServiceType::Lockout => ServiceDefinition {
                id: *self,
                label: "Lockout",
                description: "Locked out of your vehicle",
                icon: "key",
            },
            ServiceType::FuelDelivery => ServiceDefinition {
                id: *self,
                label: "Fuel Delivery",
                description: "Emergency fuel delivery",
                icon: "fuel",
            },
            ServiceType::BasicTow => ServiceDefinition {
                id: *self,
                label: "Basic Tow",
                description: "Tow to your preferred location",
                icon: "tow",
            },
            ServiceType::WinchOut => ServiceDefinition {
                id: *self,
                label: "Winch Out",
                description: "Vehicle recovery from stuck position",
                icon: "winch",
            },
        }
    }

    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    /// Identificador en el wire (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::FlatTire => "flat_tire",
            ServiceType::JumpStart => "jump_start",
            ServiceType::Lockout => "lockout",
            ServiceType::FuelDelivery => "fuel_delivery",
            ServiceType::BasicTow => "basic_tow",
            ServiceType::WinchOut => "winch_out",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat_tire" => Ok(ServiceType::FlatTire),
            "jump_start" => Ok(ServiceType::JumpStart),
            "lockout" => Ok(ServiceType::Lockout),
            "fuel_delivery" => Ok(ServiceType::FuelDelivery),
            "basic_tow" => Ok(ServiceType::BasicTow),
            "winch_out" => Ok(ServiceType::WinchOut),
            other => Err(format!("unknown service type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for service in ServiceType::ALL {
            let parsed: ServiceType = service.as_str().parse().unwrap();
            assert_eq!(parsed, service);
        }
        assert!("tire_change".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ServiceType::FlatTire).unwrap();
        assert_eq!(json, "\"flat_tire\"");
        let back: ServiceType = serde_json::from_str("\"winch_out\"").unwrap();
        assert_eq!(back, ServiceType::WinchOut);
    }

    #[test]
    fn test_catalog_labels() {
        assert_eq!(ServiceType::FlatTire.label(), "Flat Tire");
        assert_eq!(ServiceType::BasicTow.definition().icon, "tow");
        assert_eq!(
            ServiceType::WinchOut.definition().description,
            "Vehicle recovery from stuck position"
        );
    }
}
