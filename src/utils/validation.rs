//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! compartidas entre los schemas del wizard y los DTOs de la API.

use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Caracteres permitidos en un teléfono: dígitos, espacios, guiones, paréntesis y '+'
    static ref PHONE_RE: Regex = Regex::new(r"^[\d\s\-\(\)\+]+$").unwrap();
    /// Par de coordenadas crudas, p.ej. "40.712800, -74.006000"
    static ref COORDINATE_PAIR_RE: Regex = Regex::new(r"^-?\d+\.\d+,\s*-?\d+\.\d+$").unwrap();
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !validator::validate_email(value) {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono: al menos 10 caracteres y charset telefónico
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 10 {
        let mut error = ValidationError::new("phone_length");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    if !PHONE_RE.is_match(value) {
        let mut error = ValidationError::new("phone_charset");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de coordenadas GPS
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }

    if !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }

    Ok(())
}

/// Año máximo aceptado para un vehículo (el modelo del año próximo ya se vende)
pub fn max_vehicle_year() -> i32 {
    Utc::now().year() + 1
}

/// Validar el año de un vehículo: 1980 hasta el año próximo
pub fn validate_vehicle_year(year: i32) -> Result<(), ValidationError> {
    if year < 1980 {
        let mut error = ValidationError::new("year_min");
        error.message = Some("Year must be 1980 or later".into());
        error.add_param("value".into(), &year);
        return Err(error);
    }
    if year > max_vehicle_year() {
        let mut error = ValidationError::new("year_max");
        error.message = Some("Invalid year".into());
        error.add_param("value".into(), &year);
        return Err(error);
    }
    Ok(())
}

/// Detectar una "dirección" degenerada que es solo un par de coordenadas
pub fn is_coordinate_pair(address: &str) -> bool {
    COORDINATE_PAIR_RE.is_match(address.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("test@").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(555) 123-4567").is_ok());
        assert!(validate_phone("+1 555 123 4567").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(45.0, -75.0).is_ok());
        assert!(validate_coordinates(91.0, -75.0).is_err());
        assert!(validate_coordinates(45.0, -181.0).is_err());
    }

    #[test]
    fn test_validate_vehicle_year_boundaries() {
        assert!(validate_vehicle_year(1979).is_err());
        assert!(validate_vehicle_year(1980).is_ok());
        assert!(validate_vehicle_year(max_vehicle_year()).is_ok());
        assert!(validate_vehicle_year(max_vehicle_year() + 1).is_err());
    }

    #[test]
    fn test_is_coordinate_pair() {
        assert!(is_coordinate_pair("40.712800, -74.006000"));
        assert!(is_coordinate_pair("-33.865143,151.209900"));
        assert!(!is_coordinate_pair("123 Main St, Springfield"));
        assert!(!is_coordinate_pair("40.7128"));
    }
}
