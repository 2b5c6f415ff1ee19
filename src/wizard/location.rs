//! Captura de ubicación
//!
//! Este módulo define las capacidades inyectadas que el wizard consume para
//! ubicar al motorista: geolocalización del dispositivo, geocodificación
//! inversa y autocomplete de direcciones. Las implementaciones reales viven
//! en `services`; el wizard solo conoce los traits.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::models::{LocationSource, PickupLocation};

/// Tiempo máximo de espera por una posición GPS
pub const GPS_TIMEOUT: Duration = Duration::from_secs(10);

/// Tiempo máximo de espera por la señal "ready" del autocomplete
pub const AUTOCOMPLETE_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordenadas del dispositivo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Fallas de geolocalización, cada una con su mensaje propio para el usuario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("geolocation timed out")]
    Timeout,
    #[error("geolocation not supported")]
    Unsupported,
}

impl GeolocationError {
    /// Mensaje mostrado al usuario junto con la opción de entrada manual
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location permission denied. Please enter address manually."
            }
            GeolocationError::PositionUnavailable => {
                "Location unavailable. Please enter address manually."
            }
            GeolocationError::Timeout => "Location request timed out. Please try again.",
            GeolocationError::Unsupported => "Geolocation is not supported",
        }
    }
}

/// Capacidad de geolocalización del dispositivo
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Capacidad de geocodificación inversa (coordenadas -> dirección).
///
/// La implementación encapsula la cadena primario/fallback; `None` significa
/// que ningún nivel pudo resolver una dirección legible.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String>;
}

/// Capacidad de autocomplete de direcciones con señal explícita de "ready".
///
/// El proveedor real carga de forma diferida; en lugar de sondear con un
/// intervalo, el consumidor espera `ready()` con un timeout acotado.
#[async_trait]
pub trait PlacesAutocomplete: Send + Sync {
    /// Se resuelve una sola vez, cuando el proveedor terminó de cargar
    async fn ready(&self);

    /// Sugerencias de dirección para un prefijo de búsqueda
    async fn suggest(&self, query: &str) -> Vec<String>;
}

/// Esperar la señal de ready del autocomplete, abandonando tras el timeout
pub async fn autocomplete_ready(places: &dyn PlacesAutocomplete) -> bool {
    timeout(AUTOCOMPLETE_READY_TIMEOUT, places.ready()).await.is_ok()
}

/// "39.739200, -104.990300" — la dirección degenerada que mostramos cuando
/// ningún geocodificador responde
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    format!("{:.6}, {:.6}", lat, lng)
}

/// Adquirir posición GPS y resolverla a una ubicación de recogida.
///
/// La adquisición está acotada por `GPS_TIMEOUT`; si el geocodificador no
/// resuelve, la dirección queda como el par de coordenadas formateado (sigue
/// siendo una ubicación utilizable, con `source = gps`).
pub async fn capture_gps_location(
    provider: &dyn LocationProvider,
    geocoder: &dyn ReverseGeocoder,
) -> Result<PickupLocation, GeolocationError> {
    let coords = match timeout(GPS_TIMEOUT, provider.current_position()).await {
        Ok(result) => result?,
        Err(_) => return Err(GeolocationError::Timeout),
    };

    let address = match geocoder.reverse_geocode(coords.lat, coords.lng).await {
        Some(address) => address,
        None => format_coordinates(coords.lat, coords.lng),
    };

    Ok(PickupLocation {
        address,
        lat: coords.lat,
        lng: coords.lng,
        source: LocationSource::Gps,
    })
}
