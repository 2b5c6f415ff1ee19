//! Servicio de geocodificación
//!
//! Cadena primario/fallback: Mapbox (si hay token configurado) y el
//! endpoint público de Nominatim como respaldo. Los resultados inversos se
//! cachean en memoria por coordenadas redondeadas a 4 decimales para no
//! golpear las APIs externas en re-renders de la misma posición.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::utils::validation::is_coordinate_pair;
use crate::wizard::location::ReverseGeocoder;

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodingRequest {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodingResponse {
    pub success: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingResponse {
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
    properties: MapboxProperties,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<f64>, // [longitude, latitude]
}

#[derive(Debug, Deserialize)]
struct MapboxProperties {
    full_address: Option<String>,
    name: Option<String>,
    place_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimReverseResponse {
    display_name: Option<String>,
}

pub struct GeocodingService {
    mapbox_token: Option<String>,
    client: reqwest::Client,
    reverse_cache: Arc<RwLock<HashMap<String, String>>>,
}

impl GeocodingService {
    pub fn new(mapbox_token: Option<String>, client: reqwest::Client) -> Self {
        Self {
            mapbox_token,
            client,
            reverse_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clave de cache: coordenadas redondeadas a 4 decimales (~11 m)
    fn cache_key(lat: f64, lng: f64) -> String {
        format!("{:.4},{:.4}", lat, lng)
    }

    /// Geocodificación directa (dirección -> coordenadas) vía Mapbox
    pub async fn geocode_address(&self, address: &str) -> Result<GeocodingResponse> {
        log::info!("🗺️ Geocoding address: {}", address);

        let Some(token) = &self.mapbox_token else {
            return Ok(GeocodingResponse {
                success: false,
                latitude: None,
                longitude: None,
                formatted_address: None,
                message: None,
                error: Some("Geocoding provider not configured".to_string()),
            });
        };

        let encoded_address = urlencoding::encode(address);
        let url = format!(
            "https://api.mapbox.com/search/geocode/v6/forward?q={}&access_token={}&limit=1",
            encoded_address, token
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "RescueIntake/1.0")
            .send()
            .await?;

        let status = response.status();
        log::info!("📡 Geocoding response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Geocoding failed with status {}: {}", status, error_text);
            return Ok(GeocodingResponse {
                success: false,
                latitude: None,
                longitude: None,
                formatted_address: None,
                message: None,
                error: Some(format!("Geocoding failed: {}", status)),
            });
        }

        let response_text = response.text().await?;
        let mapbox_response: MapboxGeocodingResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse geocoding response: {}", e))?;

        if let Some(feature) = mapbox_response.features.first() {
            if feature.geometry.coordinates.len() >= 2 {
                let longitude = feature.geometry.coordinates[0];
                let latitude = feature.geometry.coordinates[1];

                let formatted_address = feature
                    .properties
                    .full_address
                    .clone()
                    .or_else(|| feature.properties.place_name.clone())
                    .or_else(|| feature.properties.name.clone());

                log::info!("✅ Geocoding successful: {} -> ({}, {})", address, latitude, longitude);

                return Ok(GeocodingResponse {
                    success: true,
                    latitude: Some(latitude),
                    longitude: Some(longitude),
                    formatted_address,
                    message: Some("Geocoding successful".to_string()),
                    error: None,
                });
            }
        }

        log::warn!("⚠️ No coordinates found for address: {}", address);
        Ok(GeocodingResponse {
            success: false,
            latitude: None,
            longitude: None,
            formatted_address: None,
            message: Some("No coordinates found for this address".to_string()),
            error: None,
        })
    }

    /// Geocodificación inversa con cache y fallback.
    ///
    /// Orden: cache -> Mapbox (si hay token) -> Nominatim. Una respuesta de
    /// Mapbox que es solo un par de coordenadas cuenta como fallo y pasa al
    /// fallback.
    pub async fn reverse(&self, lat: f64, lng: f64) -> Option<String> {
        let key = Self::cache_key(lat, lng);
        {
            let cache = self.reverse_cache.read().await;
            if let Some(address) = cache.get(&key) {
                log::info!("💾 Reverse geocode cache hit for {}", key);
                return Some(address.clone());
            }
        }

        let mut address = self.reverse_mapbox(lat, lng).await;

        // Una "dirección" que es solo coordenadas no le sirve al motorista
        if address.as_deref().map(is_coordinate_pair).unwrap_or(true) {
            address = self.reverse_nominatim(lat, lng).await;
        }

        if let Some(found) = &address {
            let mut cache = self.reverse_cache.write().await;
            cache.insert(key, found.clone());
        }
        address
    }

    async fn reverse_mapbox(&self, lat: f64, lng: f64) -> Option<String> {
        let token = self.mapbox_token.as_ref()?;
        let url = format!(
            "https://api.mapbox.com/search/geocode/v6/reverse?longitude={}&latitude={}&access_token={}&limit=1",
            lng, lat, token
        );

        let response = match self
            .client
            .get(&url)
            .header("User-Agent", "RescueIntake/1.0")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::warn!("⚠️ Mapbox reverse geocode status {}", response.status());
                return None;
            }
            Err(e) => {
                log::warn!("⚠️ Mapbox reverse geocode error: {}", e);
                return None;
            }
        };

        let parsed: MapboxGeocodingResponse = response.json().await.ok()?;
        let feature = parsed.features.into_iter().next()?;
        feature
            .properties
            .full_address
            .or(feature.properties.place_name)
            .or(feature.properties.name)
    }

    async fn reverse_nominatim(&self, lat: f64, lng: f64) -> Option<String> {
        let url = format!(
            "https://nominatim.openstreetmap.org/reverse?format=json&lat={}&lon={}",
            lat, lng
        );

        let response = match self
            .client
            .get(&url)
            .header("User-Agent", "RescueIntake/1.0")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::warn!("⚠️ Nominatim reverse geocode status {}", response.status());
                return None;
            }
            Err(e) => {
                log::warn!("⚠️ Nominatim reverse geocode error: {}", e);
                return None;
            }
        };

        let parsed: NominatimReverseResponse = response.json().await.ok()?;
        match &parsed.display_name {
            Some(name) => log::info!("✅ Nominatim resolved ({}, {}) -> {}", lat, lng, name),
            None => log::warn!("⚠️ Nominatim returned no display_name for ({}, {})", lat, lng),
        }
        parsed.display_name
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodingService {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        self.reverse(lat, lng).await
    }
}
