//! Repositorio de solicitudes de rescate
//!
//! Acceso a la tabla `rescue_requests`. Cada escritura exitosa publica su
//! evento en el feed de cambios; los lectores del tablero se suscriben al
//! feed, no a la base.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Draft, Motorist, PickupLocation, RequestStatus, RescueRequest, ServiceType, VehicleInfo,
};
use crate::services::realtime_service::{RequestEventKind, RequestFeed};
use crate::utils::errors::{AppError, AppResult};

/// Cambios parciales aplicables a una fila existente
#[derive(Debug, Default)]
pub struct RequestChanges {
    pub situation: Option<Value>,
    pub vehicle: Option<VehicleInfo>,
    pub motorist: Option<Motorist>,
    pub status: Option<RequestStatus>,
}

pub struct RequestRepository {
    pool: PgPool,
    feed: RequestFeed,
}

impl RequestRepository {
    pub fn new(pool: PgPool, feed: RequestFeed) -> Self {
        Self { pool, feed }
    }

    /// Insertar una fila nueva en estado `pending`
    pub async fn create(
        &self,
        request_id: Uuid,
        service_type: ServiceType,
        pickup_location: &PickupLocation,
    ) -> AppResult<RescueRequest> {
        let record = sqlx::query_as::<_, RescueRequest>(
            r#"
            INSERT INTO rescue_requests (
                request_id, service_type, pickup_location, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, 'pending', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(service_type.as_str())
        .bind(Json(pickup_location))
        .fetch_one(&self.pool)
        .await?;

        self.feed.publish(RequestEventKind::Inserted, record.clone());
        Ok(record)
    }

    /// Mezcla parcial: solo los campos presentes se sobreescriben, el resto
    /// se conserva con COALESCE. `None` si la fila no existe.
    pub async fn update_partial(
        &self,
        request_id: Uuid,
        changes: &RequestChanges,
    ) -> AppResult<Option<RescueRequest>> {
        let record = sqlx::query_as::<_, RescueRequest>(
            r#"
            UPDATE rescue_requests
            SET situation  = COALESCE($2, situation),
                vehicle    = COALESCE($3, vehicle),
                motorist   = COALESCE($4, motorist),
                status     = COALESCE($5, status),
                updated_at = NOW()
            WHERE request_id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(changes.situation.as_ref().map(Json))
        .bind(changes.vehicle.as_ref().map(Json))
        .bind(changes.motorist.as_ref().map(Json))
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = &record {
            self.feed.publish(RequestEventKind::Updated, record.clone());
        }
        Ok(record)
    }

    /// Upsert idempotente del envío final: crea la fila completa o
    /// sobreescribe la existente, siempre con estado `submitted`.
    pub async fn upsert_submitted(&self, draft: &Draft) -> AppResult<RescueRequest> {
        let service_type = draft
            .service_type
            .ok_or_else(|| AppError::BadRequest("Service and location are required".to_string()))?;
        let pickup_location = draft
            .pickup_location
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Service and location are required".to_string()))?;

        let existed = self.find_by_id(draft.request_id).await?.is_some();

        let situation = draft
            .situation
            .as_ref()
            .map(|s| serde_json::to_value(s))
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to serialize situation: {}", e)))?;

        let record = sqlx::query_as::<_, RescueRequest>(
            r#"
            INSERT INTO rescue_requests (
                request_id, service_type, pickup_location, situation, vehicle,
                motorist, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'submitted', NOW(), NOW())
            ON CONFLICT (request_id) DO UPDATE
            SET service_type    = EXCLUDED.service_type,
                pickup_location = EXCLUDED.pickup_location,
                situation       = EXCLUDED.situation,
                vehicle         = EXCLUDED.vehicle,
                motorist        = EXCLUDED.motorist,
                status          = 'submitted',
                updated_at      = NOW()
            RETURNING *
            "#,
        )
        .bind(draft.request_id)
        .bind(service_type.as_str())
        .bind(Json(pickup_location))
        .bind(situation.map(Json))
        .bind(draft.vehicle.as_ref().map(Json))
        .bind(draft.motorist.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await?;

        let kind = if existed {
            RequestEventKind::Updated
        } else {
            RequestEventKind::Inserted
        };
        self.feed.publish(kind, record.clone());
        Ok(record)
    }

    pub async fn find_by_id(&self, request_id: Uuid) -> AppResult<Option<RescueRequest>> {
        let record = sqlx::query_as::<_, RescueRequest>(
            "SELECT * FROM rescue_requests WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn delete(&self, request_id: Uuid) -> AppResult<bool> {
        let record = self.find_by_id(request_id).await?;

        let result = sqlx::query("DELETE FROM rescue_requests WHERE request_id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            if let Some(record) = record {
                self.feed.publish(RequestEventKind::Deleted, record);
            }
        }
        Ok(deleted)
    }
}
