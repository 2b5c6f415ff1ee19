//! Controlador de solicitudes de rescate
//!
//! Orquesta la persistencia best-effort del API público y el envío final.
//! La regla central: una vez que el motorista completó el wizard, nada del
//! lado servidor (base caída, email caído) convierte su envío en un error.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::request_dto::{
    CreateRescueRequest, RescueRequestResponse, SubmitRescueRequest, SubmitResponse,
    UpdateRescueRequest,
};
use crate::models::situation::validate_situation;
use crate::models::{Draft, RequestStatus, RescueRequest};
use crate::repositories::request_repository::{RequestChanges, RequestRepository};
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{AppError, AppResult};
use crate::wizard::controller::{SubmissionGateway, SubmitOutcome};

pub struct RequestController {
    repository: Arc<RequestRepository>,
    notifications: Arc<NotificationService>,
}

impl RequestController {
    pub fn new(repository: Arc<RequestRepository>, notifications: Arc<NotificationService>) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// Crear la fila `pending` inicial. La inserción es best-effort: si la
    /// base no responde, el wizard sigue con su copia local.
    pub async fn create(&self, request: CreateRescueRequest) -> AppResult<RescueRequestResponse> {
        request.pickup_location.validate()?;

        let request_id = request.request_id.unwrap_or_else(Uuid::new_v4);

        match self
            .repository
            .create(request_id, request.service_type, &request.pickup_location)
            .await
        {
            Ok(_) => Ok(RescueRequestResponse {
                success: true,
                request_id,
                message: "Request created".to_string(),
            }),
            Err(e) => {
                log::error!("❌ Best-effort create failed for {}: {}", request_id, e);
                Ok(RescueRequestResponse {
                    success: true,
                    request_id,
                    message: "Request accepted (persistence deferred)".to_string(),
                })
            }
        }
    }

    /// Mezcla parcial best-effort de los campos presentes
    pub async fn update(
        &self,
        request_id: Uuid,
        request: UpdateRescueRequest,
    ) -> AppResult<RescueRequestResponse> {
        if let Some(vehicle) = &request.vehicle {
            vehicle.validate()?;
        }
        if let Some(motorist) = &request.motorist {
            motorist.validate()?;
        }

        let changes = RequestChanges {
            situation: request.situation,
            vehicle: request.vehicle,
            motorist: request.motorist,
            status: request.status,
        };

        match self.repository.update_partial(request_id, &changes).await {
            Ok(Some(_)) => Ok(RescueRequestResponse {
                success: true,
                request_id,
                message: "Request updated".to_string(),
            }),
            Ok(None) => Err(AppError::NotFound("Rescue request not found".to_string())),
            Err(e) => {
                log::error!("❌ Best-effort update failed for {}: {}", request_id, e);
                Ok(RescueRequestResponse {
                    success: true,
                    request_id,
                    message: "Update accepted (persistence deferred)".to_string(),
                })
            }
        }
    }

    pub async fn get(&self, request_id: Uuid) -> AppResult<RescueRequest> {
        self.repository
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rescue request not found".to_string()))
    }

    /// Envío final por HTTP: valida el payload completo, arma el borrador y
    /// delega en el gateway. Devuelve 200 con los flags informativos aunque
    /// la persistencia o las notificaciones fallen.
    pub async fn submit(
        &self,
        request_id: Uuid,
        request: SubmitRescueRequest,
    ) -> AppResult<SubmitResponse> {
        let motorist = request
            .motorist
            .ok_or_else(|| AppError::BadRequest("Contact information is required".to_string()))?;
        let (Some(service_type), Some(pickup_location)) =
            (request.service_type, request.pickup_location)
        else {
            return Err(AppError::BadRequest(
                "Service and location are required".to_string(),
            ));
        };

        motorist.validate()?;
        pickup_location.validate()?;
        if let Some(vehicle) = &request.vehicle {
            vehicle.validate()?;
        }
        let situation = request
            .situation
            .as_ref()
            .map(|raw| validate_situation(service_type, raw))
            .transpose()?;

        let now = chrono::Utc::now();
        let draft = Draft {
            request_id,
            service_type: Some(service_type),
            pickup_location: Some(pickup_location),
            situation,
            vehicle: request.vehicle,
            motorist: Some(motorist),
            status: RequestStatus::Submitted,
            created_at: now,
            updated_at: now,
        };

        let outcome = self.submit_draft(&draft).await;

        Ok(SubmitResponse {
            success: true,
            request_id,
            message: "Request submitted".to_string(),
            operator_notified: outcome.operator_notified,
            customer_notified: outcome.customer_notified,
        })
    }

    /// Núcleo del gateway: upsert primero, después ambas notificaciones en
    /// paralelo. Ninguna falla revierte nada ni se propaga.
    async fn submit_draft(&self, draft: &Draft) -> SubmitOutcome {
        let persisted = match self.repository.upsert_submitted(draft).await {
            Ok(_) => true,
            Err(e) => {
                log::error!("❌ Submit persistence failed for {}: {}", draft.short_id(), e);
                false
            }
        };

        let (operator_notified, customer_notified) = self.notifications.notify_all(draft).await;

        SubmitOutcome {
            persisted,
            operator_notified,
            customer_notified,
        }
    }
}

#[async_trait]
impl SubmissionGateway for RequestController {
    async fn submit(&self, draft: &Draft) -> SubmitOutcome {
        self.submit_draft(draft).await
    }
}
