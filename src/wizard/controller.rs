//! Controlador del wizard
//!
//! Orquesta la secuencia de páginas: cada operación carga el borrador,
//! valida su rebanada, escribe de vuelta con `updated_at` refrescado y
//! devuelve la página siguiente. Un borrador ausente (o con pasos previos
//! incompletos) nunca es un error: es una señal de redirect al inicio.
//!
//! El envío final es optimista: la navegación a la página de confirmación
//! ocurre sin importar el resultado de red, porque el borrador ya quedó
//! cacheado localmente con estado `submitted` para recuperación manual.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::situation::validate_situation;
use crate::models::{Draft, Motorist, PickupLocation, RequestStatus, ServiceType, VehicleInfo};
use crate::utils::errors::{AppError, AppResult};
use crate::wizard::draft_store::DraftStore;
use crate::wizard::location::{
    capture_gps_location, GeolocationError, LocationProvider, ReverseGeocoder,
};
use crate::wizard::steps::WizardStep;
use crate::models::LocationSource;

/// Resultado del gateway de envío. Nunca falla: cada efecto reporta su
/// propio booleano y las fallas quedan logueadas.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub persisted: bool,
    pub operator_notified: bool,
    pub customer_notified: bool,
}

/// Gateway que persiste la solicitud completa y dispara las notificaciones
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, draft: &Draft) -> SubmitOutcome;
}

/// Resultado de entrar a una página por navegación directa
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Allowed(Box<Draft>),
    RedirectToStart,
}

/// Resultado de completar un paso
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced { next: WizardStep },
    RedirectToStart,
}

/// Resultado del intento de captura GPS
#[derive(Debug, Clone, PartialEq)]
pub enum GpsOutcome {
    Captured {
        next: WizardStep,
        location: PickupLocation,
    },
    /// El GPS falló: se muestra el mensaje y se ofrece entrada manual
    Failed {
        error: GeolocationError,
        message: &'static str,
    },
    RedirectToStart,
}

/// Resultado del envío final
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    Submitted {
        next: WizardStep,
        outcome: SubmitOutcome,
    },
    RedirectToStart,
}

pub struct WizardController {
    store: Arc<dyn DraftStore>,
    locator: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    gateway: Arc<dyn SubmissionGateway>,
}

impl WizardController {
    pub fn new(
        store: Arc<dyn DraftStore>,
        locator: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Self {
        Self {
            store,
            locator,
            geocoder,
            gateway,
        }
    }

    /// Crear un borrador nuevo y devolver su identificador
    pub async fn begin(&self) -> AppResult<Uuid> {
        let draft = Draft::new();
        self.store.save(&draft).await?;
        log::info!("🆕 Draft {} created", draft.short_id());
        Ok(draft.request_id)
    }

    /// Guardia de navegación directa a una página del wizard
    pub async fn enter(&self, id: Uuid, step: WizardStep) -> AppResult<Entry> {
        match self.store.load(id).await? {
            Some(draft) if step.prerequisites_met(&draft) => Ok(Entry::Allowed(Box::new(draft))),
            Some(_) => {
                log::warn!("↩️ Draft {} missing prerequisites for {:?}, redirecting", id, step);
                Ok(Entry::RedirectToStart)
            }
            None => {
                log::warn!("↩️ No draft for {}, redirecting to start", id);
                Ok(Entry::RedirectToStart)
            }
        }
    }

    /// Paso 1: elegir el tipo de servicio
    pub async fn select_service(&self, id: Uuid, service: ServiceType) -> AppResult<StepOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(StepOutcome::RedirectToStart);
        };

        // Cambiar de servicio invalida la situación ya capturada
        if draft.service_type.is_some() && draft.service_type != Some(service) {
            draft.situation = None;
        }
        draft.service_type = Some(service);
        draft.touch();
        self.store.save(&draft).await?;

        Ok(StepOutcome::Advanced {
            next: WizardStep::LocationCapture,
        })
    }

    /// Paso 2, camino GPS: adquirir posición y resolver dirección.
    ///
    /// Una falla de GPS no avanza ni es un error HTTP: devuelve el mensaje
    /// específico del motivo para que la página ofrezca entrada manual.
    pub async fn capture_location_gps(&self, id: Uuid) -> AppResult<GpsOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(GpsOutcome::RedirectToStart);
        };
        if !WizardStep::LocationCapture.prerequisites_met(&draft) {
            return Ok(GpsOutcome::RedirectToStart);
        }

        match capture_gps_location(self.locator.as_ref(), self.geocoder.as_ref()).await {
            Ok(location) => {
                draft.pickup_location = Some(location.clone());
                draft.touch();
                self.store.save(&draft).await?;
                Ok(GpsOutcome::Captured {
                    next: WizardStep::Situation,
                    location,
                })
            }
            Err(error) => {
                log::warn!("📍 GPS capture failed for {}: {}", draft.short_id(), error);
                Ok(GpsOutcome::Failed {
                    error,
                    message: error.user_message(),
                })
            }
        }
    }

    /// Paso 2, camino manual: dirección escrita (con asistencia de
    /// autocomplete aguas arriba)
    pub async fn capture_location_manual(
        &self,
        id: Uuid,
        address: String,
        lat: f64,
        lng: f64,
    ) -> AppResult<StepOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(StepOutcome::RedirectToStart);
        };
        if !WizardStep::LocationCapture.prerequisites_met(&draft) {
            return Ok(StepOutcome::RedirectToStart);
        }

        let location = PickupLocation {
            address,
            lat,
            lng,
            source: LocationSource::Manual,
        };
        location.validate()?;

        draft.pickup_location = Some(location);
        draft.touch();
        self.store.save(&draft).await?;

        Ok(StepOutcome::Advanced {
            next: WizardStep::Situation,
        })
    }

    /// Paso 3: detalles de la situación, validados contra la política del
    /// servicio elegido en el paso 1
    pub async fn provide_situation(&self, id: Uuid, raw: &Value) -> AppResult<StepOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(StepOutcome::RedirectToStart);
        };
        if !WizardStep::Situation.prerequisites_met(&draft) {
            return Ok(StepOutcome::RedirectToStart);
        }

        let service = draft
            .service_type
            .ok_or_else(|| AppError::Internal("draft missing service type".to_string()))?;
        let situation = validate_situation(service, raw).map_err(AppError::Validation)?;

        draft.situation = Some(situation);
        draft.touch();
        self.store.save(&draft).await?;

        Ok(StepOutcome::Advanced {
            next: WizardStep::Vehicle,
        })
    }

    /// Paso 4: vehículo
    pub async fn provide_vehicle(&self, id: Uuid, vehicle: VehicleInfo) -> AppResult<StepOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(StepOutcome::RedirectToStart);
        };
        if !WizardStep::Vehicle.prerequisites_met(&draft) {
            return Ok(StepOutcome::RedirectToStart);
        }

        vehicle.validate()?;
        draft.vehicle = Some(vehicle);
        draft.touch();
        self.store.save(&draft).await?;

        Ok(StepOutcome::Advanced {
            next: WizardStep::Motorist,
        })
    }

    /// Paso 5: contacto del motorista
    pub async fn provide_motorist(&self, id: Uuid, motorist: Motorist) -> AppResult<StepOutcome> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(StepOutcome::RedirectToStart);
        };
        if !WizardStep::Motorist.prerequisites_met(&draft) {
            return Ok(StepOutcome::RedirectToStart);
        }

        motorist.validate()?;
        draft.motorist = Some(motorist);
        draft.touch();
        self.store.save(&draft).await?;

        Ok(StepOutcome::Advanced {
            next: WizardStep::Submitted,
        })
    }

    /// Envío final: marca el borrador `submitted`, lo guarda y dispara el
    /// gateway. La navegación es optimista: llega a `Submitted` aunque la
    /// persistencia o las notificaciones fallen.
    pub async fn submit(&self, id: Uuid) -> AppResult<SubmitResult> {
        let Some(mut draft) = self.store.load(id).await? else {
            return Ok(SubmitResult::RedirectToStart);
        };
        if !draft.is_complete() {
            return Ok(SubmitResult::RedirectToStart);
        }

        draft.status = RequestStatus::Submitted;
        draft.touch();
        self.store.save(&draft).await?;

        let outcome = self.gateway.submit(&draft).await;
        log::info!(
            "📤 Request {} submitted: persisted={} operator={} customer={}",
            draft.short_id(),
            outcome.persisted,
            outcome.operator_notified,
            outcome.customer_notified
        );

        Ok(SubmitResult::Submitted {
            next: WizardStep::Submitted,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::draft_store::InMemoryDraftStore;
    use crate::wizard::location::Coordinates;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct GpsDenied;

    #[async_trait]
    impl LocationProvider for GpsDenied {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            Err(GeolocationError::PermissionDenied)
        }
    }

    struct GpsAt(Coordinates);

    #[async_trait]
    impl LocationProvider for GpsAt {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            Ok(self.0)
        }
    }

    struct NoGeocoder;

    #[async_trait]
    impl ReverseGeocoder for NoGeocoder {
        async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Option<String> {
            None
        }
    }

    /// Gateway que cuenta llamadas y reporta el outcome configurado
    struct RecordingGateway {
        calls: AtomicUsize,
        outcome: SubmitOutcome,
    }

    impl RecordingGateway {
        fn new(outcome: SubmitOutcome) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }
    }

    #[async_trait]
    impl SubmissionGateway for RecordingGateway {
        async fn submit(&self, _draft: &Draft) -> SubmitOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    fn controller_with(
        locator: Arc<dyn LocationProvider>,
        gateway: Arc<RecordingGateway>,
    ) -> (WizardController, Arc<InMemoryDraftStore>) {
        let store = Arc::new(InMemoryDraftStore::new());
        let controller = WizardController::new(
            store.clone(),
            locator,
            Arc::new(NoGeocoder),
            gateway,
        );
        (controller, store)
    }

    fn all_ok() -> SubmitOutcome {
        SubmitOutcome {
            persisted: true,
            operator_notified: true,
            customer_notified: true,
        }
    }

    async fn complete_flow(controller: &WizardController) -> Uuid {
        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::FlatTire)
            .await
            .unwrap();
        controller
            .capture_location_manual(id, "123 Main St, Springfield".to_string(), 39.78, -89.65)
            .await
            .unwrap();
        controller
            .provide_situation(
                id,
                &json!({ "tire_count": 1, "has_spare": true, "safe_location": true }),
            )
            .await
            .unwrap();
        controller
            .provide_vehicle(
                id,
                VehicleInfo {
                    make: "Toyota".to_string(),
                    model: "Corolla".to_string(),
                    year: 2019,
                    color: "Silver".to_string(),
                    is_awd: false,
                },
            )
            .await
            .unwrap();
        controller
            .provide_motorist(
                id,
                Motorist {
                    first_name: "Ana".to_string(),
                    last_name: "Lopez".to_string(),
                    phone: "2175550133".to_string(),
                    email: "ana@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_direct_navigation_without_draft_redirects() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, _) = controller_with(Arc::new(GpsDenied), gateway);

        let entry = controller
            .enter(Uuid::new_v4(), WizardStep::Vehicle)
            .await
            .unwrap();
        assert_eq!(entry, Entry::RedirectToStart);
    }

    #[tokio::test]
    async fn test_skipping_ahead_redirects() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, _) = controller_with(Arc::new(GpsDenied), gateway);

        let id = controller.begin().await.unwrap();
        // Sin servicio ni ubicación, la página de vehículo no es accesible
        let entry = controller.enter(id, WizardStep::Vehicle).await.unwrap();
        assert_eq!(entry, Entry::RedirectToStart);

        // Pero la selección de servicio sí
        let entry = controller.enter(id, WizardStep::ServiceSelect).await.unwrap();
        assert!(matches!(entry, Entry::Allowed(_)));
    }

    #[tokio::test]
    async fn test_gps_denied_then_manual_entry() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, store) = controller_with(Arc::new(GpsDenied), gateway);

        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::FlatTire)
            .await
            .unwrap();

        let gps = controller.capture_location_gps(id).await.unwrap();
        match gps {
            GpsOutcome::Failed { error, message } => {
                assert_eq!(error, GeolocationError::PermissionDenied);
                assert_eq!(
                    message,
                    "Location permission denied. Please enter address manually."
                );
            }
            other => panic!("expected GPS failure, got {:?}", other),
        }

        let outcome = controller
            .capture_location_manual(id, "123 Main St, Springfield".to_string(), 39.78, -89.65)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Advanced {
                next: WizardStep::Situation
            }
        );

        let draft = store.load(id).await.unwrap().unwrap();
        let location = draft.pickup_location.unwrap();
        assert_eq!(location.address, "123 Main St, Springfield");
        assert_eq!(location.source, LocationSource::Manual);
    }

    #[tokio::test]
    async fn test_gps_capture_writes_gps_source() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, store) = controller_with(
            Arc::new(GpsAt(Coordinates { lat: 39.7392, lng: -104.9903 })),
            gateway,
        );

        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::JumpStart)
            .await
            .unwrap();

        let gps = controller.capture_location_gps(id).await.unwrap();
        assert!(matches!(gps, GpsOutcome::Captured { .. }));

        let draft = store.load(id).await.unwrap().unwrap();
        assert_eq!(draft.pickup_location.unwrap().source, LocationSource::Gps);
    }

    #[tokio::test]
    async fn test_situation_validated_against_selected_service() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, _) = controller_with(Arc::new(GpsDenied), gateway);

        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::Lockout)
            .await
            .unwrap();
        controller
            .capture_location_manual(id, "800 Oak Ave, Springfield".to_string(), 39.8, -89.6)
            .await
            .unwrap();

        // Campos de flat_tire contra un servicio lockout: todos los
        // booleanos de lockout faltan
        let err = controller
            .provide_situation(id, &json!({ "tire_count": 2 }))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("keys_inside"));
                assert!(errors.field_errors().contains_key("key_fob_inside"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_changing_service_clears_situation() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, store) = controller_with(Arc::new(GpsDenied), gateway);

        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::JumpStart)
            .await
            .unwrap();
        controller
            .capture_location_manual(id, "800 Oak Ave, Springfield".to_string(), 39.8, -89.6)
            .await
            .unwrap();
        controller
            .provide_situation(
                id,
                &json!({ "battery_accessible": true, "safe_location": true }),
            )
            .await
            .unwrap();

        controller
            .select_service(id, ServiceType::WinchOut)
            .await
            .unwrap();

        let draft = store.load(id).await.unwrap().unwrap();
        assert!(draft.situation.is_none());
    }

    #[tokio::test]
    async fn test_full_flow_submits_optimistically_on_total_failure() {
        let gateway = Arc::new(RecordingGateway::new(SubmitOutcome {
            persisted: false,
            operator_notified: false,
            customer_notified: false,
        }));
        let (controller, store) = controller_with(Arc::new(GpsDenied), gateway.clone());

        let id = complete_flow(&controller).await;
        let result = controller.submit(id).await.unwrap();

        match result {
            SubmitResult::Submitted { next, outcome } => {
                assert_eq!(next, WizardStep::Submitted);
                assert!(!outcome.persisted);
            }
            other => panic!("expected submitted, got {:?}", other),
        }
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        // El borrador sigue recuperable localmente con estado submitted
        let draft = store.load(id).await.unwrap().unwrap();
        assert_eq!(draft.status, RequestStatus::Submitted);
    }

    #[tokio::test]
    async fn test_submit_incomplete_draft_redirects() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, _) = controller_with(Arc::new(GpsDenied), gateway.clone());

        let id = controller.begin().await.unwrap();
        controller
            .select_service(id, ServiceType::BasicTow)
            .await
            .unwrap();

        let result = controller.submit(id).await.unwrap();
        assert_eq!(result, SubmitResult::RedirectToStart);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_back_navigation_preserves_draft() {
        let gateway = Arc::new(RecordingGateway::new(all_ok()));
        let (controller, _) = controller_with(Arc::new(GpsDenied), gateway);

        let id = complete_flow(&controller).await;

        // Volver a la página de situación: permitida y con los datos intactos
        let entry = controller.enter(id, WizardStep::Situation).await.unwrap();
        match entry {
            Entry::Allowed(draft) => {
                assert!(draft.situation.is_some());
                assert!(draft.vehicle.is_some());
            }
            other => panic!("expected allowed entry, got {:?}", other),
        }
    }
}
