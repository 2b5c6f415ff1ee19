use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rescue_intake::models::{Draft, Motorist, RequestStatus, ServiceType, VehicleInfo};
use rescue_intake::wizard::{
    Coordinates, DraftStore, Entry, GeolocationError, GpsOutcome, InMemoryDraftStore,
    LocationProvider, ReverseGeocoder, StepOutcome, SubmissionGateway, SubmitOutcome,
    SubmitResult, WizardController, WizardStep,
};

struct GpsDenied;

#[async_trait]
impl LocationProvider for GpsDenied {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

struct StreetGeocoder;

#[async_trait]
impl ReverseGeocoder for StreetGeocoder {
    async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Option<String> {
        Some("1437 Bannock St, Denver, CO".to_string())
    }
}

struct FlakyGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl SubmissionGateway for FlakyGateway {
    async fn submit(&self, _draft: &Draft) -> SubmitOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SubmitOutcome {
            persisted: false,
            operator_notified: false,
            customer_notified: false,
        }
    }
}

fn build_controller() -> (WizardController, Arc<InMemoryDraftStore>, Arc<FlakyGateway>) {
    let store = Arc::new(InMemoryDraftStore::new());
    let gateway = Arc::new(FlakyGateway {
        calls: AtomicUsize::new(0),
    });
    let controller = WizardController::new(
        store.clone(),
        Arc::new(GpsDenied),
        Arc::new(StreetGeocoder),
        gateway.clone(),
    );
    (controller, store, gateway)
}

fn vehicle() -> VehicleInfo {
    VehicleInfo {
        make: "Toyota".to_string(),
        model: "Camry".to_string(),
        year: 2018,
        color: "Blue".to_string(),
        is_awd: false,
    }
}

fn motorist() -> Motorist {
    Motorist {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone: "(217) 555-0133".to_string(),
        email: "jane@example.com".to_string(),
    }
}

// Escenario completo: GPS denegado, entrada manual, envío con todos los
// efectos de red caídos. El motorista igual llega a la confirmación.
#[tokio::test]
async fn test_flat_tire_flow_with_denied_gps_and_failing_submit() {
    let (controller, store, gateway) = build_controller();

    let id = controller.begin().await.unwrap();
    assert_eq!(
        controller.select_service(id, ServiceType::FlatTire).await.unwrap(),
        StepOutcome::Advanced {
            next: WizardStep::LocationCapture
        }
    );

    // El GPS falla con su mensaje específico
    match controller.capture_location_gps(id).await.unwrap() {
        GpsOutcome::Failed { message, .. } => {
            assert_eq!(message, "Location permission denied. Please enter address manually.");
        }
        other => panic!("expected GPS failure, got {:?}", other),
    }

    // La entrada manual desbloquea el paso de situación
    controller
        .capture_location_manual(id, "123 Main St, Springfield".to_string(), 39.78, -89.65)
        .await
        .unwrap();
    controller
        .provide_situation(id, &json!({ "tire_count": 1, "has_spare": true, "safe_location": true }))
        .await
        .unwrap();
    controller.provide_vehicle(id, vehicle()).await.unwrap();
    controller.provide_motorist(id, motorist()).await.unwrap();

    match controller.submit(id).await.unwrap() {
        SubmitResult::Submitted { next, outcome } => {
            assert_eq!(next, WizardStep::Submitted);
            assert!(!outcome.persisted);
            assert!(!outcome.operator_notified);
        }
        other => panic!("expected submitted, got {:?}", other),
    }
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

    // El borrador queda localmente en submitted con source manual
    let draft = store.load(id).await.unwrap().unwrap();
    assert_eq!(draft.status, RequestStatus::Submitted);
    let location = draft.pickup_location.unwrap();
    assert_eq!(location.address, "123 Main St, Springfield");
}

#[tokio::test]
async fn test_basic_tow_requires_passengers_when_ride_needed() {
    let (controller, _, _) = build_controller();

    let id = controller.begin().await.unwrap();
    controller.select_service(id, ServiceType::BasicTow).await.unwrap();
    controller
        .capture_location_manual(id, "800 Oak Ave, Springfield".to_string(), 39.8, -89.6)
        .await
        .unwrap();

    // needs_ride=true sin passenger_count: rechazado
    let err = controller
        .provide_situation(
            id,
            &json!({
                "tow_destination": "Joe's Garage, 44 Elm St",
                "keys_with_you": true,
                "can_shift_neutral": false,
                "needs_ride": true
            }),
        )
        .await
        .unwrap_err();
    assert!(format!("{:?}", err).contains("passenger_count"));

    // Con passenger_count presente pasa
    controller
        .provide_situation(
            id,
            &json!({
                "tow_destination": "Joe's Garage, 44 Elm St",
                "keys_with_you": true,
                "can_shift_neutral": false,
                "needs_ride": true,
                "passenger_count": 2
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_double_submit_is_idempotent_for_the_user() {
    let (controller, _, gateway) = build_controller();

    let id = controller.begin().await.unwrap();
    controller.select_service(id, ServiceType::JumpStart).await.unwrap();
    controller
        .capture_location_manual(id, "800 Oak Ave, Springfield".to_string(), 39.8, -89.6)
        .await
        .unwrap();
    controller
        .provide_situation(id, &json!({ "battery_accessible": true, "safe_location": false }))
        .await
        .unwrap();
    controller.provide_vehicle(id, vehicle()).await.unwrap();
    controller.provide_motorist(id, motorist()).await.unwrap();

    // Doble click en "Submit": ambos intentos llegan a la confirmación y
    // el gateway decide con su upsert que no haya duplicados
    assert!(matches!(
        controller.submit(id).await.unwrap(),
        SubmitResult::Submitted { .. }
    ));
    assert!(matches!(
        controller.submit(id).await.unwrap(),
        SubmitResult::Submitted { .. }
    ));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_deep_link_into_wizard_without_draft_redirects() {
    let (controller, _, _) = build_controller();

    for step in [
        WizardStep::Situation,
        WizardStep::Vehicle,
        WizardStep::Motorist,
        WizardStep::Submitted,
    ] {
        let entry = controller.enter(uuid::Uuid::new_v4(), step).await.unwrap();
        assert_eq!(entry, Entry::RedirectToStart);
    }
}

#[tokio::test]
async fn test_winch_out_situation_with_enums() {
    let (controller, store, _) = build_controller();

    let id = controller.begin().await.unwrap();
    controller.select_service(id, ServiceType::WinchOut).await.unwrap();
    controller
        .capture_location_manual(id, "Rural Route 9, mile 12".to_string(), 39.9, -89.4)
        .await
        .unwrap();

    // Valor de enum fuera del dominio: rechazado
    let err = controller
        .provide_situation(
            id,
            &json!({ "stuck_in": "lava", "drivable_after": "yes", "safe_location": true }),
        )
        .await
        .unwrap_err();
    assert!(format!("{:?}", err).contains("stuck_in"));

    controller
        .provide_situation(
            id,
            &json!({ "stuck_in": "mud", "drivable_after": "unknown", "safe_location": true }),
        )
        .await
        .unwrap();

    let draft = store.load(id).await.unwrap().unwrap();
    assert!(draft.situation.is_some());
}
