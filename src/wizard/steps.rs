//! Secuencia de páginas del wizard
//!
//! Máquina de estados estrictamente lineal:
//! start -> service_select -> location_capture -> situation -> vehicle
//! -> motorist -> submitted

use serde::{Deserialize, Serialize};

use crate::models::Draft;

/// Página del wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Start,
    ServiceSelect,
    LocationCapture,
    Situation,
    Vehicle,
    Motorist,
    Submitted,
}

impl WizardStep {
    /// Página siguiente en la secuencia; `None` al final
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Start => Some(WizardStep::ServiceSelect),
            WizardStep::ServiceSelect => Some(WizardStep::LocationCapture),
            WizardStep::LocationCapture => Some(WizardStep::Situation),
            WizardStep::Situation => Some(WizardStep::Vehicle),
            WizardStep::Vehicle => Some(WizardStep::Motorist),
            WizardStep::Motorist => Some(WizardStep::Submitted),
            WizardStep::Submitted => None,
        }
    }

    /// ¿El borrador tiene completos todos los pasos previos a esta página?
    ///
    /// Navegar hacia atrás a una página ya completada siempre está
    /// permitido; lo que se bloquea es saltar hacia adelante.
    pub fn prerequisites_met(&self, draft: &Draft) -> bool {
        match self {
            WizardStep::Start | WizardStep::ServiceSelect => true,
            WizardStep::LocationCapture => draft.service_type.is_some(),
            WizardStep::Situation => {
                draft.service_type.is_some() && draft.pickup_location.is_some()
            }
            WizardStep::Vehicle => {
                draft.service_type.is_some()
                    && draft.pickup_location.is_some()
                    && draft.situation.is_some()
            }
            WizardStep::Motorist => {
                draft.service_type.is_some()
                    && draft.pickup_location.is_some()
                    && draft.situation.is_some()
                    && draft.vehicle.is_some()
            }
            WizardStep::Submitted => draft.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LocationSource, Motorist, PickupLocation, ServiceType, Situation, VehicleInfo,
    };

    fn draft_through_situation() -> Draft {
        let mut draft = Draft::new();
        draft.service_type = Some(ServiceType::JumpStart);
        draft.pickup_location = Some(PickupLocation {
            address: "700 W Colfax Ave, Denver".to_string(),
            lat: 39.74,
            lng: -105.0,
            source: LocationSource::Gps,
        });
        draft.situation = Some(Situation::JumpStart {
            battery_accessible: true,
            safe_location: true,
        });
        draft
    }

    #[test]
    fn test_linear_order() {
        let mut step = WizardStep::Start;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            visited.push(next);
            step = next;
        }
        assert_eq!(
            visited,
            vec![
                WizardStep::Start,
                WizardStep::ServiceSelect,
                WizardStep::LocationCapture,
                WizardStep::Situation,
                WizardStep::Vehicle,
                WizardStep::Motorist,
                WizardStep::Submitted,
            ]
        );
    }

    #[test]
    fn test_prerequisites_build_up() {
        let empty = Draft::new();
        assert!(WizardStep::ServiceSelect.prerequisites_met(&empty));
        assert!(!WizardStep::LocationCapture.prerequisites_met(&empty));
        assert!(!WizardStep::Vehicle.prerequisites_met(&empty));

        let mut draft = draft_through_situation();
        assert!(WizardStep::Vehicle.prerequisites_met(&draft));
        assert!(!WizardStep::Motorist.prerequisites_met(&draft));

        draft.vehicle = Some(VehicleInfo {
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2015,
            color: "Red".to_string(),
            is_awd: false,
        });
        assert!(WizardStep::Motorist.prerequisites_met(&draft));
        assert!(!WizardStep::Submitted.prerequisites_met(&draft));

        draft.motorist = Some(Motorist {
            first_name: "Sam".to_string(),
            last_name: "Rivera".to_string(),
            phone: "3035551234".to_string(),
            email: "sam@example.com".to_string(),
        });
        assert!(WizardStep::Submitted.prerequisites_met(&draft));
    }

    #[test]
    fn test_back_navigation_always_allowed() {
        let draft = draft_through_situation();
        // Volver a una página anterior ya completada
        assert!(WizardStep::ServiceSelect.prerequisites_met(&draft));
        assert!(WizardStep::LocationCapture.prerequisites_met(&draft));
    }
}
