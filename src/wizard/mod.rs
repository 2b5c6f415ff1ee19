//! Módulo del wizard de intake
//!
//! Todo lo que el flujo multi-paso necesita: la secuencia de páginas, el
//! almacén de borradores, la captura de ubicación y el controlador que
//! orquesta los pasos contra las capacidades inyectadas.

pub mod controller;
pub mod draft_store;
pub mod location;
pub mod steps;

pub use controller::{
    Entry, GpsOutcome, StepOutcome, SubmissionGateway, SubmitOutcome, SubmitResult,
    WizardController,
};
pub use draft_store::{DraftStore, InMemoryDraftStore};
pub use location::{
    autocomplete_ready, capture_gps_location, format_coordinates, Coordinates, GeolocationError,
    LocationProvider, PlacesAutocomplete, ReverseGeocoder, AUTOCOMPLETE_READY_TIMEOUT,
    GPS_TIMEOUT,
};
pub use steps::WizardStep;
