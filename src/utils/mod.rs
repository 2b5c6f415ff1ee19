//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores y validación
//! compartidas por el resto de la aplicación.

pub mod errors;
pub mod validation;
