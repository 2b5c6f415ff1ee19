//! Backend de intake de asistencia en carretera
//!
//! Expone el wizard multi-paso, el catálogo de servicios, el proxy de
//! geocodificación y el gateway de envío con sus notificaciones.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod wizard;
