pub mod catalog_routes;
pub mod geocoding_routes;
pub mod rescue_routes;
