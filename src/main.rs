use anyhow::Result;
use axum::{middleware as axum_middleware, response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use rescue_intake::config::environment::EnvironmentConfig;
use rescue_intake::database::DatabaseConnection;
use rescue_intake::middleware::cors::cors_middleware;
use rescue_intake::middleware::rate_limit::{rate_limit_middleware, RateLimitState};
use rescue_intake::routes;
use rescue_intake::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚨 Roadside Rescue - Intake API");
    info!("===============================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    let pool = db_connection.pool().clone();

    let config = EnvironmentConfig::default();
    let rate_limit_state = RateLimitState::new(&config);
    let app_state = AppState::new(pool, config);

    // El proxy de geocodificación va detrás del rate limit; el resto no
    let geocoding_router = routes::geocoding_routes::create_geocoding_router().layer(
        axum_middleware::from_fn_with_state(rate_limit_state, rate_limit_middleware),
    );

    let app = Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/rescue", routes::rescue_routes::create_rescue_router())
        .nest("/api/geocoding", geocoding_router)
        .nest("/api/catalog", routes::catalog_routes::create_catalog_router())
        .layer(cors_middleware())
        .with_state(app_state);

    // Puerto del servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🛟 Endpoints - Rescue:");
    info!("   POST /api/rescue - Crear solicitud pendiente");
    info!("   GET  /api/rescue/:id - Obtener solicitud");
    info!("   PUT  /api/rescue/:id - Actualización parcial");
    info!("   POST /api/rescue/:id/submit - Envío final");
    info!("🗺️ Endpoints - Geocoding:");
    info!("   GET  /api/geocoding/forward - Geocodificación de dirección manual");
    info!("   GET  /api/geocoding/reverse - Proxy de geocodificación inversa");
    info!("📋 Endpoints - Catalog:");
    info!("   GET  /api/catalog/services - Catálogo de servicios");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                anyhow::anyhow!(e)
            })
    });

    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Roadside Rescue intake API up and running",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
