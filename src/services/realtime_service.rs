//! Feed de cambios en tiempo real
//!
//! Canal broadcast sobre el que el repositorio publica cada escritura
//! exitosa. Los consumidores (el tablero del operador, tests) se suscriben
//! y reciben los eventos a medida que ocurren; un feed sin suscriptores
//! descarta los eventos sin error.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::RescueRequest;

const FEED_CAPACITY: usize = 128;

/// Tipo de cambio sobre la tabla de solicitudes
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestEventKind {
    Inserted,
    Updated,
    Deleted,
}

/// Evento publicado tras cada escritura exitosa
#[derive(Debug, Clone, Serialize)]
pub struct RequestEvent {
    pub kind: RequestEventKind,
    pub record: RescueRequest,
}

/// Suscripción de cambios sobre las solicitudes de rescate
#[derive(Clone)]
pub struct RequestFeed {
    sender: broadcast::Sender<RequestEvent>,
}

impl RequestFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.sender.subscribe()
    }

    /// Publicar un evento; sin suscriptores el evento simplemente se descarta
    pub fn publish(&self, kind: RequestEventKind, record: RescueRequest) {
        let event = RequestEvent { kind, record };
        if self.sender.send(event).is_err() {
            log::debug!("📭 Request feed has no subscribers, event dropped");
        }
    }
}

impl Default for RequestFeed {
    fn default() -> Self {
        Self::new()
    }
}
