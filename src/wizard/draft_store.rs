//! Almacén de borradores del wizard
//!
//! Persistencia key-value del borrador en progreso, indexada por el
//! identificador de la solicitud. La ausencia de un borrador es un estado
//! válido y esperado (señal de redirect al inicio), nunca un error.
//!
//! El trait permite cambiar la implementación (memoria, sesión del lado
//! servidor, store cifrado) sin tocar el controlador del wizard.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Draft;
use crate::utils::errors::AppResult;

/// Contrato de persistencia de borradores
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Cargar un borrador; `Ok(None)` significa "no existe"
    async fn load(&self, id: Uuid) -> AppResult<Option<Draft>>;

    /// Guardar (crear o reemplazar) un borrador
    async fn save(&self, draft: &Draft) -> AppResult<()>;

    /// Eliminar un borrador; eliminar uno inexistente no es error
    async fn clear(&self, id: Uuid) -> AppResult<()>;
}

/// Implementación en memoria, un solo escritor por borrador
pub struct InMemoryDraftStore {
    drafts: Arc<RwLock<HashMap<Uuid, Draft>>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self {
            drafts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn load(&self, id: Uuid) -> AppResult<Option<Draft>> {
        let drafts = self.drafts.read().await;
        Ok(drafts.get(&id).cloned())
    }

    async fn save(&self, draft: &Draft) -> AppResult<()> {
        let mut drafts = self.drafts.write().await;
        drafts.insert(draft.request_id, draft.clone());
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> AppResult<()> {
        let mut drafts = self.drafts.write().await;
        drafts.remove(&id);
        Ok(())
    }
}
