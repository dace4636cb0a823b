// [apps/coordinator/src/io/show_store.rs]
/*!
 * =================================================================
 * APARATO: SHOW STORE GATEWAY (V6.1 - EXTERNAL COLLABORATOR)
 * CLASIFICACIÓN: INFRASTRUCTURE PORT (ESTRATO L1-APP)
 * RESPONSABILIDAD: ACCESO AL ALMACÉN DE SHOWS POR INTERFAZ
 *
 * La persistencia de shows pertenece a un colaborador externo: este
 * puerto entrega el payload de presentación y acepta de vuelta el
 * payload de runtime derivado. El despliegue de campo usa el almacén
 * JSON por directorio; el relacional vive detrás del mismo contrato.
 * =================================================================
 */

use anyhow::Context;
use pyrolink_domain_models::show::{DisplayCue, ResolvedCue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Registro de un show tal como lo entrega el almacén.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    pub name: String,
    pub protocol: String,
    pub display_payload: Vec<DisplayCue>,
}

/// Puerto hacia el almacén de shows.
pub trait ShowStore: Send + Sync {
    /// Recupera un show por identificador. `None` si no existe.
    ///
    /// # Errors:
    /// Fallos de acceso o de formato del almacén.
    fn fetch_show(&self, show_id: i64) -> anyhow::Result<Option<ShowRecord>>;

    /// Persiste el payload de runtime derivado de la resolución.
    ///
    /// # Errors:
    /// Fallos de escritura en el almacén.
    fn store_runtime_payload(&self, show_id: i64, runtime: &[ResolvedCue]) -> anyhow::Result<()>;
}

/// Almacén por directorio: `show_<id>.json` entra,
/// `show_<id>.runtime.json` sale.
pub struct JsonShowStore {
    directory: PathBuf,
}

impl JsonShowStore {
    pub fn new(directory: PathBuf) -> JsonShowStore {
        JsonShowStore { directory }
    }

    fn show_path(&self, show_id: i64) -> PathBuf {
        self.directory.join(format!("show_{}.json", show_id))
    }

    fn runtime_path(&self, show_id: i64) -> PathBuf {
        self.directory.join(format!("show_{}.runtime.json", show_id))
    }
}

impl ShowStore for JsonShowStore {
    fn fetch_show(&self, show_id: i64) -> anyhow::Result<Option<ShowRecord>> {
        let path = self.show_path(show_id);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading show record {:?}", path))?;
        let record: ShowRecord = serde_json::from_str(&raw)
            .with_context(|| format!("parsing show record {:?}", path))?;

        debug!("🗄️ [SHOW_STORE]: Fetched show {} ({} cues).", show_id, record.display_payload.len());
        Ok(Some(record))
    }

    fn store_runtime_payload(&self, show_id: i64, runtime: &[ResolvedCue]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("creating show directory {:?}", self.directory))?;

        let path = self.runtime_path(show_id);
        let serialized = serde_json::to_string_pretty(runtime).context("serializing runtime payload")?;
        std::fs::write(&path, serialized)
            .with_context(|| format!("writing runtime payload {:?}", path))?;
        Ok(())
    }
}
