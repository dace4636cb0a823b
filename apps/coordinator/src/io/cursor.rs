// [apps/coordinator/src/io/cursor.rs]
/*!
 * =================================================================
 * APARATO: TIME CURSOR FILE (V6.0 - TIMELINE BEACON)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: PUBLICACIÓN DEL CURSOR TEMPORAL DEL SHOW
 *
 * Segundos con dos decimales, una línea, reescritura completa. El
 * bucle de tiro lo publica a ≤1 Hz; −1 significa "sin show cargado".
 * =================================================================
 */

use std::path::PathBuf;
use tracing::warn;

pub struct CursorFile {
    path: PathBuf,
}

impl CursorFile {
    pub fn new(path: PathBuf) -> CursorFile {
        CursorFile { path }
    }

    pub fn write(&self, seconds: f64) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(io_fault) = std::fs::write(&self.path, format!("{:.2}", seconds)) {
            warn!("⏱️ [CURSOR]: Could not publish time cursor: {}", io_fault);
        }
    }
}
