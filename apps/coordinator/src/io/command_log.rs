// [apps/coordinator/src/io/command_log.rs]
/*!
 * =================================================================
 * APARATO: COMMAND DEBUG LOG (V6.0 - DONGLE ECHO TRAIL)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ARCHIVO DE ECOS DE COMANDO DEL DONGLE
 *
 * Las tramas 'cmd' son ecos de depuración del firmware: se archivan
 * una por línea con marca de milisegundos y no se consumen más.
 * =================================================================
 */

use chrono::Local;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

pub struct CommandDebugLog {
    path: PathBuf,
    writer_guard: Mutex<()>,
}

impl CommandDebugLog {
    pub fn new(path: PathBuf) -> CommandDebugLog {
        CommandDebugLog {
            path,
            writer_guard: Mutex::new(()),
        }
    }

    /// Archiva un eco con marca `[YYYY-mm-dd HH:MM:SS.mmm]`.
    pub fn append(&self, echo: &Value) {
        let _guard = self.writer_guard.lock().expect("LOCK_POISONED");

        let stamp = Local::now().format("[%Y-%m-%d %H:%M:%S%.3f]");
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let appended = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{} {}", stamp, echo));

        if let Err(io_fault) = appended {
            warn!("📼 [CMD_LOG]: Could not archive command echo: {}", io_fault);
        }
    }
}
