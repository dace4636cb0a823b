// [apps/coordinator/src/io/error_log.rs]
/*!
 * =================================================================
 * APARATO: DAEMON ERROR LOG (V6.0 - FORENSIC TRAIL)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: BITÁCORA DE ERRORES OPERATIVOS EN DISCO
 *
 * Una línea por error con marca temporal entre corchetes. El archivo
 * es la memoria del operador: sobrevive al proceso y lo lee el
 * publicador web. Escritor único, flush en cada línea.
 * =================================================================
 */

use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, warn};

pub struct ErrorLog {
    path: PathBuf,
    writer_guard: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: PathBuf) -> ErrorLog {
        ErrorLog {
            path,
            writer_guard: Mutex::new(()),
        }
    }

    /// Registra un error con marca `[YYYY-mm-dd HH:MM:SSZ]`.
    pub fn append(&self, message: &str) {
        let _guard = self.writer_guard.lock().expect("LOCK_POISONED");

        let stamped_line = format!("{} {}", Local::now().format("[%Y-%m-%d %H:%M:%SZ]"), message);
        error!("📓 [DAEMON_ERR]: {}", message);

        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let appended = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", stamped_line));

        if let Err(io_fault) = appended {
            warn!("📓 [DAEMON_ERR]: Could not persist error line: {}", io_fault);
        }
    }
}
