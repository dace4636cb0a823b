// [apps/coordinator/src/io/inbox.rs]
/*!
 * =================================================================
 * APARATO: COMMAND INBOX POLLER (V6.1 - DROP DIRECTORY)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONSUMO ATÓMICO DE MANDOS JSON DE AGENTES EXTERNOS
 *
 * Cada archivo del buzón es un mando único: se lee, se despacha y se
 * borra. Un archivo imposible de interpretar también se borra (con
 * registro); el buzón jamás se atasca con basura.
 * =================================================================
 */

use crate::kernel::Coordinator;
use pyrolink_domain_models::command::DropCommand;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cadencia de sondeo del buzón.
pub const INBOX_POLL_PERIOD: Duration = Duration::from_millis(500);

/// Vacía el buzón una vez: lee, interpreta y borra cada archivo.
/// Devuelve los mandos interpretados en orden estable de nombre.
pub fn drain_inbox(command_dir: &Path) -> Vec<DropCommand> {
    if let Err(io_fault) = std::fs::create_dir_all(command_dir) {
        warn!("📬 [INBOX]: Cannot ensure drop directory: {}", io_fault);
        return Vec::new();
    }

    let Ok(entries) = std::fs::read_dir(command_dir) else {
        return Vec::new();
    };

    let mut file_paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    file_paths.sort();

    let mut drained: Vec<DropCommand> = Vec::new();

    for path in file_paths {
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<DropCommand>(&raw) {
                Ok(command) => {
                    info!("📬 [INBOX]: Loaded command from {:?}.", path.file_name());
                    drained.push(command);
                }
                Err(parse_fault) => {
                    warn!("📬 [INBOX]: Discarding unreadable command {:?}: {}", path, parse_fault);
                }
            },
            Err(io_fault) => {
                warn!("📬 [INBOX]: Could not read {:?}: {}", path, io_fault);
            }
        }

        if let Err(io_fault) = std::fs::remove_file(&path) {
            warn!("📬 [INBOX]: Could not delete consumed file {:?}: {}", path, io_fault);
        } else {
            debug!("📬 [INBOX]: Deleted command file {:?}.", path);
        }
    }

    drained
}

/// Bucle del hilo del buzón: drena cada 500 ms, despacha al kernel y
/// aprovecha el tick para el latido del motor y el snapshot.
pub fn run_inbox_loop(coordinator: &Arc<Coordinator>) {
    info!("📬 [INBOX]: Drop-directory poller initiated.");

    while !coordinator.shutdown_requested() {
        for command in drain_inbox(coordinator.layout().command_dir.as_path()) {
            coordinator.handle_command(command);
        }

        coordinator.update_state_file();
        coordinator.engine().bounce();

        std::thread::sleep(INBOX_POLL_PERIOD);
    }

    info!("📬 [INBOX]: Poller terminated by shutdown token.");
}
