// [apps/coordinator/src/main.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR MAIN ENTRY POINT (V6.0 - SAFE IGNITION)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El kernel se cablea por completo antes de lanzar hilo alguno: el
 * lector del enlace jamás despacha una trama hacia un motor a medio
 * construir. El token de apagado es único y lo observan los cuatro
 * bucles de larga vida.
 * =================================================================
 */

use dotenvy::dotenv;
use pyrolink_coordinator::prelude::*;
use pyrolink_shared_watchtower::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO
    dotenv().ok();

    // 2. OBSERVABILIDAD (WATCHTOWER)
    init_tracing("pyrolink_coordinator");

    // 3. TOPOLOGÍA DE ARCHIVOS Y COORDENADAS DE RED
    let layout = FilesystemLayout::from_environment();

    // 4. IGNICIÓN DEL KERNEL (fatal si la configuración falta)
    let coordinator = match Coordinator::ignite(layout) {
        Ok(coordinator) => coordinator,
        Err(ignition_fault) => {
            error!("❌ [IGNITION_FAILED]: {:#}", ignition_fault);
            std::process::exit(1);
        }
    };

    // 5. APAGADO COOPERATIVO POR SIGINT
    let shutdown_handle = coordinator.clone();
    ctrlc::set_handler(move || {
        info!("🛑 [SIGNAL]: Interrupt received. Raising shutdown token.");
        shutdown_handle.request_shutdown();
    })?;

    // 6. GRACIA DE ARRANQUE
    info!(
        "🛰️ [BOOT]: Waiting {:?} to start.. just to give everyone time to take their places.",
        pyrolink_coordinator::paths::STARTUP_GRACE
    );
    std::thread::sleep(pyrolink_coordinator::paths::STARTUP_GRACE);

    // 7. OPERACIÓN
    coordinator.run();
    Ok(())
}
