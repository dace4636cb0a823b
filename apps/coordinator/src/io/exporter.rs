// [apps/coordinator/src/io/exporter.rs]
/*!
 * =================================================================
 * APARATO: STATE EXPORTER (V6.1 - PANOPTICON FEED)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: SNAPSHOT INTEGRAL DEL COORDINADOR EN DISCO
 *
 * El snapshot se reconstruye entero y se reescribe en cada tick del
 * monitor de interruptores y del buzón. El publicador web lo lee tal
 * cual; aquí no hay estado incremental que pueda desfasarse.
 * =================================================================
 */

use crate::engine::clock::wall_clock_ms;
use crate::kernel::Coordinator;
use pyrolink_domain_models::config::HYBRID_PROTOCOL_ID;
use pyrolink_domain_models::snapshot::{RfSettings, SettingsSnapshot, StateSnapshot};
use tracing::warn;

/// Silencio máximo del dongle antes de declararlo mudo en el snapshot.
const DEVICE_SILENCE_WINDOW_MS: i64 = 10_000;

/// Construye el snapshot integral del estado vigente.
pub fn build_snapshot(coordinator: &Coordinator) -> StateSnapshot {
    let now_ms = wall_clock_ms();
    let link = coordinator.link();
    let engine = coordinator.engine();
    let indicators = coordinator.indicators();
    let gates = coordinator.gate_snapshot();

    let last_received = link.last_received_epoch_ms();
    let last_sent = link.last_sent_epoch_ms();

    StateSnapshot {
        device_running: last_received != 0 && now_ms - last_received <= DEVICE_SILENCE_WINDOW_MS,
        device_found: link.is_connected(),
        device_address: gates.serial_addr.clone(),
        daemon_lup: now_ms,
        show_loaded: engine.show_loaded(),
        loaded_show_name: gates.loaded_show_name.clone(),
        loaded_show_id: gates.loaded_show_id,
        show_running: engine.is_running_show(),
        device_is_transmitting: last_sent != 0 && now_ms - last_sent <= DEVICE_SILENCE_WINDOW_MS,
        device_is_armed: gates.is_armed,
        manual_fire_active: gates.man_fire_enabled,
        start_sw_active: gates.start_sw_active,
        fire_check_failures: gates.fire_check_failures.clone(),
        proto_handler_errors: engine.errors(),
        proto_handler_status: engine.state().name().to_string(),
        active_protocol: HYBRID_PROTOCOL_ID.to_string(),
        dstc: gates.delegate_start_to_client,
        sst: engine.show_start_time_ms(),
        receivers: coordinator.registry().export_snapshots(),
        waiting_for_client_start: gates.waiting_for_client_start,
        settings: SettingsSnapshot {
            led_brightness: indicators.get("led_brightness"),
            fire_repeat_ct: engine.fire_repetition(),
            receiver_timeout_ms: indicators.get("receiver_timeout_ms"),
            command_response_timeout_ms: indicators.get("command_response_timeout_ms"),
            clock_sync_interval_ms: indicators.get("clock_sync_interval_ms"),
            dongle_sync_interval_ms: indicators.get("dongle_sync_interval_ms"),
            config_query_interval_ms: indicators.get("config_query_interval_ms"),
            debug_mode: indicators.get("debug_mode"),
            debug_commands: indicators.get("debug_commands"),
            rf: RfSettings {
                addr: gates.serial_addr,
                baud: gates.serial_baud,
            },
        },
    }
}

/// Reescribe el archivo de estado con el snapshot vigente.
pub fn export_state(coordinator: &Coordinator) {
    let snapshot = build_snapshot(coordinator);
    let path = &coordinator.layout().state_file;

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match serde_json::to_string_pretty(&snapshot) {
        Ok(serialized) => {
            if let Err(io_fault) = std::fs::write(path, serialized) {
                warn!("🗺️ [EXPORT]: Could not rewrite state snapshot: {}", io_fault);
            }
        }
        Err(serialize_fault) => {
            warn!("🗺️ [EXPORT]: Snapshot serialization collapsed: {}", serialize_fault);
        }
    }
}
