// [libs/domain/models/src/snapshot.rs]
/*!
 * =================================================================
 * APARATO: STATE SNAPSHOT DTO (V4.1 - EXPORT SURFACE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL ARCHIVO DE ESTADO PARA CONSUMIDORES
 *
 * El publicador web y cualquier otro agente externo leen este snapshot
 * tal cual del disco; los nombres de campo son contrato estable.
 * =================================================================
 */

use crate::receiver::{ReceiverConfigBlock, ReceiverKind, ReceiverLiveStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Vista exportable de un receptor: perfil, estado vivo y configuración.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverSnapshot {
    #[serde(rename = "type")]
    pub kind: ReceiverKind,
    pub node: u32,
    pub cues: HashMap<String, BTreeSet<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReceiverLiveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ReceiverConfigBlock>,
    /// Reloj del coordinador menos marca del dongle al recibir estado.
    pub drift_ms: i64,
}

/// Bloque anidado de ajustes RF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfSettings {
    pub addr: String,
    pub baud: u32,
}

/// Ajustes vigentes del daemon exportados junto al estado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub led_brightness: i64,
    pub fire_repeat_ct: i64,
    pub receiver_timeout_ms: i64,
    pub command_response_timeout_ms: i64,
    pub clock_sync_interval_ms: i64,
    pub dongle_sync_interval_ms: i64,
    pub config_query_interval_ms: i64,
    pub debug_mode: i64,
    pub debug_commands: i64,
    pub rf: RfSettings,
}

/// Snapshot integral del coordinador, reescrito en cada tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// El dongle habló en los últimos 10 s.
    pub device_running: bool,
    /// Hay un enlace abierto hacia el puente serie.
    pub device_found: bool,
    pub device_address: String,
    /// Marca de vida del daemon (epoch ms).
    pub daemon_lup: i64,
    pub show_loaded: bool,
    pub loaded_show_name: Option<String>,
    pub loaded_show_id: Option<i64>,
    pub show_running: bool,
    /// Algo salió por el enlace en los últimos 10 s.
    pub device_is_transmitting: bool,
    pub device_is_armed: bool,
    pub manual_fire_active: bool,
    pub start_sw_active: bool,
    /// Fallos vigentes de la verificación previa al disparo.
    pub fire_check_failures: Vec<String>,
    pub proto_handler_errors: Vec<String>,
    /// Nombre del paso actual de la secuencia del motor.
    pub proto_handler_status: String,
    pub active_protocol: String,
    /// delegate_start_to_client.
    pub dstc: bool,
    /// Instante programado de arranque del show (epoch ms, 0 si ninguno).
    pub sst: i64,
    pub receivers: HashMap<String, ReceiverSnapshot>,
    pub waiting_for_client_start: bool,
    pub settings: SettingsSnapshot,
}
