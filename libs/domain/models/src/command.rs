// [libs/domain/models/src/command.rs]
/*!
 * =================================================================
 * APARATO: DROP COMMAND GRAMMAR (V4.1 - EXTERNAL AGENTS)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: VOCABULARIO DE MANDOS DEL BUZÓN DE ARCHIVOS
 *
 * Cada archivo del directorio de mandos contiene un único objeto JSON
 * etiquetado por 'type'. Un tipo desconocido se registra y se descarta
 * junto con el archivo; jamás detiene el bucle del buzón.
 * =================================================================
 */

use crate::show::DisplayCue;
use serde::{Deserialize, Serialize};

/// Dirección de un disparo manual solicitado por un agente externo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualFirePayload {
    pub zone: u32,
    pub target: u32,
}

/// Gramática de mando distribuido del buzón de archivos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropCommand {
    /// Passthrough crudo hacia el dongle.
    Serial {
        #[serde(default)]
        data: String,
    },

    /// Disparo manual de una dirección concreta.
    ManualFire { data: ManualFirePayload },

    /// Consulta ad-hoc al almacén relacional (colaborador externo).
    DbQuery {
        #[serde(default)]
        query: String,
    },

    /// Delegación del arranque al cliente software.
    DelegateLaunch {
        #[serde(default)]
        do_it: bool,
    },

    /// Arranque efectivo en flujo delegado.
    StartShow,

    /// Parada en flujo delegado.
    StopShow,

    /// Pausa en flujo delegado.
    PauseShow,

    /// Carga directa de un timeline ya normalizado.
    Schedule {
        #[serde(default)]
        schedule: Vec<DisplayCue>,
    },

    /// Parada forzosa de cualquier schedule en curso.
    StopSchedule,

    /// Carga de un show por identificador del almacén.
    LoadShow { id: i64 },

    /// Descarga del show vigente.
    UnloadShow,

    /// Reconfiguración del puerto serie remoto del puente.
    SelectSerial { device: String, baud: u32 },

    /// Brillo del panel LED (0 se eleva a 1).
    SetBrightness {
        #[serde(default = "default_brightness")]
        brightness: i64,
    },

    SetReceiverTimeout {
        #[serde(default = "default_receiver_timeout_ms")]
        timeout_ms: i64,
    },

    SetCommandResponseTimeout {
        #[serde(default = "default_command_response_timeout_ms")]
        timeout_ms: i64,
    },

    SetClockSyncInterval {
        #[serde(default = "default_clock_sync_interval_ms")]
        interval_ms: i64,
    },

    SetDongleSyncInterval {
        #[serde(default = "default_dongle_sync_interval_ms")]
        interval_ms: i64,
    },

    SetConfigQueryInterval {
        #[serde(default = "default_config_query_interval_ms")]
        interval_ms: i64,
    },

    SetDebugMode {
        #[serde(default)]
        debug_mode: i64,
    },

    SetDebugCommands {
        #[serde(default)]
        debug_commands: i64,
    },

    /// Repetición RF por disparo (0 se restituye al nominal 6).
    SetFireRepeat {
        #[serde(default = "default_fire_repeat")]
        repeat_ct: i64,
    },

    /// Ajustes remotos de un receptor concreto vía 'setconfig'.
    SetReceiverSettings {
        receiver_ident: String,
        #[serde(default)]
        fire_ms_duration: Option<i64>,
        #[serde(default)]
        status_interval: Option<i64>,
        #[serde(default)]
        tx_power: Option<i64>,
    },

    /// Barrido manual de 'getconfig' a todos los receptores en línea.
    QueryAllReceiverConfigs,
}

fn default_brightness() -> i64 {
    100
}

fn default_receiver_timeout_ms() -> i64 {
    30_000
}

fn default_command_response_timeout_ms() -> i64 {
    100
}

fn default_clock_sync_interval_ms() -> i64 {
    2_000
}

fn default_dongle_sync_interval_ms() -> i64 {
    20_000
}

fn default_config_query_interval_ms() -> i64 {
    120_000
}

fn default_fire_repeat() -> i64 {
    6
}
