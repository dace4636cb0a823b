// [libs/domain/models/src/receiver.rs]
/*!
 * =================================================================
 * APARATO: RECEIVER CONTRACTS (V4.2 - SWARM INVENTORY)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: PERFIL ESTÁTICO Y ESTADO VIVO DE CADA RECEPTOR
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Naturaleza declarada de un receptor de campo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReceiverKind {
    /// Transmisor puente sin reloj propio: cada cue se emite en vivo
    /// como paquete RF en el instante exacto.
    #[serde(rename = "DIRECT_RF")]
    DirectRf,

    /// Receptor inteligente: precarga su subconjunto de cues y dispara
    /// de forma autónoma con reloj sincronizado.
    #[serde(rename = "SMART_RELAY")]
    SmartRelay,
}

/// Perfil estático de un receptor, nacido de la configuración del sistema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverProfile {
    /// Naturaleza del hardware.
    #[serde(rename = "type")]
    pub kind: ReceiverKind,

    /// Identificador de nodo RF declarado.
    #[serde(default)]
    pub node: u32,

    /// Mapa de capacidades: zona -> conjunto de canales que puede disparar.
    /// Las claves viajan como texto en el JSON de configuración.
    #[serde(default)]
    pub cues: HashMap<String, BTreeSet<u32>>,
}

impl ReceiverProfile {
    /// true si este receptor declara la dirección `(zone, target)`.
    pub fn declares_cue(&self, zone: u32, target: u32) -> bool {
        self.cues
            .get(&zone.to_string())
            .is_some_and(|targets| targets.contains(&target))
    }
}

/// Estado vivo reportado por el dongle para un receptor.
/// Nace de forma perezosa con la primera trama de estado y persiste
/// durante toda la vida del proceso.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiverLiveStatus {
    /// Identificador de nodo observado en la última trama.
    pub node: u32,

    /// Nivel de batería en porcentaje.
    pub battery: i64,

    /// Show cargado actualmente en el receptor (0 = ninguno).
    pub show_id: i64,

    /// El receptor confirmó la carga completa de su tabla de cues.
    pub load_complete: bool,

    /// El receptor aceptó la orden de arranque para el show vigente.
    pub start_ready: bool,

    /// Última vez que el receptor habló, ajustada al reloj del
    /// coordinador (epoch ms). Nunca retrocede más de 1 s.
    pub last_seen_ms: i64,

    /// Media deslizante redondeada de las últimas 20 muestras de latencia.
    pub latency_ms: i64,

    /// Porcentaje de tramas RF entregadas con éxito.
    pub success_percent: i64,

    /// Máscaras de continuidad de 64 bits, un bit por canal.
    pub continuity: Vec<u64>,
}

/// Bloque de configuración reportado por el receptor (trama 'config').
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiverConfigBlock {
    pub num_boards: i64,
    pub board_version: i64,
    pub fw_version: i64,
    pub seconds_online: i64,
    pub tx_power: i64,
    pub fire_ms_duration: i64,
    pub status_interval_ms: i64,
    pub unsolicited_status_count: i64,
    pub conn_timeout_count: i64,
}
