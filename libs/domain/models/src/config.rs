// [libs/domain/models/src/config.rs]
/*!
 * =================================================================
 * APARATO: SYSTEM CONFIG CONTRACTS (V4.0 - FIELD INVENTORY)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: TIPADO DEL ARCHIVO DE CONFIGURACIÓN DEL SISTEMA
 * =================================================================
 */

use crate::receiver::ReceiverProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Identificador del protocolo híbrido que habla este coordinador.
pub const HYBRID_PROTOCOL_ID: &str = "PYRO_TS_HYBRID";

/// Sección 'system': coordenadas físicas del dongle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemSection {
    #[serde(default)]
    pub dongle_port: Option<String>,
    #[serde(default)]
    pub dongle_baud: Option<u32>,
}

/// Umbrales de la verificación previa al arranque.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct FiringThresholds {
    /// Batería mínima admisible en cualquier receptor implicado.
    #[serde(default)]
    pub min_battery_to_fire_pct: i64,

    /// Exigir continuidad eléctrica confirmada en cada cue asíncrono.
    #[serde(default)]
    pub require_continuity: bool,
}

/// Sección de un protocolo dentro de 'protocols'.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProtocolSection {
    #[serde(default)]
    pub config: FiringThresholds,
}

/// Configuración completa del sistema (`systemcfg.json`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub system: Option<SystemSection>,

    /// Inventario estático de receptores declarados.
    #[serde(default)]
    pub receivers: HashMap<String, ReceiverProfile>,

    #[serde(default)]
    pub protocols: HashMap<String, ProtocolSection>,
}

impl SystemConfig {
    /// Carga y tipa el archivo de configuración del sistema.
    ///
    /// # Errors:
    /// Propaga fallos de E/S y de deserialización; el llamante decide
    /// si el arranque puede continuar con una configuración vacía.
    pub fn load_from(path: &Path) -> std::io::Result<SystemConfig> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(std::io::Error::other)
    }

    /// Umbrales vigentes para el protocolo híbrido.
    pub fn hybrid_thresholds(&self) -> FiringThresholds {
        self.protocols
            .get(HYBRID_PROTOCOL_ID)
            .map(|section| section.config)
            .unwrap_or_default()
    }
}
