// [apps/coordinator/src/state/registry.rs]
/*!
 * =================================================================
 * APARATO: RECEIVER REGISTRY (V6.2 - SWARM RADAR)
 * CLASIFICACIÓN: APPLICATION STATE ATOM (ESTRATO L1-APP)
 * RESPONSABILIDAD: INVENTARIO VIVO DEL ENJAMBRE DE RECEPTORES
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. LAZY BIRTH: Los perfiles nacen de la configuración estática; el
 *    estado vivo nace con la primera trama y persiste todo el proceso.
 * 2. STALE SHIELD: 'last_seen' jamás retrocede más de 1 s, tolerando
 *    ajustes menores de reloj sin aceptar reportes viejos.
 * 3. SMOOTH LATENCY: Ventana deslizante de 20 muestras con media
 *    redondeada; el radar no parpadea con un pico puntual.
 * 4. SHORT SECTIONS: Un único mutex con secciones críticas breves;
 *    los lectores toman instantáneas por cue, nunca el cerrojo largo.
 * =================================================================
 */

use pyrolink_domain_models::frames::{ConfigFrame, StatusFrame};
use pyrolink_domain_models::receiver::{
    ReceiverConfigBlock, ReceiverKind, ReceiverLiveStatus, ReceiverProfile,
};
use pyrolink_domain_models::snapshot::ReceiverSnapshot;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Silencio máximo antes de considerar un receptor fuera de línea.
pub const ONLINE_WINDOW_MS: i64 = 8_000;

/// Retroceso tolerado de 'last_seen' por ajustes menores de reloj.
const BACKWARD_JUMP_TOLERANCE_MS: i64 = 1_000;

/// Profundidad de la ventana de suavizado de latencia.
const LATENCY_WINDOW_DEPTH: usize = 20;

struct ReceiverRecord {
    profile: ReceiverProfile,
    status: Option<ReceiverLiveStatus>,
    config: Option<ReceiverConfigBlock>,
    drift_ms: i64,
    latency_window: VecDeque<i64>,
    was_online: bool,
}

/// Resultado de resolver una dirección `(zone, target)` contra el radar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Exactamente un receptor declara la dirección.
    Unique { device_id: String, kind: ReceiverKind },
    /// Nadie la declara.
    Unresolvable,
    /// Más de un receptor la declara. Prohibido en el inventario.
    Ambiguous,
}

/// Mapa vivo ident -> perfil + estado, protegido por un único mutex.
pub struct ReceiverRegistry {
    records: Mutex<HashMap<String, ReceiverRecord>>,
}

impl ReceiverRegistry {
    /// Nace del inventario estático de la configuración del sistema.
    pub fn from_inventory(inventory: HashMap<String, ReceiverProfile>) -> ReceiverRegistry {
        let records = inventory
            .into_iter()
            .map(|(ident, profile)| {
                (
                    ident,
                    ReceiverRecord {
                        profile,
                        status: None,
                        config: None,
                        drift_ms: 0,
                        latency_window: VecDeque::with_capacity(LATENCY_WINDOW_DEPTH),
                        was_online: false,
                    },
                )
            })
            .collect();

        ReceiverRegistry {
            records: Mutex::new(records),
        }
    }

    /// Ingesta una trama de estado agregada del dongle.
    ///
    /// El offset (`reloj coordinador − reloj dongle`) ajusta cada
    /// 'last_msg_time' al dominio temporal local y queda registrado
    /// como deriva del receptor.
    pub fn apply_status_frame(&self, frame: &StatusFrame, coordinator_now_ms: i64) {
        let clock_offset_ms = coordinator_now_ms - frame.dongle_timestamp_ms;
        let mut records = self.records.lock().expect("LOCK_POISONED");

        for row in &frame.rows {
            let Some(record) = records.get_mut(&row.ident) else {
                warn!("📡 [RADAR]: Receiver [{}] is not known. Ignoring.", row.ident);
                continue;
            };

            let previous_last_seen = record
                .status
                .as_ref()
                .map(|status| status.last_seen_ms)
                .unwrap_or(0);

            // Ajuste temporal con blindaje contra reportes viejos.
            let adjusted_last_seen = row.last_msg_time_ms + clock_offset_ms;
            let accepted_last_seen =
                if adjusted_last_seen - previous_last_seen > -BACKWARD_JUMP_TOLERANCE_MS {
                    adjusted_last_seen
                } else {
                    previous_last_seen
                };

            // Suavizado de latencia: ventana de 20 muestras, media redondeada.
            record.latency_window.push_back(row.latency_ms);
            while record.latency_window.len() > LATENCY_WINDOW_DEPTH {
                record.latency_window.pop_front();
            }
            let latency_sum: i64 = record.latency_window.iter().sum();
            let smoothed_latency =
                (latency_sum as f64 / record.latency_window.len() as f64).round() as i64;

            record.drift_ms = clock_offset_ms;
            record.status = Some(ReceiverLiveStatus {
                node: row.node,
                battery: row.battery,
                show_id: row.show_id,
                load_complete: row.load_complete,
                start_ready: row.start_ready,
                last_seen_ms: accepted_last_seen,
                latency_ms: smoothed_latency,
                success_percent: row.success_percent,
                continuity: row.continuity.clone(),
            });

            let is_now_online =
                accepted_last_seen != 0 && coordinator_now_ms - accepted_last_seen < ONLINE_WINDOW_MS;
            if record.was_online != is_now_online {
                debug!(
                    "📡 [RADAR]: Receiver [{}] transitioned to {}.",
                    row.ident,
                    if is_now_online { "ONLINE" } else { "OFFLINE" }
                );
            }
            record.was_online = is_now_online;
        }
    }

    /// Ingesta una trama de configuración de un receptor concreto.
    pub fn apply_config_frame(&self, frame: &ConfigFrame) {
        let mut records = self.records.lock().expect("LOCK_POISONED");
        match records.get_mut(&frame.ident) {
            Some(record) => record.config = Some(frame.block.clone()),
            None => debug!("📡 [RADAR]: Config received for unknown receiver [{}].", frame.ident),
        }
    }

    /// true si el receptor habló dentro de la ventana de presencia.
    pub fn is_online(&self, ident: &str, coordinator_now_ms: i64) -> bool {
        let records = self.records.lock().expect("LOCK_POISONED");
        records
            .get(ident)
            .and_then(|record| record.status.as_ref())
            .map(|status| {
                status.last_seen_ms != 0
                    && coordinator_now_ms - status.last_seen_ms < ONLINE_WINDOW_MS
            })
            .unwrap_or(false)
    }

    /// Identificadores actualmente en línea, en orden estable.
    pub fn online_idents(&self, coordinator_now_ms: i64) -> Vec<String> {
        let records = self.records.lock().expect("LOCK_POISONED");
        let mut online: Vec<String> = records
            .iter()
            .filter(|(_, record)| {
                record
                    .status
                    .as_ref()
                    .map(|status| {
                        status.last_seen_ms != 0
                            && coordinator_now_ms - status.last_seen_ms < ONLINE_WINDOW_MS
                    })
                    .unwrap_or(false)
            })
            .map(|(ident, _)| ident.clone())
            .collect();
        online.sort();
        online
    }

    /// Todos los identificadores declarados, en orden estable.
    pub fn idents(&self) -> Vec<String> {
        let records = self.records.lock().expect("LOCK_POISONED");
        let mut idents: Vec<String> = records.keys().cloned().collect();
        idents.sort();
        idents
    }

    /// Resuelve una dirección contra el inventario declarado.
    pub fn resolve_zone_target(&self, zone: u32, target: u32) -> ResolutionOutcome {
        let records = self.records.lock().expect("LOCK_POISONED");
        let mut resolved: Option<(String, ReceiverKind)> = None;

        let mut idents: Vec<&String> = records.keys().collect();
        idents.sort();

        for ident in idents {
            let record = &records[ident];
            if record.profile.declares_cue(zone, target) {
                if resolved.is_some() {
                    warn!(
                        "📡 [RADAR]: Multiple receivers declare {}:{}. Ambiguous addressing.",
                        zone, target
                    );
                    return ResolutionOutcome::Ambiguous;
                }
                resolved = Some((ident.clone(), record.profile.kind));
            }
        }

        match resolved {
            Some((device_id, kind)) => ResolutionOutcome::Unique { device_id, kind },
            None => ResolutionOutcome::Unresolvable,
        }
    }

    /// Instantánea del estado vivo de un receptor.
    pub fn status_of(&self, ident: &str) -> Option<ReceiverLiveStatus> {
        let records = self.records.lock().expect("LOCK_POISONED");
        records.get(ident).and_then(|record| record.status.clone())
    }

    /// Vista exportable completa para el snapshot de estado.
    pub fn export_snapshots(&self) -> HashMap<String, ReceiverSnapshot> {
        let records = self.records.lock().expect("LOCK_POISONED");
        records
            .iter()
            .map(|(ident, record)| {
                (
                    ident.clone(),
                    ReceiverSnapshot {
                        kind: record.profile.kind,
                        node: record.profile.node,
                        cues: record.profile.cues.clone(),
                        status: record.status.clone(),
                        config: record.config.clone(),
                        drift_ms: record.drift_ms,
                    },
                )
            })
            .collect()
    }
}
