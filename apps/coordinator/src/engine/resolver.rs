// [apps/coordinator/src/engine/resolver.rs]
/*!
 * =================================================================
 * APARATO: FIRE RESOLVER (V6.1 - UNIQUE ADDRESSING)
 * CLASIFICACIÓN: ENGINE CORE (ESTRATO L1-APP)
 * RESPONSABILIDAD: RESOLUCIÓN DE CUES A RECEPTORES Y PARTICIÓN
 *
 * Cada cue debe resolver a exactamente un receptor declarante. Las
 * direcciones huérfanas o ambiguas son errores de carga: el motor no
 * entra en LOADED con un plan que no puede ejecutar íntegro. Los cues
 * asíncronos exigen además que su receptor esté en línea al cargar.
 * =================================================================
 */

use crate::state::registry::{ReceiverRegistry, ResolutionOutcome};
use pyrolink_domain_models::receiver::ReceiverKind;
use pyrolink_domain_models::show::{ResolvedCue, ScheduledCue};
use std::collections::BTreeMap;

/// Plan de tiro resuelto y particionado.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPlan {
    /// Todos los cues en orden de disparo, ya anotados.
    pub firing_array: Vec<ResolvedCue>,
    /// Subconjunto por receptor inteligente que exige precarga remota.
    pub async_load_targets: BTreeMap<String, Vec<ResolvedCue>>,
}

/// Resuelve el timeline completo contra el radar de receptores.
///
/// # Errors:
/// Lista de mensajes de carga; si no está vacía el plan es inválido
/// en su totalidad (no hay cargas parciales).
pub fn resolve_plan(
    registry: &ReceiverRegistry,
    timeline: &[ScheduledCue],
    coordinator_now_ms: i64,
) -> Result<ResolvedPlan, Vec<String>> {
    let mut plan = ResolvedPlan::default();
    let mut load_errors: Vec<String> = Vec::new();

    for cue in timeline {
        match registry.resolve_zone_target(cue.zone, cue.target) {
            ResolutionOutcome::Unresolvable => {
                load_errors.push(format!(
                    "Load: Could not resolve cue {}:{} to any device.",
                    cue.zone, cue.target
                ));
            }
            ResolutionOutcome::Ambiguous => {
                load_errors.push(format!(
                    "Load: Multiple devices declare cue {}:{}. Ambiguous addressing is not allowed.",
                    cue.zone, cue.target
                ));
            }
            ResolutionOutcome::Unique { device_id, kind } => {
                let async_fire = kind != ReceiverKind::DirectRf;

                if async_fire && !registry.is_online(&device_id, coordinator_now_ms) {
                    load_errors.push(format!(
                        "Load: Resolved cue {}:{} to {}, but its not connected.",
                        cue.zone, cue.target, device_id
                    ));
                    continue;
                }

                let resolved = ResolvedCue {
                    start_time_seconds: cue.start_time_seconds,
                    zone: cue.zone,
                    target: cue.target,
                    id: cue.id.clone(),
                    device_id: device_id.clone(),
                    kind,
                    async_fire,
                };

                if async_fire {
                    plan.async_load_targets
                        .entry(device_id)
                        .or_default()
                        .push(resolved.clone());
                }
                plan.firing_array.push(resolved);
            }
        }
    }

    if load_errors.is_empty() {
        Ok(plan)
    } else {
        Err(load_errors)
    }
}
