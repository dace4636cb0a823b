// [libs/domain/models/src/show.rs]
/*!
 * =================================================================
 * APARATO: SHOW & CUE CONTRACTS (V4.1 - TIMELINE ALIGNED)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: NORMALIZACIÓN DEL PAYLOAD DE AUTORÍA A TIMELINE
 *
 * # Mathematical Proof (Stable Ordering):
 * La normalización ordena por tiempo efectivo con un sort estable, de
 * modo que dos cues con el mismo instante conservan el orden de
 * autoría. El motor de tiro depende de esa estabilidad para que la
 * secuencia emitida sea determinista.
 * =================================================================
 */

use crate::errors::ShowValidationError;
use crate::receiver::ReceiverKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cue tal como lo entrega el almacén de shows (payload de presentación).
/// El tiempo de autoría incluye el retardo del artículo pirotécnico.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayCue {
    /// Instante de efecto visual en segundos relativos a t=0 del show.
    #[serde(rename = "startTime")]
    pub start_time_seconds: f64,

    /// Retardo de ignición del artículo (mecha interna, lift time).
    #[serde(default)]
    pub delay: f64,

    /// Dirección de dos niveles: la zona identifica el módulo.
    pub zone: u32,

    /// Canal dentro del módulo.
    pub target: u32,

    /// Identificador opaco del cue, preservado sin interpretación.
    #[serde(default)]
    pub id: Value,
}

/// Cue normalizado: el instante ya descuenta el retardo de ignición.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledCue {
    #[serde(rename = "startTime")]
    pub start_time_seconds: f64,
    pub zone: u32,
    pub target: u32,
    #[serde(default)]
    pub id: Value,
}

/// Cue resuelto contra el inventario de receptores, listo para el motor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCue {
    #[serde(rename = "startTime")]
    pub start_time_seconds: f64,
    pub zone: u32,
    pub target: u32,
    #[serde(default)]
    pub id: Value,

    /// Receptor único que declara esta dirección.
    pub device_id: String,

    /// Naturaleza del receptor resuelto.
    #[serde(rename = "type")]
    pub kind: ReceiverKind,

    /// true: el receptor precarga el cue y dispara con su propio reloj.
    /// false: el coordinador lo emite en vivo por RF directa.
    pub async_fire: bool,
}

/// Convierte el payload de presentación en el timeline de ignición.
///
/// Cada cue se adelanta por su retardo (`efectivo = inicio − delay`) y
/// la lista resultante queda ordenada de forma estable por tiempo.
///
/// # Errors:
/// - `EmptyPayload` si la lista llega vacía.
/// - `MissingStartTime` si algún cue carece de instante de autoría.
pub fn normalize_display_payload(
    display_payload: Vec<DisplayCue>,
) -> Result<Vec<ScheduledCue>, ShowValidationError> {
    if display_payload.is_empty() {
        return Err(ShowValidationError::EmptyPayload);
    }

    let mut timeline: Vec<ScheduledCue> = Vec::with_capacity(display_payload.len());

    for display_cue in display_payload {
        if !display_cue.start_time_seconds.is_finite() {
            return Err(ShowValidationError::MissingStartTime(
                display_cue.id.to_string(),
            ));
        }

        timeline.push(ScheduledCue {
            start_time_seconds: display_cue.start_time_seconds - display_cue.delay,
            zone: display_cue.zone,
            target: display_cue.target,
            id: display_cue.id,
        });
    }

    // sort estable: los empates preservan el orden de autoría
    timeline.sort_by(|a, b| a.start_time_seconds.total_cmp(&b.start_time_seconds));

    Ok(timeline)
}
